//! Input abstraction layer.
//!
//! Normalizes pointer and keyboard events into a unified `InputEvent` enum,
//! and keeps the per-editor `InputsState` that handlers read during dispatch.

use serde::{Deserialize, Serialize};
use sk_core::{Modifiers, Point, RecordId, ResizeHandle, Vec2};
use smallvec::SmallVec;
use std::ops::BitOr;

/// What the pointer was over when an event fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerTarget {
    #[default]
    Canvas,
    Shape {
        id: RecordId,
    },
    /// A resize handle on a shape's selection bounds.
    Handle {
        shape: RecordId,
        handle: ResizeHandle,
    },
}

impl PointerTarget {
    /// The shape under the pointer, if any.
    pub fn shape_id(&self) -> Option<RecordId> {
        match self {
            Self::Canvas => None,
            Self::Shape { id } => Some(*id),
            Self::Handle { shape, .. } => Some(*shape),
        }
    }
}

/// A normalized input event. Points are in page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pencil contact).
    PointerDown {
        #[serde(default)]
        target: PointerTarget,
        point: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },

    PointerMove {
        #[serde(default)]
        target: PointerTarget,
        point: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },

    PointerUp {
        #[serde(default)]
        target: PointerTarget,
        point: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },

    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Shift"`).
    KeyDown {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },

    KeyUp {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },

    /// Frame tick for time-based effects.
    Tick { elapsed_ms: f64 },

    /// Finish the current interaction.
    Complete,

    /// Abandon the current interaction.
    Cancel,
}

impl InputEvent {
    pub fn pointer_down(target: PointerTarget, x: f64, y: f64) -> Self {
        Self::PointerDown {
            target,
            point: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove {
            target: PointerTarget::Canvas,
            point: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            target: PointerTarget::Canvas,
            point: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key_down(key: &str, modifiers: Modifiers) -> Self {
        Self::KeyDown {
            key: key.to_string(),
            modifiers,
        }
    }

    pub fn key_up(key: &str, modifiers: Modifiers) -> Self {
        Self::KeyUp {
            key: key.to_string(),
            modifiers,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerDown { .. } => EventKind::PointerDown,
            Self::PointerMove { .. } => EventKind::PointerMove,
            Self::PointerUp { .. } => EventKind::PointerUp,
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::KeyUp { .. } => EventKind::KeyUp,
            Self::Tick { .. } => EventKind::Tick,
            Self::Complete => EventKind::Complete,
            Self::Cancel => EventKind::Cancel,
        }
    }

    /// Extract the page point if this is a pointer event.
    pub fn point(&self) -> Option<Point> {
        match self {
            Self::PointerDown { point, .. }
            | Self::PointerMove { point, .. }
            | Self::PointerUp { point, .. } => Some(*point),
            _ => None,
        }
    }

    pub fn modifiers(&self) -> Option<Modifiers> {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. } => Some(*modifiers),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::KeyDown { key, .. } | Self::KeyUp { key, .. } => Some(key),
            _ => None,
        }
    }
}

// ─── Event kinds ─────────────────────────────────────────────────────────

/// Discriminant of an `InputEvent`, used for handler registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerDown,
    PointerMove,
    PointerUp,
    KeyDown,
    KeyUp,
    Tick,
    Complete,
    Cancel,
}

impl EventKind {
    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// A set of event kinds a state handles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventKinds(u16);

impl EventKinds {
    pub const NONE: EventKinds = EventKinds(0);
    pub const POINTER: EventKinds = EventKinds(
        EventKind::PointerDown.bit() | EventKind::PointerMove.bit() | EventKind::PointerUp.bit(),
    );
    pub const KEYS: EventKinds = EventKinds(EventKind::KeyDown.bit() | EventKind::KeyUp.bit());

    pub const fn with(self, kind: EventKind) -> Self {
        EventKinds(self.0 | kind.bit())
    }

    pub const fn contains(self, kind: EventKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<EventKind> for EventKinds {
    fn from(kind: EventKind) -> Self {
        EventKinds(kind.bit())
    }
}

impl BitOr for EventKinds {
    type Output = EventKinds;
    fn bitor(self, rhs: EventKinds) -> EventKinds {
        EventKinds(self.0 | rhs.0)
    }
}

impl BitOr<EventKind> for EventKinds {
    type Output = EventKinds;
    fn bitor(self, rhs: EventKind) -> EventKinds {
        self.with(rhs)
    }
}

impl BitOr for EventKind {
    type Output = EventKinds;
    fn bitor(self, rhs: EventKind) -> EventKinds {
        EventKinds::from(self).with(rhs)
    }
}

// ─── Inputs state ────────────────────────────────────────────────────────

/// Pointer and keyboard state, written once per event before dispatch.
#[derive(Debug, Clone, Default)]
pub struct InputsState {
    /// Where the current press started.
    pub origin_page_point: Point,
    pub current_page_point: Point,
    pub previous_page_point: Point,
    pub modifiers: Modifiers,
    /// Keys currently held, in press order.
    pub keys: SmallVec<[String; 4]>,
    pub is_pointing: bool,
    /// Set once a press has moved further than the drag distance.
    pub is_dragging: bool,
    /// Page units per millisecond, smoothed over ticks.
    pub pointer_velocity: Vec2,
    last_tick_point: Point,
}

impl InputsState {
    /// Fold `event` into the state. `drag_distance_squared` is the squared
    /// page distance a press must travel before it counts as a drag.
    pub fn update(&mut self, event: &InputEvent, drag_distance_squared: f64) {
        if let Some(modifiers) = event.modifiers() {
            self.modifiers = modifiers;
        }
        match event {
            InputEvent::PointerDown { point, .. } => {
                self.origin_page_point = *point;
                self.previous_page_point = *point;
                self.current_page_point = *point;
                self.is_pointing = true;
                self.is_dragging = false;
            }
            InputEvent::PointerMove { point, .. } => {
                self.previous_page_point = self.current_page_point;
                self.current_page_point = *point;
                if self.is_pointing
                    && !self.is_dragging
                    && (self.current_page_point - self.origin_page_point).hypot2()
                        > drag_distance_squared
                {
                    self.is_dragging = true;
                }
            }
            InputEvent::PointerUp { point, .. } => {
                self.previous_page_point = self.current_page_point;
                self.current_page_point = *point;
                self.is_pointing = false;
                self.is_dragging = false;
            }
            InputEvent::KeyDown { key, .. } => {
                if !self.is_key_down(key) {
                    self.keys.push(key.clone());
                }
            }
            InputEvent::KeyUp { key, .. } => {
                self.keys.retain(|k| k != key);
            }
            InputEvent::Tick { elapsed_ms } => self.update_velocity(*elapsed_ms),
            InputEvent::Complete | InputEvent::Cancel => {}
        }
    }

    /// Total pointer travel since the press started.
    pub fn drag_delta(&self) -> Vec2 {
        self.current_page_point - self.origin_page_point
    }

    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    fn update_velocity(&mut self, elapsed_ms: f64) {
        if elapsed_ms <= 0.0 {
            return;
        }
        let delta = self.current_page_point - self.last_tick_point;
        self.last_tick_point = self.current_page_point;

        let target = delta / elapsed_ms;
        let mut next = self.pointer_velocity.lerp(target, 0.5);
        if next.x.abs() < 0.01 {
            next.x = 0.0;
        }
        if next.y.abs() < 0.01 {
            next.y = 0.0;
        }
        self.pointer_velocity = next;
    }
}
