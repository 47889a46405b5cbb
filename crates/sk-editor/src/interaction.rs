//! Drag-like leaf interactions.
//!
//! Translating, resizing and crop-translating are one `Interaction`
//! parameterized by label, cursor, idle state and edit function. On enter it
//! captures the shape, takes a history mark and applies once. Every pointer
//! move or modifier change re-derives the partial from that capture and the
//! total pointer delta. Completion settles the shape (see `SettleFn`) and
//! commits the mark; cancel bails to it.

use crate::cursor::CursorKind;
use crate::input::{EventKind, EventKinds, InputEvent};
use crate::machine::{Activation, State, StateCtx, StateInfo};
use sk_core::geometry::EditFn;
use sk_core::{MarkId, Shape, ShapePartial, Store};

/// Picks the edit function for one activation.
pub type EditSelector = fn(&StateInfo) -> EditFn;

pub type CursorSelector = fn(&StateInfo) -> CursorKind;

/// Final adjustment made once on completion, inside the gesture's undo step,
/// e.g. dropping a moved shape into a frame.
pub type SettleFn = fn(&Store, &Shape) -> Option<ShapePartial>;

/// A leaf that turns a pointer drag into edits of one shape.
#[derive(Debug, Clone)]
pub struct Interaction {
    /// History mark label, e.g. `translating_crop`.
    pub label: &'static str,
    pub cursor: CursorSelector,
    /// Root-relative path to return to when the gesture ends.
    pub idle: &'static str,
    pub edit: EditSelector,
    pub settle: Option<SettleFn>,
}

/// The shape as it was when the gesture started.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSnapshot {
    pub shape: Shape,
}

pub struct InteractionActivation {
    info: StateInfo,
    label: &'static str,
    idle: &'static str,
    edit: EditFn,
    settle: Option<SettleFn>,
    snapshot: Option<InteractionSnapshot>,
    mark: Option<MarkId>,
}

impl State for Interaction {
    fn handles(&self) -> EventKinds {
        EventKinds::KEYS
            | EventKind::PointerMove
            | EventKind::PointerUp
            | EventKind::Complete
            | EventKind::Cancel
    }

    fn enter(&self, ctx: &mut StateCtx<'_>, info: &StateInfo) -> Box<dyn Activation> {
        let mut activation = InteractionActivation {
            info: info.clone(),
            label: self.label,
            idle: self.idle,
            edit: (self.edit)(info),
            settle: self.settle,
            snapshot: None,
            mark: None,
        };

        let shape = info
            .shape_id
            .or_else(|| ctx.store.only_selected_shape().map(|s| s.id))
            .and_then(|id| ctx.store.shape(id))
            .cloned();
        let Some(shape) = shape else {
            log::debug!("{}: nothing to act on, back to {}", self.label, self.idle);
            ctx.transition(self.idle, info.clone());
            return Box::new(activation);
        };

        activation.mark = Some(ctx.store.mark_history_stopping_point(self.label));
        ctx.cursor.set((self.cursor)(info), shape.rotation);
        activation.snapshot = Some(InteractionSnapshot { shape });
        activation.update(ctx);
        Box::new(activation)
    }
}

impl InteractionActivation {
    pub fn snapshot(&self) -> Option<&InteractionSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn mark(&self) -> Option<MarkId> {
        self.mark
    }

    /// Re-derive and apply the edit for the current pointer delta.
    /// A no-op once the captured shape is gone from the store.
    pub fn update(&mut self, ctx: &mut StateCtx<'_>) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        if !ctx.store.contains(snapshot.shape.id) {
            log::debug!("{}: {} is gone, skipping update", self.label, snapshot.shape.id);
            return;
        }
        let delta = ctx.inputs.drag_delta();
        if let Some(partial) = (self.edit)(&snapshot.shape, delta, ctx.inputs.modifiers) {
            ctx.store.update_shapes(&[partial]);
        }
    }

    /// Apply once more, commit the gesture as one undo step and leave.
    pub fn complete(&mut self, ctx: &mut StateCtx<'_>) {
        self.update(ctx);
        if self.mark.is_some() {
            self.settle(ctx);
        }
        if let Some(mark) = self.info.creation_mark.or(self.mark.take()) {
            ctx.store.squash_to_mark(mark);
        }
        ctx.transition(self.exit_target(), self.info.clone());
    }

    /// Roll back everything since the gesture (or the shape's creation) began.
    pub fn cancel(&mut self, ctx: &mut StateCtx<'_>) {
        if let Some(mark) = self.info.creation_mark.or(self.mark.take()) {
            ctx.store.bail_to_mark(mark);
        }
        ctx.transition(self.exit_target(), self.info.clone());
    }

    fn settle(&self, ctx: &mut StateCtx<'_>) {
        let (Some(settle), Some(snapshot)) = (self.settle, &self.snapshot) else {
            return;
        };
        let Some(shape) = ctx.store.shape(snapshot.shape.id) else {
            return;
        };
        if let Some(partial) = settle(ctx.store, shape) {
            ctx.store.update_shapes(&[partial]);
        }
    }

    fn exit_target(&self) -> String {
        self.info
            .on_interaction_end
            .clone()
            .unwrap_or_else(|| self.idle.to_string())
    }
}

impl Activation for InteractionActivation {
    fn info(&self) -> &StateInfo {
        &self.info
    }

    fn on_event(&mut self, ctx: &mut StateCtx<'_>, event: &InputEvent) {
        match event {
            InputEvent::PointerMove { .. } => self.update(ctx),
            InputEvent::KeyDown { key, .. } if is_modifier(key) => self.update(ctx),
            InputEvent::KeyUp { key, .. } if is_modifier(key) => self.update(ctx),
            InputEvent::KeyUp { key, .. } if key == "Enter" => self.complete(ctx),
            InputEvent::PointerUp { .. } | InputEvent::Complete => self.complete(ctx),
            InputEvent::Cancel => self.cancel(ctx),
            _ => {}
        }
    }

    fn on_exit(self: Box<Self>, ctx: &mut StateCtx<'_>) {
        ctx.cursor.reset();
    }

    /// Roll back this gesture's own edits so the next activation captures
    /// the shape as it was before the drag. A creation mark belongs to the
    /// creating tool and is left alone.
    fn on_reenter(self: Box<Self>, ctx: &mut StateCtx<'_>) {
        if let Some(mark) = self.mark {
            ctx.store.bail_to_mark(mark);
        }
        ctx.cursor.reset();
    }
}

fn is_modifier(key: &str) -> bool {
    matches!(key, "Alt" | "Shift")
}
