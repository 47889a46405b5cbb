//! Canvas cursor published to the host.

use serde::{Deserialize, Serialize};
use sk_core::ResizeHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorKind {
    #[default]
    Default,
    Cross,
    Move,
    Grab,
    NwseResize,
    NeswResize,
}

impl CursorKind {
    /// Resize cursor for dragging `handle`.
    pub fn for_handle(handle: ResizeHandle) -> Self {
        match handle {
            ResizeHandle::TopLeft | ResizeHandle::BottomRight => Self::NwseResize,
            ResizeHandle::TopRight | ResizeHandle::BottomLeft => Self::NeswResize,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub kind: CursorKind,
    /// Radians, so resize cursors follow a rotated shape.
    pub rotation: f64,
}

impl Cursor {
    pub fn set(&mut self, kind: CursorKind, rotation: f64) {
        self.kind = kind;
        self.rotation = rotation;
    }

    pub fn reset(&mut self) {
        *self = Cursor::default();
    }
}
