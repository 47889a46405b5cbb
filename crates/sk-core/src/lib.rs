pub mod geometry;
pub mod history;
pub mod id;
pub mod model;
pub mod store;

pub use geometry::{EditFn, Modifiers, ResizeHandle};
pub use history::{History, MarkId, RecordChange, RecordsDiff};
pub use id::RecordId;
pub use model::*;
pub use store::{InstanceState, Store, StoreError, StoreSnapshot};

// Re-export kurbo geometry so downstream crates don't need a direct dependency
pub use kurbo::{Point, Rect, Vec2};
