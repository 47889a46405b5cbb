//! Built-in state tree.
//!
//! ```text
//! root
//! ├── select
//! │   ├── idle
//! │   ├── translating
//! │   ├── resizing
//! │   └── crop
//! │       ├── idle
//! │       └── translating_crop
//! ├── geo
//! │   └── idle
//! └── frame
//!     └── idle
//! ```

pub mod create;
pub mod crop;
pub mod root;
pub mod select;

use crate::machine::StateDef;
use create::{CreateIdle, CreateTool};
use crop::{CropIdle, CropState};
use root::RootState;
use select::SelectIdle;

pub fn default_tree() -> StateDef {
    StateDef::new("root", RootState)
        .child(
            StateDef::branch("select")
                .child(StateDef::new("idle", SelectIdle))
                .child(StateDef::new("translating", select::translating()))
                .child(StateDef::new("resizing", select::resizing()))
                .child(
                    StateDef::new("crop", CropState)
                        .child(StateDef::new("idle", CropIdle))
                        .child(StateDef::new("translating_crop", crop::translating_crop())),
                ),
        )
        .child(StateDef::branch("geo").child(StateDef::new(
            "idle",
            CreateIdle {
                tool: CreateTool::Geo,
            },
        )))
        .child(StateDef::branch("frame").child(StateDef::new(
            "idle",
            CreateIdle {
                tool: CreateTool::Frame,
            },
        )))
}
