pub mod config;
pub mod cursor;
pub mod editor;
pub mod input;
pub mod interaction;
pub mod machine;
pub mod overrides;
pub mod shortcuts;
pub mod states;

pub use config::{ConfigError, EditorConfig};
pub use cursor::{Cursor, CursorKind};
pub use editor::{Editor, EditorError};
pub use input::{EventKind, EventKinds, InputEvent, InputsState, PointerTarget};
pub use interaction::{Interaction, InteractionActivation, InteractionSnapshot, SettleFn};
pub use machine::{
    Activation, MachineError, State, StateCtx, StateDef, StateInfo, StateMachine, StateRef,
    TransitionRequest,
};
pub use overrides::{MergedOverrides, UiOverrides, merge_overrides, merged_translations};
pub use shortcuts::{ShortcutAction, ShortcutMap};
