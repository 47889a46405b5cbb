//! The root state: global shortcuts.

use crate::input::{EventKind, EventKinds, InputEvent};
use crate::machine::{Activation, State, StateCtx, StateInfo};
use crate::shortcuts::{ShortcutAction, ShortcutMap};

/// Resolves keyboard shortcuts before any child state sees the key.
pub struct RootState;

struct RootActivation {
    info: StateInfo,
}

impl State for RootState {
    fn handles(&self) -> EventKinds {
        EventKind::KeyDown.into()
    }

    fn enter(&self, _ctx: &mut StateCtx<'_>, info: &StateInfo) -> Box<dyn Activation> {
        Box::new(RootActivation { info: info.clone() })
    }
}

impl Activation for RootActivation {
    fn info(&self) -> &StateInfo {
        &self.info
    }

    fn on_event(&mut self, ctx: &mut StateCtx<'_>, event: &InputEvent) {
        let InputEvent::KeyDown { key, modifiers } = event else {
            return;
        };
        let Some(action) = ShortcutMap::resolve(key, *modifiers) else {
            return;
        };

        match action {
            ShortcutAction::Cancel => ctx.send(InputEvent::Cancel),
            // Mid-gesture, only Escape gets through.
            _ if ctx.inputs.is_pointing => {}
            ShortcutAction::Undo => {
                ctx.store.undo();
            }
            ShortcutAction::Redo => {
                ctx.store.redo();
            }
            other => {
                if let Some(tool) = other.tool_state() {
                    ctx.transition(tool, StateInfo::default());
                }
            }
        }
    }
}
