//! The select tool: idle selection handling plus the translate and resize
//! interactions.

use crate::cursor::CursorKind;
use crate::input::{EventKind, EventKinds, InputEvent, PointerTarget};
use crate::interaction::Interaction;
use crate::machine::{Activation, State, StateCtx, StateInfo};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use sk_core::geometry::translate_shape_change;
use sk_core::{Shape, ShapePartial, Store};

pub fn translating() -> Interaction {
    Interaction {
        label: "translating",
        cursor: |_| CursorKind::Move,
        idle: "select.idle",
        edit: |_| translate_shape_change,
        settle: Some(reparent_to_drop_target),
    }
}

pub fn resizing() -> Interaction {
    Interaction {
        label: "resizing",
        cursor: |info| CursorKind::for_handle(info.handle.unwrap_or_default()),
        idle: "select.idle",
        edit: |info| info.handle.unwrap_or_default().edit_fn(),
        settle: None,
    }
}

/// Drop a moved shape into the frame under it, or back onto the page when
/// it was dragged out of its frame.
fn reparent_to_drop_target(store: &Store, shape: &Shape) -> Option<ShapePartial> {
    let parent = store.drop_target(shape);
    if parent == shape.parent_id {
        return None;
    }
    log::debug!("translating: {} moves into {parent:?}", shape.id);
    Some(ShapePartial::new(shape.id).with_parent(parent))
}

/// Waits for a press on a shape or handle, and handles selection keys.
pub struct SelectIdle;

struct SelectIdleActivation {
    info: StateInfo,
}

impl State for SelectIdle {
    fn handles(&self) -> EventKinds {
        EventKind::PointerDown | EventKind::KeyDown
    }

    fn enter(&self, ctx: &mut StateCtx<'_>, info: &StateInfo) -> Box<dyn Activation> {
        ctx.cursor.reset();
        Box::new(SelectIdleActivation { info: info.clone() })
    }
}

impl SelectIdleActivation {
    fn on_pointer_down(&mut self, ctx: &mut StateCtx<'_>, event: &InputEvent) {
        let InputEvent::PointerDown {
            target, modifiers, ..
        } = event
        else {
            return;
        };
        match *target {
            PointerTarget::Canvas => {
                if !modifiers.shift {
                    ctx.store.clear_selection();
                }
            }
            PointerTarget::Shape { id } => {
                if modifiers.shift {
                    ctx.store.toggle_selected(id);
                    return;
                }
                if !ctx.store.selected_ids().contains(&id) {
                    ctx.store.select(&[id]);
                }
                ctx.transition("select.translating", StateInfo::from_event(event));
            }
            PointerTarget::Handle { shape, .. } => {
                ctx.store.select(&[shape]);
                ctx.transition("select.resizing", StateInfo::from_event(event));
            }
        }
    }

    fn on_key_down(&mut self, ctx: &mut StateCtx<'_>, key: &str, event: &InputEvent) {
        let modifiers = event.modifiers().unwrap_or_default();
        match ShortcutMap::resolve(key, modifiers) {
            Some(ShortcutAction::Delete) => {
                let ids = ctx.store.selected_ids().to_vec();
                if !ids.is_empty() {
                    let mark = ctx.store.mark_history_stopping_point("deleting");
                    ctx.store.delete_shapes(&ids);
                    ctx.store.squash_to_mark(mark);
                }
            }
            Some(ShortcutAction::SelectAll) => ctx.store.select_all(),
            Some(ShortcutAction::EnterCrop) => {
                let Some(shape) = ctx.store.only_selected_shape() else {
                    return;
                };
                if shape.crop().is_some() {
                    let id = shape.id;
                    ctx.transition("select.crop", StateInfo::for_shape(id));
                }
            }
            _ => {}
        }
    }
}

impl Activation for SelectIdleActivation {
    fn info(&self) -> &StateInfo {
        &self.info
    }

    fn on_event(&mut self, ctx: &mut StateCtx<'_>, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { .. } => self.on_pointer_down(ctx, event),
            InputEvent::KeyDown { key, .. } => self.on_key_down(ctx, key, event),
            _ => {}
        }
    }
}
