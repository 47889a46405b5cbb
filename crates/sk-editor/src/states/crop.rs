//! Crop editing: `select.crop` with its idle state and the crop-translate
//! interaction.

use crate::cursor::CursorKind;
use crate::input::{EventKind, EventKinds, InputEvent, PointerTarget};
use crate::interaction::Interaction;
use crate::machine::{Activation, State, StateCtx, StateInfo};
use sk_core::geometry::translate_crop_change;

pub fn translating_crop() -> Interaction {
    Interaction {
        label: "translating_crop",
        cursor: |_| CursorKind::Move,
        idle: "select.crop.idle",
        edit: |_| translate_crop_change,
        settle: None,
    }
}

/// Holds the cropping flag on the store for as long as crop editing lasts.
pub struct CropState;

struct CropActivation {
    info: StateInfo,
}

impl State for CropState {
    fn enter(&self, ctx: &mut StateCtx<'_>, info: &StateInfo) -> Box<dyn Activation> {
        let id = info
            .shape_id
            .or_else(|| ctx.store.only_selected_shape().map(|s| s.id))
            .filter(|id| ctx.store.shape(*id).is_some_and(|s| s.crop().is_some()));
        match id {
            Some(id) => ctx.store.set_cropping_shape(Some(id)),
            None => {
                log::debug!("crop: no cropped image selected");
                ctx.transition("select.idle", StateInfo::default());
            }
        }
        Box::new(CropActivation { info: info.clone() })
    }
}

impl Activation for CropActivation {
    fn info(&self) -> &StateInfo {
        &self.info
    }

    fn on_exit(self: Box<Self>, ctx: &mut StateCtx<'_>) {
        ctx.store.set_cropping_shape(None);
    }
}

/// Waits for a press on the image being cropped.
pub struct CropIdle;

struct CropIdleActivation {
    info: StateInfo,
}

impl State for CropIdle {
    fn handles(&self) -> EventKinds {
        EventKind::PointerDown | EventKind::Cancel
    }

    fn enter(&self, ctx: &mut StateCtx<'_>, info: &StateInfo) -> Box<dyn Activation> {
        ctx.cursor.reset();
        Box::new(CropIdleActivation { info: info.clone() })
    }
}

impl Activation for CropIdleActivation {
    fn info(&self) -> &StateInfo {
        &self.info
    }

    fn on_event(&mut self, ctx: &mut StateCtx<'_>, event: &InputEvent) {
        match event {
            InputEvent::PointerDown {
                target: PointerTarget::Shape { id },
                ..
            } if ctx.store.cropping_shape_id() == Some(*id) => {
                ctx.transition("select.crop.translating_crop", StateInfo::from_event(event));
            }
            InputEvent::PointerDown { .. } | InputEvent::Cancel => {
                ctx.transition("select.idle", StateInfo::default());
            }
            _ => {}
        }
    }
}
