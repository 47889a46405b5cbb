//! Shape-creating tools. A press creates a 1×1 shape and hands it to
//! `select.resizing` so the drag sizes it.

use crate::cursor::CursorKind;
use crate::input::{EventKind, EventKinds, InputEvent};
use crate::machine::{Activation, State, StateCtx, StateInfo};
use sk_core::{RecordId, ResizeHandle, Shape, ShapeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateTool {
    Geo,
    Frame,
}

impl CreateTool {
    fn shape_kind(self) -> ShapeKind {
        match self {
            Self::Geo => ShapeKind::rectangle(1.0, 1.0),
            Self::Frame => ShapeKind::frame(1.0, 1.0),
        }
    }
}

pub struct CreateIdle {
    pub tool: CreateTool,
}

struct CreateIdleActivation {
    info: StateInfo,
    tool: CreateTool,
}

impl State for CreateIdle {
    fn handles(&self) -> EventKinds {
        EventKind::PointerDown | EventKind::Cancel
    }

    fn enter(&self, ctx: &mut StateCtx<'_>, info: &StateInfo) -> Box<dyn Activation> {
        ctx.cursor.set(CursorKind::Cross, 0.0);
        Box::new(CreateIdleActivation {
            info: info.clone(),
            tool: self.tool,
        })
    }
}

impl CreateIdleActivation {
    fn create(&mut self, ctx: &mut StateCtx<'_>, event: &InputEvent) {
        let Some(point) = event.point() else {
            return;
        };
        let mark = ctx.store.mark_history_stopping_point("creating");
        let id = RecordId::unique("shape");
        let shape = Shape::new(id, self.tool.shape_kind()).at(point.x, point.y);
        if let Err(err) = ctx.store.create_shapes(vec![shape]) {
            log::warn!("{:?}: {err}", self.tool);
            ctx.store.bail_to_mark(mark);
            return;
        }
        ctx.store.select(&[id]);
        ctx.transition(
            "select.resizing",
            StateInfo {
                shape_id: Some(id),
                handle: Some(ResizeHandle::BottomRight),
                is_creating: true,
                creation_mark: Some(mark),
                ..StateInfo::from_event(event)
            },
        );
    }
}

impl Activation for CreateIdleActivation {
    fn info(&self) -> &StateInfo {
        &self.info
    }

    fn on_event(&mut self, ctx: &mut StateCtx<'_>, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { .. } => self.create(ctx, event),
            InputEvent::Cancel => ctx.transition("select", StateInfo::default()),
            _ => {}
        }
    }

    fn on_exit(self: Box<Self>, ctx: &mut StateCtx<'_>) {
        ctx.cursor.reset();
    }
}
