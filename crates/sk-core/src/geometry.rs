//! Edit geometry: pure functions from (original shape, pointer delta,
//! modifiers) to a partial update.
//!
//! Interactions never mutate shapes directly. They keep the shape as it was
//! at gesture start and ask one of these functions for the partial that
//! corresponds to the *total* delta so far, which makes every update
//! idempotent.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Translate / crop | Resize |
//! |----------|------------------|--------|
//! | **Shift** | Lock to dominant axis | Keep aspect ratio |
//! | **Alt** | (none) | Resize about the center |

use crate::model::{Crop, Shape, ShapePartial};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest width/height a resize can produce.
pub const MIN_SIZE: f64 = 1.0;

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
        ctrl: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        alt: false,
        ctrl: false,
        meta: false,
    };

    pub const ALT: Modifiers = Modifiers {
        shift: false,
        alt: true,
        ctrl: false,
        meta: false,
    };

    /// Ctrl on Windows/Linux, ⌘ on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Which corner of a shape's bounds is being dragged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl ResizeHandle {
    /// Unit direction of the corner from the shape's center (±1 per axis).
    fn direction(self) -> Vec2 {
        match self {
            Self::TopLeft => Vec2::new(-1.0, -1.0),
            Self::TopRight => Vec2::new(1.0, -1.0),
            Self::BottomLeft => Vec2::new(-1.0, 1.0),
            Self::BottomRight => Vec2::new(1.0, 1.0),
        }
    }
}

/// Signature shared by every edit function.
pub type EditFn = fn(&Shape, Vec2, Modifiers) -> Option<ShapePartial>;

/// Zero out the minor axis of `delta`.
pub fn flatten_to_dominant_axis(delta: Vec2) -> Vec2 {
    if delta.x.abs() < delta.y.abs() {
        Vec2::new(0.0, delta.y)
    } else {
        Vec2::new(delta.x, 0.0)
    }
}

/// Rotate a page-space vector by `angle` radians.
pub fn rotate(v: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

// ─── Crop ────────────────────────────────────────────────────────────────

/// Slide the image under a cropped shape's frame by `delta`.
///
/// The frame stays put; the crop window moves the opposite way, clamped so it
/// never leaves the source image, and keeps its size.
/// Returns `None` for uncropped or locked shapes.
pub fn translate_crop_change(shape: &Shape, delta: Vec2, modifiers: Modifiers) -> Option<ShapePartial> {
    if shape.is_locked {
        return None;
    }
    let old = shape.crop()?;
    let delta = if modifiers.shift {
        flatten_to_dominant_axis(delta)
    } else {
        delta
    };
    let delta = rotate(delta, -shape.rotation);

    let (w, h) = shape.size();
    let full = old.full_size(w, h);
    let size = old.size();

    let x = (old.top_left.x - delta.x / full.x).clamp(0.0, (1.0 - size.x).max(0.0));
    let y = (old.top_left.y - delta.y / full.y).clamp(0.0, (1.0 - size.y).max(0.0));
    let top_left = Point::new(x, y);
    let crop = Crop::new(top_left, top_left + size);

    Some(ShapePartial::new(shape.id).with_crop(crop))
}

// ─── Translate ───────────────────────────────────────────────────────────

/// Move a shape by `delta`. Shift locks to the dominant axis.
pub fn translate_shape_change(shape: &Shape, delta: Vec2, modifiers: Modifiers) -> Option<ShapePartial> {
    if shape.is_locked {
        return None;
    }
    let delta = if modifiers.shift {
        flatten_to_dominant_axis(delta)
    } else {
        delta
    };
    Some(ShapePartial::new(shape.id).with_position(shape.x + delta.x, shape.y + delta.y))
}

// ─── Resize ──────────────────────────────────────────────────────────────

/// Resize a shape by dragging one corner `delta` page units.
///
/// The opposite corner stays fixed (or, with Alt, the center does). Shift
/// keeps the original aspect ratio. Dragging past the fixed corner flips the
/// box, which is normalized back to a positive size.
pub fn resize_box_change(
    shape: &Shape,
    delta: Vec2,
    modifiers: Modifiers,
    handle: ResizeHandle,
) -> Option<ShapePartial> {
    if shape.is_locked {
        return None;
    }
    let (w, h) = shape.size();
    let local = rotate(delta, -shape.rotation);
    let dir = handle.direction();

    // Signed growth along the handle's direction.
    let scale = if modifiers.alt { 2.0 } else { 1.0 };
    let mut new_w = w + local.x * dir.x * scale;
    let mut new_h = h + local.y * dir.y * scale;

    if modifiers.shift && w > 0.0 && h > 0.0 {
        let sx = new_w / w;
        let sy = new_h / h;
        let s = if sx.abs() > sy.abs() { sx } else { sy };
        new_w = w * s.abs() * sx.signum();
        new_h = h * s.abs() * sy.signum();
    }

    // Shape-local position of the new top-left corner.
    let origin = if modifiers.alt {
        let center = Vec2::new(w / 2.0, h / 2.0);
        center - Vec2::new(new_w.abs() / 2.0, new_h.abs() / 2.0)
    } else {
        // The fixed corner is the one opposite the handle.
        let fixed = Vec2::new(
            if dir.x < 0.0 { w } else { 0.0 },
            if dir.y < 0.0 { h } else { 0.0 },
        );
        let moving = fixed + Vec2::new(new_w * dir.x, new_h * dir.y);
        Vec2::new(fixed.x.min(moving.x), fixed.y.min(moving.y))
    };

    let page_origin = shape.position() + rotate(origin, shape.rotation);
    Some(
        ShapePartial::new(shape.id)
            .with_position(page_origin.x, page_origin.y)
            .with_size(new_w.abs().max(MIN_SIZE), new_h.abs().max(MIN_SIZE)),
    )
}

pub fn resize_from_top_left(shape: &Shape, delta: Vec2, modifiers: Modifiers) -> Option<ShapePartial> {
    resize_box_change(shape, delta, modifiers, ResizeHandle::TopLeft)
}

pub fn resize_from_top_right(shape: &Shape, delta: Vec2, modifiers: Modifiers) -> Option<ShapePartial> {
    resize_box_change(shape, delta, modifiers, ResizeHandle::TopRight)
}

pub fn resize_from_bottom_left(shape: &Shape, delta: Vec2, modifiers: Modifiers) -> Option<ShapePartial> {
    resize_box_change(shape, delta, modifiers, ResizeHandle::BottomLeft)
}

pub fn resize_from_bottom_right(shape: &Shape, delta: Vec2, modifiers: Modifiers) -> Option<ShapePartial> {
    resize_box_change(shape, delta, modifiers, ResizeHandle::BottomRight)
}

impl ResizeHandle {
    /// The edit function for dragging this corner.
    pub fn edit_fn(self) -> EditFn {
        match self {
            Self::TopLeft => resize_from_top_left,
            Self::TopRight => resize_from_top_right,
            Self::BottomLeft => resize_from_bottom_left,
            Self::BottomRight => resize_from_bottom_right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RecordId;
    use crate::model::ShapeKind;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn cropped() -> Shape {
        Shape::new(
            RecordId::intern("shape:photo"),
            ShapeKind::image(
                100.0,
                100.0,
                Some(Crop::new(Point::new(0.25, 0.25), Point::new(0.75, 0.75))),
            ),
        )
        .at(10.0, 10.0)
    }

    #[test]
    fn crop_translate_moves_image_with_pointer() {
        let shape = cropped();
        let partial = translate_crop_change(&shape, Vec2::new(5.0, 5.0), Modifiers::NONE).unwrap();
        let crop = partial.crop.unwrap();
        let offset = crop.offset(100.0, 100.0);
        assert!(close(offset.x, -45.0), "offset.x = {}", offset.x);
        assert!(close(offset.y, -45.0), "offset.y = {}", offset.y);
        assert!(close(crop.size().x, 0.5));
        assert_eq!(partial.x, None);
    }

    #[test]
    fn crop_translate_clamps_to_source() {
        let shape = cropped();
        let partial =
            translate_crop_change(&shape, Vec2::new(1000.0, -1000.0), Modifiers::NONE).unwrap();
        let crop = partial.crop.unwrap();
        assert!(close(crop.top_left.x, 0.0));
        assert!(close(crop.top_left.y, 0.5));
        assert!(close(crop.bottom_right.y, 1.0));
    }

    #[test]
    fn crop_translate_shift_locks_axis() {
        let shape = cropped();
        let partial = translate_crop_change(&shape, Vec2::new(2.0, 8.0), Modifiers::SHIFT).unwrap();
        let crop = partial.crop.unwrap();
        assert!(close(crop.top_left.x, 0.25));
        assert!(close(crop.top_left.y, 0.25 - 8.0 / 200.0));
    }

    #[test]
    fn crop_translate_needs_a_crop() {
        let mut shape = cropped();
        shape.kind = ShapeKind::image(100.0, 100.0, None);
        assert_eq!(translate_crop_change(&shape, Vec2::new(1.0, 1.0), Modifiers::NONE), None);
    }

    #[test]
    fn translate_respects_lock() {
        let mut shape = cropped();
        let partial = translate_shape_change(&shape, Vec2::new(3.0, 4.0), Modifiers::NONE).unwrap();
        assert_eq!((partial.x, partial.y), (Some(13.0), Some(14.0)));
        shape.is_locked = true;
        assert_eq!(translate_shape_change(&shape, Vec2::new(3.0, 4.0), Modifiers::NONE), None);
    }

    #[test]
    fn resize_bottom_right() {
        let shape = Shape::new(RecordId::intern("shape:box"), ShapeKind::rectangle(100.0, 50.0))
            .at(10.0, 10.0);
        let p = resize_box_change(&shape, Vec2::new(20.0, 10.0), Modifiers::NONE, ResizeHandle::BottomRight)
            .unwrap();
        assert_eq!((p.x, p.y, p.w, p.h), (Some(10.0), Some(10.0), Some(120.0), Some(60.0)));
    }

    #[test]
    fn resize_top_left_moves_origin() {
        let shape = Shape::new(RecordId::intern("shape:box"), ShapeKind::rectangle(100.0, 50.0))
            .at(10.0, 10.0);
        let p = resize_box_change(&shape, Vec2::new(10.0, 10.0), Modifiers::NONE, ResizeHandle::TopLeft)
            .unwrap();
        assert_eq!((p.x, p.y, p.w, p.h), (Some(20.0), Some(20.0), Some(90.0), Some(40.0)));
    }

    #[test]
    fn resize_past_fixed_corner_flips() {
        let shape = Shape::new(RecordId::intern("shape:box"), ShapeKind::rectangle(100.0, 50.0));
        let p = resize_box_change(&shape, Vec2::new(-150.0, 0.0), Modifiers::NONE, ResizeHandle::BottomRight)
            .unwrap();
        assert_eq!((p.x, p.w), (Some(-50.0), Some(50.0)));
    }

    #[test]
    fn resize_shift_keeps_aspect() {
        let shape = Shape::new(RecordId::intern("shape:box"), ShapeKind::rectangle(100.0, 50.0));
        let p = resize_box_change(&shape, Vec2::new(100.0, 0.0), Modifiers::SHIFT, ResizeHandle::BottomRight)
            .unwrap();
        assert_eq!((p.w, p.h), (Some(200.0), Some(100.0)));
    }

    #[test]
    fn resize_alt_is_symmetric() {
        let shape = Shape::new(RecordId::intern("shape:box"), ShapeKind::rectangle(100.0, 50.0));
        let p = resize_box_change(&shape, Vec2::new(10.0, 5.0), Modifiers::ALT, ResizeHandle::BottomRight)
            .unwrap();
        assert_eq!((p.x, p.y, p.w, p.h), (Some(-10.0), Some(-5.0), Some(120.0), Some(60.0)));
    }
}
