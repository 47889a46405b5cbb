//! Document records for the Sketchkit canvas.
//!
//! A document is a flat table of `Shape` records keyed by `RecordId`.
//! Shapes are mutated through `ShapePartial` values so every change can be
//! captured as a before/after pair by the history (see `crate::history`).

use crate::id::RecordId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

// ─── Styles ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoKind {
    #[default]
    Rectangle,
    Ellipse,
    Oval,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashStyle {
    #[default]
    Draw,
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStyle {
    #[default]
    None,
    Semi,
    Solid,
    Pattern,
}

// ─── Crop ────────────────────────────────────────────────────────────────

/// The visible window of an image, in normalized (0..1) source-image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Crop {
    /// The uncropped window.
    pub const FULL: Crop = Crop {
        top_left: Point::ORIGIN,
        bottom_right: Point::new(1.0, 1.0),
    };

    pub const fn new(top_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Normalized size of the window.
    pub fn size(&self) -> Vec2 {
        self.bottom_right - self.top_left
    }

    /// Page-space size of the full source image when the window is shown at
    /// `w × h`.
    pub fn full_size(&self, w: f64, h: f64) -> Vec2 {
        let size = self.size();
        Vec2::new(w / size.x, h / size.y)
    }

    /// Page-space offset of the full image relative to the shape's frame.
    /// Always `<= 0` on both axes for a valid crop.
    pub fn offset(&self, w: f64, h: f64) -> Vec2 {
        let full = self.full_size(w, h);
        Vec2::new(-self.top_left.x * full.x, -self.top_left.y * full.y)
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────────

/// What kind of shape a record is, with its kind-specific props.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    Geo {
        geo: GeoKind,
        w: f64,
        h: f64,
        dash: DashStyle,
        fill: FillStyle,
    },
    Image {
        w: f64,
        h: f64,
        crop: Option<Crop>,
        asset_id: Option<String>,
    },
    Frame {
        w: f64,
        h: f64,
        name: String,
    },
}

impl ShapeKind {
    pub fn rectangle(w: f64, h: f64) -> Self {
        Self::Geo {
            geo: GeoKind::Rectangle,
            w,
            h,
            dash: DashStyle::default(),
            fill: FillStyle::default(),
        }
    }

    pub fn image(w: f64, h: f64, crop: Option<Crop>) -> Self {
        Self::Image {
            w,
            h,
            crop,
            asset_id: None,
        }
    }

    pub fn frame(w: f64, h: f64) -> Self {
        Self::Frame {
            w,
            h,
            name: String::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Geo { .. } => "geo",
            Self::Image { .. } => "image",
            Self::Frame { .. } => "frame",
        }
    }

    pub fn size(&self) -> (f64, f64) {
        match self {
            Self::Geo { w, h, .. } | Self::Image { w, h, .. } | Self::Frame { w, h, .. } => {
                (*w, *h)
            }
        }
    }
}

/// A shape record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: RecordId,
    /// Containing frame, if any. `None` means the page.
    pub parent_id: Option<RecordId>,
    pub x: f64,
    pub y: f64,
    /// Rotation in radians around the shape's top-left corner.
    pub rotation: f64,
    pub is_locked: bool,
    pub kind: ShapeKind,
}

impl Shape {
    pub fn new(id: RecordId, kind: ShapeKind) -> Self {
        Self {
            id,
            parent_id: None,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            is_locked: false,
            kind,
        }
    }

    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> (f64, f64) {
        self.kind.size()
    }

    /// Axis-aligned page bounds, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.size();
        Rect::new(self.x, self.y, self.x + w, self.y + h)
    }

    pub fn crop(&self) -> Option<Crop> {
        match &self.kind {
            ShapeKind::Image { crop, .. } => *crop,
            _ => None,
        }
    }

    /// Apply a partial update in place. Fields that don't apply to this
    /// shape's kind are ignored. Returns whether anything changed.
    pub fn apply(&mut self, partial: &ShapePartial) -> bool {
        let before = self.clone();
        if let Some(x) = partial.x {
            self.x = x;
        }
        if let Some(y) = partial.y {
            self.y = y;
        }
        if let Some(rotation) = partial.rotation {
            self.rotation = rotation;
        }
        if let Some(locked) = partial.is_locked {
            self.is_locked = locked;
        }
        if let Some(parent_id) = partial.parent_id {
            self.parent_id = parent_id;
        }
        match &mut self.kind {
            ShapeKind::Geo { w, h, .. } => {
                apply_size(w, h, partial);
            }
            ShapeKind::Image { w, h, crop, .. } => {
                apply_size(w, h, partial);
                if let Some(new_crop) = partial.crop {
                    *crop = Some(new_crop);
                }
            }
            ShapeKind::Frame { w, h, name } => {
                apply_size(w, h, partial);
                if let Some(new_name) = &partial.name {
                    name.clone_from(new_name);
                }
            }
        }
        *self != before
    }
}

fn apply_size(w: &mut f64, h: &mut f64, partial: &ShapePartial) {
    if let Some(new_w) = partial.w {
        *w = new_w;
    }
    if let Some(new_h) = partial.h {
        *h = new_h;
    }
}

// ─── Partial updates ─────────────────────────────────────────────────────

/// A sparse update to one shape record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapePartial {
    pub id: RecordId,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
    pub w: Option<f64>,
    pub h: Option<f64>,
    pub crop: Option<Crop>,
    pub name: Option<String>,
    pub is_locked: Option<bool>,
    /// `Some(None)` moves the shape back onto the page.
    pub parent_id: Option<Option<RecordId>>,
}

impl ShapePartial {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            x: None,
            y: None,
            rotation: None,
            w: None,
            h: None,
            crop: None,
            name: None,
            is_locked: None,
            parent_id: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    #[must_use]
    pub fn with_size(mut self, w: f64, h: f64) -> Self {
        self.w = Some(w);
        self.h = Some(h);
        self
    }

    #[must_use]
    pub fn with_crop(mut self, crop: Crop) -> Self {
        self.crop = Some(crop);
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.is_locked = Some(locked);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: Option<RecordId>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Shape {
        Shape::new(
            RecordId::intern("shape:img"),
            ShapeKind::image(
                100.0,
                50.0,
                Some(Crop::new(Point::new(0.25, 0.5), Point::new(0.75, 1.0))),
            ),
        )
        .at(10.0, 20.0)
    }

    #[test]
    fn crop_offset_is_in_page_units() {
        let shape = image();
        let crop = shape.crop().unwrap();
        let full = crop.full_size(100.0, 50.0);
        assert_eq!(full, Vec2::new(200.0, 100.0));
        assert_eq!(crop.offset(100.0, 50.0), Vec2::new(-50.0, -50.0));
    }

    #[test]
    fn apply_ignores_fields_for_other_kinds() {
        let mut rect = Shape::new(RecordId::intern("shape:r"), ShapeKind::rectangle(10.0, 10.0));
        let changed = rect.apply(&ShapePartial::new(rect.id).with_crop(Crop::FULL));
        assert!(!changed);
        assert_eq!(rect.crop(), None);
    }

    #[test]
    fn apply_reports_change() {
        let mut shape = image();
        assert!(shape.apply(&ShapePartial::new(shape.id).with_position(0.0, 0.0)));
        assert!(!shape.apply(&ShapePartial::new(shape.id).with_position(0.0, 0.0)));
        assert_eq!(shape.position(), Point::ORIGIN);
    }

    #[test]
    fn frame_name_update() {
        let mut frame = Shape::new(RecordId::intern("frame:a"), ShapeKind::frame(160.0, 90.0));
        assert!(frame.apply(&ShapePartial::new(frame.id).with_name("Hero")));
        match &frame.kind {
            ShapeKind::Frame { name, .. } => assert_eq!(name, "Hero"),
            _ => panic!("expected Frame"),
        }
    }
}
