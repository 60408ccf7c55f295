//! Image-space geometry: boxes, motion transforms, size windows, regions.
//!
//! All coordinates are in the detector's image space. There is no separate
//! normalization step.

use serde::{Deserialize, Serialize};

/// Width and height of a source frame in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box, `left <= right` and `top <= bottom` for well-formed boxes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Box of the given size centred on `(cx, cy)`.
    #[must_use]
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(
            cx - width / 2.0,
            cy - height / 2.0,
            cx + width / 2.0,
            cy + height / 2.0,
        )
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[must_use]
    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    #[must_use]
    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    /// Whether the point lies strictly inside the box.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x > self.left && x < self.right && y > self.top && y < self.bottom
    }

    /// Soft containment: centres closer than half the combined extent on
    /// each axis independently.
    ///
    /// This is the test used both to match detections to zones and to drop
    /// duplicate detections within a frame.
    #[must_use]
    pub fn soft_contains(&self, other: &BoundingBox) -> bool {
        (self.center_x() - other.center_x()).abs() < (self.width() + other.width()) / 2.0
            && (self.center_y() - other.center_y()).abs() < (self.height() + other.height()) / 2.0
    }

    /// Clamp to the frame and convert to whole pixels.
    ///
    /// Fails when nothing of the box remains inside the frame.
    pub fn clamp_to(&self, frame: FrameSize) -> Result<Region, RegionError> {
        if ![self.left, self.top, self.right, self.bottom]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(RegionError::NonFinite);
        }

        let left = self.left.max(0.0).floor() as u32;
        let top = self.top.max(0.0).floor() as u32;
        let right = (self.right.min(frame.width as f32).floor().max(0.0) as u32).min(frame.width);
        let bottom = (self.bottom.min(frame.height as f32).floor().max(0.0) as u32).min(frame.height);

        if right <= left || bottom <= top {
            return Err(RegionError::Empty {
                bbox: *self,
                frame,
            });
        }

        Ok(Region {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }
}

/// Rigid motion between two observations of the same box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxTransform {
    pub dx: f32,
    pub dy: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl BoxTransform {
    /// Transform taking `previous` to `current`.
    ///
    /// `None` when `previous` has zero width or height.
    #[must_use]
    pub fn between(previous: &BoundingBox, current: &BoundingBox) -> Option<Self> {
        if previous.width() == 0.0 || previous.height() == 0.0 {
            return None;
        }
        Some(Self {
            dx: current.center_x() - previous.center_x(),
            dy: current.center_y() - previous.center_y(),
            scale_x: current.width() / previous.width(),
            scale_y: current.height() / previous.height(),
        })
    }

    /// Same translation with scale reset to 1.
    #[must_use]
    pub fn translation_only(self) -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            ..self
        }
    }

    /// Move and scale a box about its own centre.
    #[must_use]
    pub fn apply(&self, bbox: &BoundingBox) -> BoundingBox {
        BoundingBox::from_center(
            bbox.center_x() + self.dx,
            bbox.center_y() + self.dy,
            bbox.width() * self.scale_x,
            bbox.height() * self.scale_y,
        )
    }
}

/// Plausible card-size limits for detections.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeWindow {
    pub min_width: f32,
    pub min_height: f32,
    pub max_width: f32,
    pub max_height: f32,
}

impl SizeWindow {
    /// Window scaled to a frame: `dimension / min_divisor ..= dimension / max_divisor`.
    #[must_use]
    pub fn for_frame(frame: FrameSize, min_divisor: f32, max_divisor: f32) -> Self {
        let (w, h) = (frame.width as f32, frame.height as f32);
        Self {
            min_width: w / min_divisor,
            min_height: h / min_divisor,
            max_width: w / max_divisor,
            max_height: h / max_divisor,
        }
    }

    /// Whether a box has a plausible card size.
    #[must_use]
    pub fn admits(&self, bbox: &BoundingBox) -> bool {
        let (w, h) = (bbox.width(), bbox.height());
        w >= self.min_width && w <= self.max_width && h >= self.min_height && h <= self.max_height
    }
}

/// A validated, non-empty pixel rectangle inside a frame.
///
/// Only produced by [`BoundingBox::clamp_to`]; this is what classifiers see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Whether the region is taller than it is wide.
    #[must_use]
    pub fn is_portrait(&self) -> bool {
        self.width < self.height
    }
}

/// Why a box could not be turned into a region.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RegionError {
    #[error("box {bbox:?} has no area inside a {}x{} frame", frame.width, frame.height)]
    Empty { bbox: BoundingBox, frame: FrameSize },

    #[error("box has non-finite coordinates")]
    NonFinite,
}
