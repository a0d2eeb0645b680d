//! Landmark-driven similarity transform for a single overlay.
//!
//! For one face and one filter kind:
//!
//! 1. Read the kind's reference pair and anchor from the landmarks
//! 2. Scale so the asset spans `reference distance * width_factor` pixels
//! 3. Rotate by the angle of the reference pair against the horizontal
//! 4. Pin the asset pivot to the anchor, shifted by the kind's offset
//!
//! The result maps asset pixel coordinates to frame coordinates and back.

use crate::filter::FilterParams;
use crate::types::{BoundingBox, Landmarks, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Frame pixels per asset pixel.
    pub scale: f32,
    /// Rotation in radians, positive clockwise on screen.
    pub angle: f32,
    /// Frame position of the asset pivot.
    pub origin: Point,
    /// Pivot in asset pixel coordinates.
    pub pivot: Point,
    pub asset_width: u32,
    pub asset_height: u32,
}

impl Placement {
    /// Compute the placement of a `asset_width` x `asset_height` asset.
    ///
    /// The rendered size is clamped to the params' width and height limits.
    /// Returns `None` when a required landmark is missing, the reference
    /// distance falls outside the allowed range, or the rendered asset would
    /// be smaller than a pixel in either direction.
    pub fn compute(
        params: &FilterParams,
        landmarks: &Landmarks,
        asset_width: u32,
        asset_height: u32,
    ) -> Option<Self> {
        if asset_width == 0 || asset_height == 0 {
            return None;
        }

        let left = landmarks.get(params.left)?;
        let right = landmarks.get(params.right)?;
        let anchor = params.anchor.resolve(landmarks)?;

        let distance = left.distance(&right);
        if !distance.is_finite()
            || distance < params.min_distance
            || distance > params.max_distance
        {
            return None;
        }

        let (w, h) = (asset_width as f32, asset_height as f32);
        let upper = (params.max_width / w).min(params.max_height / h);
        let lower = (params.min_width / w).max(params.min_height / h).min(upper);
        let scale = (distance * params.width_factor / w).max(lower).min(upper);
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        let target_width = w * scale;

        let angle = left.angle_to(&right);
        let origin = anchor + (params.offset * target_width).rotate(angle);
        let pivot = Point::new(params.pivot.x * w, params.pivot.y * h);

        let placement = Self {
            scale,
            angle,
            origin,
            pivot,
            asset_width,
            asset_height,
        };

        if placement.target_width() < 1.0 || placement.target_height() < 1.0 {
            return None;
        }
        Some(placement)
    }

    /// Rendered width in frame pixels.
    pub fn target_width(&self) -> f32 {
        self.asset_width as f32 * self.scale
    }

    /// Rendered height in frame pixels.
    pub fn target_height(&self) -> f32 {
        self.asset_height as f32 * self.scale
    }

    /// Map an asset coordinate into the frame.
    pub fn to_frame(&self, p: Point) -> Point {
        ((p - self.pivot) * self.scale).rotate(self.angle) + self.origin
    }

    /// Map a frame coordinate into the asset.
    pub fn to_asset(&self, p: Point) -> Point {
        (p - self.origin).rotate(-self.angle) * (1.0 / self.scale) + self.pivot
    }

    /// Axis-aligned frame box covering the rotated asset.
    pub fn bounds(&self) -> BoundingBox {
        let (w, h) = (self.asset_width as f32, self.asset_height as f32);
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ];
        // Four corners always produce a box
        BoundingBox::enclosing(corners.map(|c| self.to_frame(c)))
            .unwrap_or(BoundingBox::new(self.origin.x, self.origin.y, 0.0, 0.0))
    }
}
