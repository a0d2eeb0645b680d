//! Overlay filters: one per filter kind, each owning an asset store and a
//! placement rule.

use std::fmt;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::asset::{AssetStore, Direction};
use crate::composite::overlay;
use crate::placement::Placement;
use crate::types::{Landmarks, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Glasses,
    Hat,
    Nose,
    Mouth,
    FaceMask,
}

impl FilterKind {
    pub const ALL: [FilterKind; 5] = [
        FilterKind::Glasses,
        FilterKind::Hat,
        FilterKind::Nose,
        FilterKind::Mouth,
        FilterKind::FaceMask,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Glasses => "glasses",
            FilterKind::Hat => "hat",
            FilterKind::Nose => "nose",
            FilterKind::Mouth => "mouth",
            FilterKind::FaceMask => "face",
        }
    }

    /// Default placement rule for this kind (iBUG 68-point indices).
    pub fn params(self) -> FilterParams {
        match self {
            // Outer eye corners, centered on the eye line
            FilterKind::Glasses => FilterParams {
                left: 36,
                right: 45,
                anchor: Anchor::Midpoint(36, 45),
                width_factor: 1.45,
                pivot: Point::new(0.5, 0.5),
                offset: Point::zero(),
                min_width: 16.0,
                max_width: 1024.0,
                max_height: 512.0,
                ..FilterParams::DEFAULT
            },
            // Face width at the temples; brim rests just above the brows
            FilterKind::Hat => FilterParams {
                left: 0,
                right: 16,
                anchor: Anchor::Midpoint(19, 24),
                width_factor: 1.35,
                pivot: Point::new(0.5, 1.0),
                offset: Point::new(0.0, -0.12),
                min_width: 24.0,
                max_width: 1280.0,
                max_height: 1024.0,
                ..FilterParams::DEFAULT
            },
            // Nostril span, hung from the nose tip
            FilterKind::Nose => FilterParams {
                left: 31,
                right: 35,
                anchor: Anchor::Landmark(30),
                width_factor: 1.9,
                pivot: Point::new(0.5, 0.6),
                offset: Point::zero(),
                min_width: 8.0,
                max_width: 512.0,
                max_height: 512.0,
                ..FilterParams::DEFAULT
            },
            // Mouth corners, centered between the lips
            FilterKind::Mouth => FilterParams {
                left: 48,
                right: 54,
                anchor: Anchor::Midpoint(51, 57),
                width_factor: 1.45,
                pivot: Point::new(0.5, 0.5),
                offset: Point::zero(),
                min_width: 12.0,
                max_width: 768.0,
                max_height: 512.0,
                ..FilterParams::DEFAULT
            },
            FilterKind::FaceMask => FilterParams {
                left: 0,
                right: 16,
                anchor: Anchor::Landmark(29),
                width_factor: 1.15,
                pivot: Point::new(0.5, 0.55),
                offset: Point::zero(),
                min_width: 24.0,
                max_width: 1280.0,
                max_height: 1600.0,
                ..FilterParams::DEFAULT
            },
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an asset's pivot is pinned on the face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    Landmark(usize),
    Midpoint(usize, usize),
}

impl Anchor {
    pub fn resolve(&self, landmarks: &Landmarks) -> Option<Point> {
        match *self {
            Anchor::Landmark(idx) => landmarks.get(idx),
            Anchor::Midpoint(a, b) => Some(landmarks.get(a)?.midpoint(&landmarks.get(b)?)),
        }
    }
}

/// Placement rule for one filter kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Reference pair. The distance between them drives scale; the direction
    /// from `left` to `right` drives rotation.
    pub left: usize,
    pub right: usize,
    pub anchor: Anchor,
    /// Rendered asset width as a multiple of the reference distance.
    pub width_factor: f32,
    /// Point of the asset, in [0,1] asset coordinates, pinned to the anchor.
    pub pivot: Point,
    /// Shift of the pivot away from the anchor, in units of rendered width,
    /// measured along the face's own axes.
    pub offset: Point,
    /// Reference distances outside this range are treated as bad detections.
    pub min_distance: f32,
    pub max_distance: f32,
    /// Rendered size limits in frame pixels. Scale is clamped so the asset
    /// keeps its aspect ratio; the upper limits win when both cannot hold.
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl FilterParams {
    const DEFAULT: FilterParams = FilterParams {
        left: 0,
        right: 0,
        anchor: Anchor::Landmark(0),
        width_factor: 1.0,
        pivot: Point::new(0.5, 0.5),
        offset: Point::zero(),
        min_distance: 4.0,
        max_distance: 4096.0,
        min_width: 0.0,
        max_width: 4096.0,
        min_height: 0.0,
        max_height: 4096.0,
    };
}

/// Draws the selected asset of one kind onto faces.
#[derive(Debug, Clone)]
pub struct OverlayFilter {
    kind: FilterKind,
    params: FilterParams,
    store: AssetStore,
}

impl OverlayFilter {
    pub fn new(kind: FilterKind, store: AssetStore) -> Self {
        Self::with_params(kind, store, kind.params())
    }

    pub fn with_params(kind: FilterKind, store: AssetStore, params: FilterParams) -> Self {
        Self {
            kind,
            params,
            store,
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Current selection index.
    pub fn index(&self) -> usize {
        self.store.index()
    }

    pub fn cycle(&mut self, direction: Direction) {
        self.store.cycle(direction);
        log::debug!(
            "{} -> #{} ({})",
            self.kind,
            self.store.index(),
            self.store.current().name()
        );
    }

    /// Placement of the current asset for one face, if it can be drawn.
    pub fn placement(&self, landmarks: &Landmarks) -> Option<Placement> {
        let asset = self.store.current();
        Placement::compute(&self.params, landmarks, asset.width(), asset.height())
    }

    /// Composite the current asset onto `frame` for one face.
    ///
    /// Frame size is taken from `frame` itself. Returns whether any pixel was
    /// drawn; empty landmarks, missing anchors, degenerate placements and
    /// fully off-frame placements leave the frame untouched.
    pub fn apply(&self, frame: &mut RgbImage, landmarks: &Landmarks) -> bool {
        if landmarks.is_empty() {
            return false;
        }
        match self.placement(landmarks) {
            Some(placement) => overlay(frame, self.store.current().image(), &placement),
            None => {
                log::trace!("{}: no usable placement for this face", self.kind);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use image::{Rgb, Rgba, RgbaImage};

    fn opaque_store(width: u32, height: u32) -> AssetStore {
        let red = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
        let blue = RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 255]));
        AssetStore::from_assets(vec![Asset::new("red", red), Asset::new("blue", blue)]).unwrap()
    }

    /// A face whose glasses reference points sit level at y = 100.
    fn level_face() -> Landmarks {
        let mut points = vec![Point::new(100.0, 100.0); 68];
        points[36] = Point::new(80.0, 100.0);
        points[45] = Point::new(120.0, 100.0);
        Landmarks::new(points)
    }

    #[test]
    fn kinds_have_distinct_reference_pairs() {
        for kind in FilterKind::ALL {
            let params = kind.params();
            assert_ne!(params.left, params.right, "{kind}");
            assert!(params.width_factor > 0.0);
            assert!(params.left < 68 && params.right < 68);
        }
    }

    #[test]
    fn anchor_resolution() {
        let landmarks = level_face();
        assert_eq!(
            Anchor::Midpoint(36, 45).resolve(&landmarks),
            Some(Point::new(100.0, 100.0))
        );
        assert_eq!(Anchor::Landmark(36).resolve(&landmarks), Some(Point::new(80.0, 100.0)));
        assert_eq!(Anchor::Landmark(80).resolve(&landmarks), None);
    }

    #[test]
    fn empty_landmarks_are_a_no_op() {
        let filter = OverlayFilter::new(FilterKind::Glasses, opaque_store(10, 4));
        let mut frame = RgbImage::from_pixel(64, 64, Rgb([7, 8, 9]));
        let before = frame.clone();

        assert!(!filter.apply(&mut frame, &Landmarks::empty()));
        assert_eq!(frame, before);
    }

    #[test]
    fn short_landmark_set_is_a_no_op() {
        let filter = OverlayFilter::new(FilterKind::Mouth, opaque_store(10, 4));
        let mut frame = RgbImage::from_pixel(64, 64, Rgb([7, 8, 9]));
        let before = frame.clone();
        let five_points = Landmarks::new(vec![Point::new(10.0, 10.0); 5]);

        assert!(!filter.apply(&mut frame, &five_points));
        assert_eq!(frame, before);
    }

    #[test]
    fn draws_current_asset_centered_on_anchor() {
        let filter = OverlayFilter::new(FilterKind::Glasses, opaque_store(58, 20));
        let mut frame = RgbImage::from_pixel(200, 200, Rgb([0, 0, 0]));

        assert!(filter.apply(&mut frame, &level_face()));
        assert_eq!(*frame.get_pixel(100, 100), Rgb([255, 0, 0]));
        assert_eq!(*frame.get_pixel(5, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn cycling_changes_drawn_asset() {
        let mut filter = OverlayFilter::new(FilterKind::Glasses, opaque_store(58, 20));
        filter.cycle(Direction::Next);
        assert_eq!(filter.index(), 1);

        let mut frame = RgbImage::from_pixel(200, 200, Rgb([0, 0, 0]));
        filter.apply(&mut frame, &level_face());
        assert_eq!(*frame.get_pixel(100, 100), Rgb([0, 0, 255]));
    }
}
