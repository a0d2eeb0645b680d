//! # face-filters
//!
//! Landmark-anchored overlay filters for live video: glasses, hats, noses,
//! mouths, and full-face masks that follow faces from frame to frame.
//!
//! This crate provides:
//! - **Asset stores**: ordered overlay images (with alpha) per filter kind
//! - **Overlay filters**: per-kind placement rules that scale, rotate and
//!   pin an asset to facial landmarks, then alpha-composite it
//! - **Filter sessions**: the standard/face-mask state machine and its
//!   keyboard controls
//! - **Pipeline**: a capture -> detect -> filter -> render loop over
//!   pluggable frame sources, landmark providers and frame sinks
//!
//! ## Placement
//!
//! For each face and each live filter:
//!
//! 1. Read the filter's two reference landmarks and its anchor
//! 2. Scale the asset so its width is a fixed multiple of the reference
//!    distance
//! 3. Rotate it by the angle of the reference pair against the horizontal
//! 4. Pin the asset's pivot to the anchor (plus a per-kind offset)
//! 5. Resample and alpha-blend it into the frame, clipped to frame bounds
//!
//! ## Quick Start
//!
//! ```rust
//! use face_filters::{
//!     Asset, AssetLibrary, AssetStore, FilterKind, FilterSession, Landmarks, Point,
//! };
//! use image::{Rgb, RgbImage, Rgba, RgbaImage};
//!
//! // One opaque asset per kind (normally loaded with `FilterSession::load`)
//! let store = || {
//!     let img = RgbaImage::from_pixel(40, 16, Rgba([255, 0, 0, 255]));
//!     AssetStore::from_assets(vec![Asset::new("red.png", img)]).unwrap()
//! };
//! let session = FilterSession::from_library(AssetLibrary::new(
//!     store(), store(), store(), store(), store(),
//! ));
//!
//! // Landmarks normally come from a `LandmarkProvider`
//! let mut points = vec![Point::new(100.0, 100.0); 68];
//! points[36] = Point::new(80.0, 100.0);
//! points[45] = Point::new(120.0, 100.0);
//! let face = Landmarks::new(points);
//!
//! let mut frame = RgbImage::from_pixel(200, 200, Rgb([0, 0, 0]));
//! let glasses = session.filter(FilterKind::Glasses).unwrap();
//! assert!(glasses.apply(&mut frame, &face));
//! ```
//!
//! ## Custom Landmark Sources
//!
//! Implement [`LandmarkProvider`] for any detector that yields iBUG
//! 68-point landmarks:
//!
//! ```rust
//! use face_filters::{LandmarkProvider, Landmarks};
//!
//! struct MyModel { /* ... */ }
//!
//! impl LandmarkProvider for MyModel {
//!     fn detect(&mut self, frame: &image::RgbImage) -> Vec<Landmarks> {
//!         // One entry per face, points in frame pixels
//!         Vec::new()
//!     }
//! }
//! ```

mod asset;
#[cfg(feature = "camera")]
mod camera;
mod composite;
mod config;
mod error;
mod filter;
mod input;
mod pipeline;
mod placement;
mod provider;
mod sequence;
mod session;
mod types;

pub use asset::{Asset, AssetLibrary, AssetStore, Direction};
#[cfg(feature = "camera")]
pub use camera::CameraSource;
pub use composite::overlay;
pub use config::{AppConfig, AssetConfig, CaptureConfig, DetectorConfig};
pub use error::{AssetLoadReason, Error, Result};
pub use filter::{Anchor, FilterKind, FilterParams, OverlayFilter};
pub use input::{Command, InputController, KeyBindings, KeyPair};
pub use pipeline::{
    process_frame, run, FrameSink, FrameSource, FrameStats, LandmarkProvider, RunSummary,
};
pub use placement::Placement;
pub use provider::{fit_layout, mean_face_layout, BoxFitProvider};
pub use sequence::{DirectorySink, ImageSequenceSource};
pub use session::{FilterSession, Mode, Transition};
pub use types::{BoundingBox, Landmarks, Point};
