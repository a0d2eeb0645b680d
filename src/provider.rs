//! Box-fit landmark provider.
//!
//! Detects face boxes with the SeetaFace frontal detector (`rustface`) and
//! lays the canonical 68-point face layout into each box. This tracks
//! position and size of every face; it does not estimate head roll, so
//! overlays stay level. Any model that yields iBUG-68 landmarks can replace
//! it through [`LandmarkProvider`].

use rustface::{Detector, ImageData};

use crate::config::DetectorConfig;
use crate::error::{Error, Result};
use crate::pipeline::LandmarkProvider;
use crate::types::{BoundingBox, Landmarks, Point};

pub struct BoxFitProvider {
    detector: Box<dyn Detector>,
    layout: Landmarks,
    max_faces: usize,
}

impl BoxFitProvider {
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        let model = config
            .model
            .to_str()
            .ok_or_else(|| Error::Detector("invalid detector model path".into()))?;
        let mut detector = rustface::create_detector(model)
            .map_err(|e| Error::Detector(format!("failed to load {}: {}", model, e)))?;
        detector.set_min_face_size(config.min_face_size);
        detector.set_score_thresh(config.score_threshold);
        detector.set_pyramid_scale_factor(config.pyramid_scale_factor);
        detector.set_slide_window_step(config.slide_window_step, config.slide_window_step);

        log::info!("Face detector loaded from {}", model);
        Ok(Self {
            detector,
            layout: mean_face_layout(),
            max_faces: config.max_faces,
        })
    }
}

impl LandmarkProvider for BoxFitProvider {
    fn detect(&mut self, frame: &image::RgbImage) -> Vec<Landmarks> {
        let gray = image::imageops::grayscale(frame);
        let (width, height) = gray.dimensions();
        let data = ImageData::new(gray.as_raw(), width, height);

        let boxes = self
            .detector
            .detect(&data)
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                let face_box = BoundingBox::new(
                    bbox.x() as f32,
                    bbox.y() as f32,
                    bbox.width() as f32,
                    bbox.height() as f32,
                );
                (face_box, face.score())
            })
            .collect();
        fit_faces(&self.layout, boxes, self.max_faces)
    }
}

/// Fit the layout into the `max_faces` best-scoring boxes, best first.
fn fit_faces(
    layout: &Landmarks,
    mut boxes: Vec<(BoundingBox, f64)>,
    max_faces: usize,
) -> Vec<Landmarks> {
    if boxes.len() > max_faces {
        log::trace!("Keeping {} of {} faces", max_faces, boxes.len());
    }
    boxes.sort_by(|a, b| b.1.total_cmp(&a.1));
    boxes
        .iter()
        .take(max_faces)
        .map(|(face_box, _)| fit_layout(layout, face_box))
        .collect()
}

/// Place a normalized layout into a face box.
pub fn fit_layout(layout: &Landmarks, face_box: &BoundingBox) -> Landmarks {
    layout.map(|p| face_box.denormalize_point(p))
}

/// Approximate iBUG 68-point positions, normalized to a face box.
pub fn mean_face_layout() -> Landmarks {
    let points = vec![
        // Jaw line (0-16)
        Point::new(0.10, 0.35),
        Point::new(0.11, 0.45),
        Point::new(0.12, 0.55),
        Point::new(0.14, 0.65),
        Point::new(0.18, 0.73),
        Point::new(0.24, 0.80),
        Point::new(0.32, 0.85),
        Point::new(0.41, 0.88),
        Point::new(0.50, 0.89), // Chin center
        Point::new(0.59, 0.88),
        Point::new(0.68, 0.85),
        Point::new(0.76, 0.80),
        Point::new(0.82, 0.73),
        Point::new(0.86, 0.65),
        Point::new(0.88, 0.55),
        Point::new(0.89, 0.45),
        Point::new(0.90, 0.35),
        // Right eyebrow (17-21)
        Point::new(0.20, 0.26),
        Point::new(0.25, 0.22),
        Point::new(0.32, 0.21),
        Point::new(0.38, 0.23),
        Point::new(0.43, 0.27),
        // Left eyebrow (22-26)
        Point::new(0.57, 0.27),
        Point::new(0.62, 0.23),
        Point::new(0.68, 0.21),
        Point::new(0.75, 0.22),
        Point::new(0.80, 0.26),
        // Nose bridge (27-30)
        Point::new(0.50, 0.32),
        Point::new(0.50, 0.40),
        Point::new(0.50, 0.48),
        Point::new(0.50, 0.55),
        // Nose bottom (31-35)
        Point::new(0.40, 0.58),
        Point::new(0.45, 0.60),
        Point::new(0.50, 0.62),
        Point::new(0.55, 0.60),
        Point::new(0.60, 0.58),
        // Right eye (36-41)
        Point::new(0.24, 0.32),
        Point::new(0.28, 0.29),
        Point::new(0.34, 0.29),
        Point::new(0.38, 0.33),
        Point::new(0.34, 0.35),
        Point::new(0.28, 0.35),
        // Left eye (42-47)
        Point::new(0.62, 0.33),
        Point::new(0.66, 0.29),
        Point::new(0.72, 0.29),
        Point::new(0.76, 0.32),
        Point::new(0.72, 0.35),
        Point::new(0.66, 0.35),
        // Outer lip (48-59)
        Point::new(0.32, 0.72),
        Point::new(0.38, 0.68),
        Point::new(0.44, 0.66),
        Point::new(0.50, 0.67),
        Point::new(0.56, 0.66),
        Point::new(0.62, 0.68),
        Point::new(0.68, 0.72),
        Point::new(0.62, 0.78),
        Point::new(0.56, 0.80),
        Point::new(0.50, 0.81),
        Point::new(0.44, 0.80),
        Point::new(0.38, 0.78),
        // Inner lip (60-67)
        Point::new(0.36, 0.72),
        Point::new(0.44, 0.70),
        Point::new(0.50, 0.70),
        Point::new(0.56, 0.70),
        Point::new(0.64, 0.72),
        Point::new(0.56, 0.74),
        Point::new(0.50, 0.75),
        Point::new(0.44, 0.74),
    ];

    Landmarks::new(points)
}
