//! Webcam frame source using the nokhwa crate.

use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

use crate::config::CaptureConfig;
use crate::error::{Error, Result};
use crate::pipeline::FrameSource;

/// An open camera stream. The stream is stopped when this is dropped.
pub struct CameraSource {
    camera: Camera,
    mirror: bool,
}

impl CameraSource {
    /// Open the configured device, asking for the closest format to the
    /// configured resolution and frame rate.
    pub fn open(config: &CaptureConfig) -> Result<Self> {
        let format = CameraFormat::new(
            Resolution::new(config.width, config.height),
            FrameFormat::MJPEG,
            config.fps,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        let mut camera = Camera::new(CameraIndex::Index(config.device), requested)
            .map_err(|e| Error::Capture(format!("failed to open camera {}: {}", config.device, e)))?;
        camera
            .open_stream()
            .map_err(|e| Error::Capture(format!("failed to start stream: {}", e)))?;

        log::info!(
            "Camera opened: {} ({}x{} @ {} fps)",
            camera.info().human_name(),
            camera.resolution().width(),
            camera.resolution().height(),
            camera.frame_rate()
        );

        Ok(Self {
            camera,
            mirror: config.mirror,
        })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Option<RgbImage> {
        let buffer = match self.camera.frame() {
            Ok(buffer) => buffer,
            Err(e) => {
                log::warn!("Failed to capture frame: {}", e);
                return None;
            }
        };
        let decoded = match buffer.decode_image::<RgbFormat>() {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("Failed to decode frame: {}", e);
                return None;
            }
        };

        let (width, height) = (decoded.width(), decoded.height());
        let mut frame = RgbImage::from_raw(width, height, decoded.into_raw())?;
        if self.mirror {
            image::imageops::flip_horizontal_in_place(&mut frame);
        }
        Some(frame)
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            log::warn!("Failed to stop camera stream: {}", e);
        }
        log::info!("Camera released");
    }
}
