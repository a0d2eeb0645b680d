//! Application configuration.
//!
//! Everything is optional in the JSON file; missing fields fall back to the
//! defaults below. Command-line flags are applied on top by the binaries.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::FilterKind;
use crate::input::KeyBindings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub assets: AssetConfig,
    pub capture: CaptureConfig,
    pub detector: DetectorConfig,
    pub keys: KeyBindings,
}

impl AppConfig {
    /// Read and validate a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.capture.validate()?;
        self.detector.validate()?;
        self.keys.validate()
    }
}

/// One overlay image directory per filter kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub glasses: PathBuf,
    pub hat: PathBuf,
    pub nose: PathBuf,
    pub mouth: PathBuf,
    pub face: PathBuf,
}

impl AssetConfig {
    /// The standard directory layout under `root`.
    pub fn under<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            glasses: root.join("glasses"),
            hat: root.join("hats"),
            nose: root.join("noses"),
            mouth: root.join("mouths"),
            face: root.join("faces"),
        }
    }

    pub fn dir(&self, kind: FilterKind) -> &Path {
        match kind {
            FilterKind::Glasses => &self.glasses,
            FilterKind::Hat => &self.hat,
            FilterKind::Nose => &self.nose,
            FilterKind::Mouth => &self.mouth,
            FilterKind::FaceMask => &self.face,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self::under("imgs")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera index (0 for the default device)
    pub device: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Flip frames horizontally so the preview behaves like a mirror
    pub mirror: bool,
}

impl CaptureConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "capture resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(Error::InvalidConfig("capture fps must be non-zero".into()));
        }
        Ok(())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: 0,
            width: 640,
            height: 480,
            fps: 30,
            mirror: true,
        }
    }
}

/// SeetaFace detector settings used by the box-fit landmark provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub model: PathBuf,
    pub min_face_size: u32,
    pub score_threshold: f64,
    pub pyramid_scale_factor: f32,
    pub slide_window_step: u32,
    /// Faces kept per frame, highest detector score first.
    pub max_faces: usize,
}

impl DetectorConfig {
    fn validate(&self) -> Result<()> {
        if !(self.pyramid_scale_factor > 0.0 && self.pyramid_scale_factor < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "pyramid scale factor must be in (0, 1), got {}",
                self.pyramid_scale_factor
            )));
        }
        if self.slide_window_step == 0 {
            return Err(Error::InvalidConfig("slide window step must be non-zero".into()));
        }
        if self.max_faces == 0 {
            return Err(Error::InvalidConfig("max faces must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("seeta_fd_frontal_v1.0.bin"),
            min_face_size: 20,
            score_threshold: 2.0,
            pyramid_scale_factor: 0.8,
            slide_window_step: 4,
            max_faces: 2,
        }
    }
}
