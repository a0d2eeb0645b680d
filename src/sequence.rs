//! File-backed frame source and sink for headless runs.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::{Error, Result};
use crate::pipeline::{FrameSink, FrameSource, FrameStats};

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp", "tga", "tif", "tiff"];

/// Reads still images as a frame stream: a single file, or every image in a
/// directory in file-name order.
#[derive(Debug)]
pub struct ImageSequenceSource {
    paths: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    pub fn open<P: AsRef<Path>>(input: P) -> Result<Self> {
        let input = input.as_ref();
        let paths = if input.is_dir() {
            let mut paths: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_frame_file(path))
                .collect();
            paths.sort();
            paths
        } else if input.is_file() {
            vec![input.to_path_buf()]
        } else {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such input: {}", input.display()),
            )));
        };

        log::info!("Reading {} frame(s) from {}", paths.len(), input.display());
        Ok(Self {
            paths: paths.into(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Option<RgbImage> {
        let path = self.paths.pop_front()?;
        match image::open(&path) {
            Ok(img) => Some(img.to_rgb8()),
            Err(e) => {
                log::warn!("Failed to read frame {}: {}", path.display(), e);
                self.paths.clear();
                None
            }
        }
    }
}

/// Writes each presented frame as `frame_NNNNN.png` and replays a scripted
/// key sequence, one entry per frame. `.` in the script means "no key".
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: usize,
    keys: VecDeque<char>,
    error: Option<Error>,
}

impl DirectorySink {
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: 0,
            keys: VecDeque::new(),
            error: None,
        })
    }

    pub fn with_keys(mut self, script: &str) -> Self {
        self.keys = script.chars().collect();
        self
    }

    /// Number of frames written, or the first write error.
    pub fn finish(self) -> Result<usize> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.written),
        }
    }

    fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{index:05}.png"))
    }
}

impl FrameSink for DirectorySink {
    fn present(&mut self, frame: &RgbImage, _stats: &FrameStats) -> Option<char> {
        if self.error.is_none() {
            let path = self.frame_path(self.written);
            match frame.save(&path) {
                Ok(()) => self.written += 1,
                Err(e) => {
                    log::error!("Failed to write {}: {}", path.display(), e);
                    self.error = Some(e.into());
                }
            }
        }
        self.keys.pop_front().filter(|&key| key != '.')
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
