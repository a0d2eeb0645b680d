//! Overlay image loading and selection.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};

use crate::config::AssetConfig;
use crate::error::{AssetLoadReason, Error, Result};
use crate::filter::FilterKind;

/// File extensions treated as overlay images. Anything else in an asset
/// directory is ignored; a listed file that cannot be decoded fails the load.
const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "gif", "webp", "tga", "tif", "tiff", "ico", "avif", "svg",
    "svgz", "heic", "heif", "jxl", "psd",
];

/// One overlay image with its own alpha channel.
#[derive(Debug, Clone)]
pub struct Asset {
    name: String,
    image: RgbaImage,
}

impl Asset {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    /// File name the asset was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// An ordered, non-empty set of assets plus the current selection.
///
/// The decoded images are shared between clones; only the selection index
/// is per-store.
#[derive(Debug, Clone)]
pub struct AssetStore {
    assets: Arc<[Asset]>,
    current: usize,
}

impl AssetStore {
    /// Load every image in `dir`, ordered by file name.
    ///
    /// Fails if the directory is missing, holds no images, or holds an image
    /// file that does not decode.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let metadata =
            fs::metadata(dir).map_err(|_| Error::asset_load(dir, AssetLoadReason::Missing))?;
        if !metadata.is_dir() {
            return Err(Error::asset_load(dir, AssetLoadReason::NotADirectory));
        }

        let entries = fs::read_dir(dir)
            .map_err(|e| Error::asset_load(dir, AssetLoadReason::Unreadable(e.to_string())))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();
        paths.sort();

        let mut assets = Vec::with_capacity(paths.len());
        for path in &paths {
            let name = file_name(path);
            let decode_error = |message: String| {
                Error::asset_load(
                    dir,
                    AssetLoadReason::Decode {
                        file: name.clone(),
                        message,
                    },
                )
            };
            match ImageFormat::from_path(path) {
                Ok(format) if format.reading_enabled() => {}
                _ => return Err(decode_error("unsupported image format".into())),
            }
            let image = image::open(path).map_err(|e| decode_error(e.to_string()))?;
            assets.push(Asset::new(name, image.to_rgba8()));
        }

        if assets.is_empty() {
            return Err(Error::asset_load(dir, AssetLoadReason::Empty));
        }

        log::info!("Loaded {} asset(s) from {}", assets.len(), dir.display());
        Ok(Self {
            assets: assets.into(),
            current: 0,
        })
    }

    /// Build a store from assets already in memory.
    pub fn from_assets(assets: Vec<Asset>) -> Result<Self> {
        if assets.is_empty() {
            return Err(Error::asset_load("<memory>", AssetLoadReason::Empty));
        }
        Ok(Self {
            assets: assets.into(),
            current: 0,
        })
    }

    /// A store over the same assets with the selection back at index 0.
    pub fn fresh(&self) -> Self {
        Self {
            assets: Arc::clone(&self.assets),
            current: 0,
        }
    }

    pub fn current(&self) -> &Asset {
        &self.assets[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Always false for a constructed store; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Asset> {
        self.assets.get(idx)
    }

    /// Move the selection one step, wrapping at either end.
    pub fn cycle(&mut self, direction: Direction) {
        let len = self.assets.len();
        self.current = match direction {
            Direction::Next => (self.current + 1) % len,
            Direction::Prev => (self.current + len - 1) % len,
        };
    }
}

/// Loaded stores for every filter kind.
///
/// Loading all five up front means a broken mask directory is reported at
/// startup rather than on the first mode switch.
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    glasses: AssetStore,
    hat: AssetStore,
    nose: AssetStore,
    mouth: AssetStore,
    face: AssetStore,
}

impl AssetLibrary {
    pub fn new(
        glasses: AssetStore,
        hat: AssetStore,
        nose: AssetStore,
        mouth: AssetStore,
        face: AssetStore,
    ) -> Self {
        Self {
            glasses,
            hat,
            nose,
            mouth,
            face,
        }
    }

    pub fn load(config: &AssetConfig) -> Result<Self> {
        Ok(Self {
            glasses: AssetStore::load(config.dir(FilterKind::Glasses))?,
            hat: AssetStore::load(config.dir(FilterKind::Hat))?,
            nose: AssetStore::load(config.dir(FilterKind::Nose))?,
            mouth: AssetStore::load(config.dir(FilterKind::Mouth))?,
            face: AssetStore::load(config.dir(FilterKind::FaceMask))?,
        })
    }

    pub fn store(&self, kind: FilterKind) -> &AssetStore {
        match kind {
            FilterKind::Glasses => &self.glasses,
            FilterKind::Hat => &self.hat,
            FilterKind::Nose => &self.nose,
            FilterKind::Mouth => &self.mouth,
            FilterKind::FaceMask => &self.face,
        }
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
