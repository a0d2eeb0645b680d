//! Filter session state machine.
//!
//! A session is either in `Standard` mode (glasses, hat, nose and mouth
//! filters drawn independently) or `FaceMask` mode (a single full-face
//! mask). Switching modes throws the live filters away and builds the other
//! mode's filters from scratch, so every selection starts again at index 0.

use image::RgbImage;

use crate::asset::{AssetLibrary, Direction};
use crate::config::AssetConfig;
use crate::error::Result;
use crate::filter::{FilterKind, OverlayFilter};
use crate::input::Command;
use crate::types::Landmarks;

const STANDARD_KINDS: [FilterKind; 4] = [
    FilterKind::Glasses,
    FilterKind::Hat,
    FilterKind::Nose,
    FilterKind::Mouth,
];

const FACE_MASK_KINDS: [FilterKind; 1] = [FilterKind::FaceMask];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Standard,
    FaceMask,
}

impl Mode {
    /// Live filter kinds, in draw order.
    pub fn kinds(self) -> &'static [FilterKind] {
        match self {
            Mode::Standard => &STANDARD_KINDS,
            Mode::FaceMask => &FACE_MASK_KINDS,
        }
    }

    pub fn owns(self, kind: FilterKind) -> bool {
        self.kinds().contains(&kind)
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Standard => Mode::FaceMask,
            Mode::FaceMask => Mode::Standard,
        }
    }
}

/// What the driving loop should do after a command.
#[derive(Debug)]
pub enum Transition {
    Continue(FilterSession),
    Quit(FilterSession),
}

impl Transition {
    pub fn is_quit(&self) -> bool {
        matches!(self, Transition::Quit(_))
    }

    pub fn into_session(self) -> FilterSession {
        match self {
            Transition::Continue(session) | Transition::Quit(session) => session,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterSession {
    mode: Mode,
    filters: Vec<OverlayFilter>,
    library: AssetLibrary,
}

impl FilterSession {
    /// Load every asset directory and start in `Standard` mode.
    pub fn load(config: &AssetConfig) -> Result<Self> {
        Ok(Self::from_library(AssetLibrary::load(config)?))
    }

    pub fn from_library(library: AssetLibrary) -> Self {
        Self::build(Mode::Standard, library)
    }

    fn build(mode: Mode, library: AssetLibrary) -> Self {
        let filters = mode
            .kinds()
            .iter()
            .map(|&kind| OverlayFilter::new(kind, library.store(kind).fresh()))
            .collect();
        Self {
            mode,
            filters,
            library,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Live filters in draw order.
    pub fn filters(&self) -> &[OverlayFilter] {
        &self.filters
    }

    pub fn filter(&self, kind: FilterKind) -> Option<&OverlayFilter> {
        self.filters.iter().find(|f| f.kind() == kind)
    }

    /// Switch to the other mode with freshly built filters.
    pub fn toggle(self) -> Self {
        let mode = self.mode.toggled();
        log::debug!("Switching filter mode: {:?} -> {:?}", self.mode, mode);
        Self::build(mode, self.library)
    }

    /// Cycle the selection of `kind`. Returns false if `kind` is not live in
    /// the current mode.
    pub fn cycle(&mut self, kind: FilterKind, direction: Direction) -> bool {
        match self.filters.iter_mut().find(|f| f.kind() == kind) {
            Some(filter) => {
                filter.cycle(direction);
                true
            }
            None => false,
        }
    }

    /// Apply a command and report whether the loop should keep going.
    pub fn handle(mut self, command: Command) -> Transition {
        match command {
            Command::Cycle { kind, direction } => {
                if !self.cycle(kind, direction) {
                    log::debug!("Ignoring {kind} cycle in {:?} mode", self.mode);
                }
                Transition::Continue(self)
            }
            Command::Toggle => Transition::Continue(self.toggle()),
            Command::Quit => Transition::Quit(self),
        }
    }

    /// Draw every live filter onto every face, faces in detection order.
    ///
    /// Returns the number of overlays drawn.
    pub fn apply(&self, frame: &mut RgbImage, faces: &[Landmarks]) -> usize {
        let mut drawn = 0;
        for face in faces {
            for filter in &self.filters {
                if filter.apply(frame, face) {
                    drawn += 1;
                }
            }
        }
        drawn
    }
}
