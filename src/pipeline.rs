//! Capture -> detect -> filter -> render -> poll loop.
//!
//! The loop only talks to its collaborators through three traits, so the
//! session can be driven by a webcam and a window, by files on disk, or by
//! synthetic frames in tests.

use std::time::Instant;

use image::RgbImage;

use crate::input::InputController;
use crate::session::{FilterSession, Transition};
use crate::types::Landmarks;

/// Produces frames until the stream ends.
pub trait FrameSource {
    /// Next frame, or `None` at end of stream. Read failures also end the
    /// stream.
    fn next_frame(&mut self) -> Option<RgbImage>;
}

/// Finds faces in a frame.
pub trait LandmarkProvider {
    /// One landmark set per detected face, in frame pixel coordinates.
    fn detect(&mut self, frame: &RgbImage) -> Vec<Landmarks>;
}

/// Shows frames and reports key presses.
pub trait FrameSink {
    /// Render `frame` and return the most recent key press, if any.
    fn present(&mut self, frame: &RgbImage, stats: &FrameStats) -> Option<char>;
}

/// Smoothing weight for the running FPS estimate.
const FPS_SMOOTHING: f32 = 0.1;

/// Frame counter and frame-rate estimate.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    frames: u64,
    faces: usize,
    fps: f32,
    last: Option<Instant>,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished frame at `now` with `faces` detected faces.
    pub fn tick(&mut self, now: Instant, faces: usize) {
        self.frames += 1;
        self.faces = faces;
        if let Some(last) = self.last {
            let dt = now.duration_since(last).as_secs_f32();
            if dt > 0.0 {
                let instant = 1.0 / dt;
                self.fps = if self.fps == 0.0 {
                    instant
                } else {
                    self.fps + FPS_SMOOTHING * (instant - self.fps)
                };
            }
        }
        self.last = Some(now);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Faces detected in the latest frame.
    pub fn faces(&self) -> usize {
        self.faces
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Detect faces in `frame` and draw the session's filters onto it.
///
/// Returns the number of faces found.
pub fn process_frame<P>(session: &FilterSession, provider: &mut P, frame: &mut RgbImage) -> usize
where
    P: LandmarkProvider + ?Sized,
{
    let faces = provider.detect(frame);
    if !faces.is_empty() {
        let drawn = session.apply(frame, &faces);
        log::trace!("{} face(s), {} overlay(s)", faces.len(), drawn);
    }
    faces.len()
}

/// Result of a finished run.
#[derive(Debug)]
pub struct RunSummary {
    pub session: FilterSession,
    pub stats: FrameStats,
    /// True if the loop stopped on the quit key rather than end of stream.
    pub quit: bool,
}

/// Drive `session` until the source runs dry or the quit key is pressed.
///
/// The source is consumed and dropped before returning, on every exit path,
/// which releases whatever capture device it holds.
pub fn run<S, P, K>(
    mut session: FilterSession,
    controller: &InputController,
    mut source: S,
    provider: &mut P,
    sink: &mut K,
) -> RunSummary
where
    S: FrameSource,
    P: LandmarkProvider + ?Sized,
    K: FrameSink + ?Sized,
{
    let mut stats = FrameStats::new();
    let mut quit = false;

    loop {
        let Some(mut frame) = source.next_frame() else {
            log::info!("End of stream after {} frame(s)", stats.frames());
            break;
        };

        let faces = process_frame(&session, provider, &mut frame);
        stats.tick(Instant::now(), faces);

        let Some(key) = sink.present(&frame, &stats) else {
            continue;
        };
        let Some(command) = controller.command(key, session.mode()) else {
            continue;
        };
        match session.handle(command) {
            Transition::Continue(next) => session = next,
            Transition::Quit(last) => {
                log::info!("Quit requested after {} frame(s)", stats.frames());
                session = last;
                quit = true;
                break;
            }
        }
    }

    drop(source);
    RunSummary {
        session,
        stats,
        quit,
    }
}
