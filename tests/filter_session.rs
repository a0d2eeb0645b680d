//! End-to-end session behaviour over asset directories on disk.

use face_filters::{
    fit_layout, mean_face_layout, run, AssetConfig, AssetLoadReason, BoundingBox, Error,
    FilterKind, FilterSession, FrameSink, FrameSource, FrameStats, InputController,
    LandmarkProvider, Landmarks, Mode,
};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::collections::VecDeque;
use std::path::Path;

/// Write `count` solid images per kind under the standard layout.
fn write_assets(root: &Path, count: usize) -> AssetConfig {
    let config = AssetConfig::under(root);
    for kind in FilterKind::ALL {
        let dir = config.dir(kind);
        std::fs::create_dir_all(dir).unwrap();
        for i in 0..count {
            let shade = 60 + 40 * i as u8;
            let img = RgbaImage::from_fn(80, 40, |x, _| {
                // Transparent left quarter, like a real cut-out asset
                let alpha = if x < 20 { 0 } else { 255 };
                Rgba([shade, 255 - shade, 128, alpha])
            });
            img.save(dir.join(format!("{i:02}.png"))).unwrap();
        }
    }
    config
}

fn face_at(x: f32, y: f32) -> Landmarks {
    fit_layout(&mean_face_layout(), &BoundingBox::new(x, y, 180.0, 200.0))
}

struct Frames(VecDeque<RgbImage>);

impl FrameSource for Frames {
    fn next_frame(&mut self) -> Option<RgbImage> {
        self.0.pop_front()
    }
}

struct FixedFaces(Vec<Landmarks>);

impl LandmarkProvider for FixedFaces {
    fn detect(&mut self, _frame: &RgbImage) -> Vec<Landmarks> {
        self.0.clone()
    }
}

/// Records presented frames and replays keys.
struct Recorder {
    keys: VecDeque<Option<char>>,
    frames: Vec<RgbImage>,
}

impl FrameSink for Recorder {
    fn present(&mut self, frame: &RgbImage, _stats: &FrameStats) -> Option<char> {
        self.frames.push(frame.clone());
        self.keys.pop_front().flatten()
    }
}

fn blank_frames(n: usize) -> Frames {
    Frames((0..n).map(|_| RgbImage::from_pixel(640, 480, Rgb([5, 5, 5]))).collect())
}

#[test]
fn load_starts_standard_at_index_zero() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_assets(dir.path(), 3);

    let session = FilterSession::load(&config).unwrap();
    assert_eq!(session.mode(), Mode::Standard);
    assert_eq!(session.filters().len(), 4);
    for filter in session.filters() {
        assert_eq!(filter.index(), 0);
        assert_eq!(filter.store().len(), 3);
        assert_eq!(filter.store().current().name(), "00.png");
    }
}

#[test]
fn missing_mask_directory_fails_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_assets(dir.path(), 1);
    std::fs::remove_dir_all(config.dir(FilterKind::FaceMask)).unwrap();

    match FilterSession::load(&config) {
        Err(Error::AssetLoad { path, reason }) => {
            assert_eq!(reason, AssetLoadReason::Missing);
            assert_eq!(path, config.dir(FilterKind::FaceMask));
        }
        other => panic!("expected asset load error, got {other:?}"),
    }
}

#[test]
fn empty_directory_fails_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_assets(dir.path(), 1);
    let hats = config.dir(FilterKind::Hat);
    std::fs::remove_dir_all(hats).unwrap();
    std::fs::create_dir_all(hats).unwrap();

    assert!(matches!(
        FilterSession::load(&config),
        Err(Error::AssetLoad {
            reason: AssetLoadReason::Empty,
            ..
        })
    ));
}

#[test]
fn no_faces_passes_frames_through() {
    let dir = tempfile::tempdir().unwrap();
    let session = FilterSession::load(&write_assets(dir.path(), 2)).unwrap();

    let mut sink = Recorder {
        keys: VecDeque::new(),
        frames: Vec::new(),
    };
    let summary = run(
        session,
        &InputController::default(),
        blank_frames(3),
        &mut FixedFaces(Vec::new()),
        &mut sink,
    );

    assert_eq!(summary.stats.frames(), 3);
    assert_eq!(summary.stats.faces(), 0);
    for frame in &sink.frames {
        assert!(frame.pixels().all(|p| *p == Rgb([5, 5, 5])));
    }
}

#[test]
fn keys_drive_selection_and_mode() {
    let dir = tempfile::tempdir().unwrap();
    let session = FilterSession::load(&write_assets(dir.path(), 3)).unwrap();

    // glasses next twice, hat prev, mask key ignored, then toggle, mask next
    let keys = [Some('d'), Some('d'), Some('q'), Some('m'), Some('f'), Some('m'), None];
    let mut sink = Recorder {
        keys: keys.into_iter().collect(),
        frames: Vec::new(),
    };

    let summary = run(
        session,
        &InputController::default(),
        blank_frames(keys.len()),
        &mut FixedFaces(vec![face_at(200.0, 140.0)]),
        &mut sink,
    );
    assert!(!summary.quit);

    let session = summary.session;
    assert_eq!(session.mode(), Mode::FaceMask);
    assert_eq!(session.filters().len(), 1);
    assert_eq!(
        session.filter(FilterKind::FaceMask).map(|f| f.index()),
        Some(1)
    );

    // Back to standard: four fresh filters, all at index 0
    let session = session.toggle();
    assert_eq!(session.mode(), Mode::Standard);
    assert!(session.filter(FilterKind::FaceMask).is_none());
    let kinds: Vec<_> = session.filters().iter().map(|f| f.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            FilterKind::Glasses,
            FilterKind::Hat,
            FilterKind::Nose,
            FilterKind::Mouth
        ]
    );
    assert!(session.filters().iter().all(|f| f.index() == 0));
}

#[test]
fn each_face_gets_its_own_overlays() {
    let dir = tempfile::tempdir().unwrap();
    let session = FilterSession::load(&write_assets(dir.path(), 1)).unwrap();

    let left = face_at(40.0, 150.0);
    let right = face_at(400.0, 150.0);

    let mut one = RgbImage::from_pixel(640, 480, Rgb([5, 5, 5]));
    session.apply(&mut one, std::slice::from_ref(&left));
    let mut two = RgbImage::from_pixel(640, 480, Rgb([5, 5, 5]));
    let drawn = session.apply(&mut two, &[left.clone(), right.clone()]);
    assert_eq!(drawn, 8);

    // Left half identical with or without the second face
    for y in 0..480 {
        for x in 0..300 {
            assert_eq!(one.get_pixel(x, y), two.get_pixel(x, y), "({x}, {y})");
        }
    }
    assert!((340..640).any(|x| *two.get_pixel(x, 240) != Rgb([5, 5, 5])));
}

#[test]
fn quit_key_ends_run() {
    let dir = tempfile::tempdir().unwrap();
    let session = FilterSession::load(&write_assets(dir.path(), 1)).unwrap();

    let mut sink = Recorder {
        keys: [None, Some('l')].into_iter().collect(),
        frames: Vec::new(),
    };
    let summary = run(
        session,
        &InputController::default(),
        blank_frames(10),
        &mut FixedFaces(Vec::new()),
        &mut sink,
    );

    assert!(summary.quit);
    assert_eq!(sink.frames.len(), 2);
}
