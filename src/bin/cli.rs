//! Headless face filters over still images or a directory of frames.
//!
//! Usage:
//!   face-filters <input> -o out/                 # Filter every frame
//!   face-filters <input> -o out/ --keys "dd.f"   # Script key presses, one per frame
//!   face-filters <input> -o out/ --config filters.json

use clap::Parser;
use face_filters::{
    run, AppConfig, AssetConfig, BoxFitProvider, DirectorySink, FilterSession,
    ImageSequenceSource, InputController,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "face-filters")]
#[command(author, version, about = "Apply landmark-anchored overlay filters to image frames", long_about = None)]
struct Args {
    /// Input image file or directory of frames
    #[arg(required = true)]
    input: PathBuf,

    /// Output directory for filtered frames
    #[arg(short, long, default_value = "filtered")]
    output: PathBuf,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root of the asset tree (glasses/, hats/, noses/, mouths/, faces/)
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Face detector model path
    #[arg(long)]
    detector: Option<PathBuf>,

    /// Minimum face size for detection
    #[arg(long)]
    min_face_size: Option<u32>,

    /// Maximum faces filtered per frame
    #[arg(long)]
    max_faces: Option<usize>,

    /// Key presses to replay, one per frame ('.' for none)
    #[arg(short, long, default_value = "")]
    keys: String,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run_cli(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(args: &Args) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(root) = &args.assets {
        config.assets = AssetConfig::under(root);
    }
    if let Some(detector) = &args.detector {
        config.detector.model = detector.clone();
    }
    if let Some(size) = args.min_face_size {
        config.detector.min_face_size = size;
    }
    if let Some(max) = args.max_faces {
        config.detector.max_faces = max;
    }
    config.validate()?;
    Ok(config)
}

fn run_cli(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;

    let session = FilterSession::load(&config.assets)?;
    let mut provider = BoxFitProvider::new(&config.detector)?;
    let controller = InputController::new(config.keys.clone());

    let source = ImageSequenceSource::open(&args.input)?;
    let mut sink = DirectorySink::create(&args.output)?.with_keys(&args.keys);

    let summary = run(session, &controller, source, &mut provider, &mut sink);
    let written = sink.finish()?;

    log::info!(
        "Wrote {} frame(s) to {} (mode: {:?}, avg {:.1} fps)",
        written,
        args.output.display(),
        summary.session.mode(),
        summary.stats.fps()
    );
    for filter in summary.session.filters() {
        log::debug!(
            "  {}: #{} ({})",
            filter.kind(),
            filter.index(),
            filter.store().current().name()
        );
    }

    Ok(())
}
