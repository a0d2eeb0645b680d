//! Live webcam face filters.
//!
//! Run with: cargo run --features gui --bin face-filters-gui

use clap::Parser;
use eframe::egui;
use face_filters::{
    process_frame, AppConfig, AssetConfig, BoxFitProvider, CameraSource, FilterSession,
    FrameSource, FrameStats, InputController, Transition,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "face-filters-gui")]
#[command(author, version, about = "Live webcam face filters", long_about = None)]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root of the asset tree (glasses/, hats/, noses/, mouths/, faces/)
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Face detector model path
    #[arg(long)]
    detector: Option<PathBuf>,

    /// Camera index
    #[arg(long)]
    device: Option<u32>,

    /// Show frames as captured instead of mirrored
    #[arg(long)]
    no_mirror: bool,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let app = match FilterApp::new(&args) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([960.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Face Filters",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
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
    if let Some(device) = args.device {
        config.capture.device = device;
    }
    if args.no_mirror {
        config.capture.mirror = false;
    }
    config.validate()?;
    Ok(config)
}

struct FilterApp {
    // Session is taken out while a command is applied
    session: Option<FilterSession>,
    controller: InputController,

    // Dropping the source releases the camera
    camera: Option<CameraSource>,
    provider: BoxFitProvider,

    stats: FrameStats,
    texture: Option<egui::TextureHandle>,
    status: String,
}

impl FilterApp {
    fn new(args: &Args) -> Result<Self, Box<dyn std::error::Error>> {
        let config = load_config(args)?;
        let session = FilterSession::load(&config.assets)?;
        let provider = BoxFitProvider::new(&config.detector)?;
        let camera = CameraSource::open(&config.capture)?;

        Ok(Self {
            session: Some(session),
            controller: InputController::new(config.keys),
            camera: Some(camera),
            provider,
            stats: FrameStats::new(),
            texture: None,
            status: "Running".to_string(),
        })
    }

    /// Capture, detect and filter one frame, then upload it for display.
    fn capture_frame(&mut self, ctx: &egui::Context) {
        let (Some(camera), Some(session)) = (self.camera.as_mut(), self.session.as_ref()) else {
            return;
        };

        let Some(mut frame) = camera.next_frame() else {
            log::warn!("Camera stream ended");
            self.camera = None;
            self.status = "Camera stream ended".to_string();
            return;
        };

        let faces = process_frame(session, &mut self.provider, &mut frame);
        self.stats.tick(Instant::now(), faces);

        let size = [frame.width() as usize, frame.height() as usize];
        let image = egui::ColorImage::from_rgb(size, frame.as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(image, Default::default()),
            None => self.texture = Some(ctx.load_texture("frame", image, Default::default())),
        }
    }

    /// Apply the most recent key press of this frame, if it maps to a command.
    fn poll_keys(&mut self, ctx: &egui::Context) {
        let key = ctx.input(|i| {
            i.events.iter().rev().find_map(|event| match event {
                egui::Event::Text(text) => text.chars().next(),
                _ => None,
            })
        });
        let Some(key) = key else {
            return;
        };
        let Some(session) = self.session.take() else {
            return;
        };

        let transition = match self.controller.command(key, session.mode()) {
            Some(command) => session.handle(command),
            None => Transition::Continue(session),
        };
        match transition {
            Transition::Continue(session) => self.session = Some(session),
            Transition::Quit(session) => {
                self.session = Some(session);
                self.camera = None;
                self.status = "Quitting".to_string();
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    fn side_panel(&self, ui: &mut egui::Ui) {
        ui.heading("Filters");
        ui.separator();

        if let Some(session) = &self.session {
            ui.label(format!("Mode: {:?}", session.mode()));
            ui.add_space(8.0);
            for filter in session.filters() {
                let keys = self.controller.bindings().pair(filter.kind());
                ui.label(format!(
                    "{} [{}/{}]: #{} {}",
                    filter.kind(),
                    keys.prev,
                    keys.next,
                    filter.index(),
                    filter.store().current().name()
                ));
            }
        }
        ui.add_space(16.0);

        ui.heading("Status");
        ui.separator();
        ui.label(&self.status);
        ui.label(format!("FPS: {:.0}", self.stats.fps()));
        ui.label(format!("Faces: {}", self.stats.faces()));
        ui.add_space(8.0);

        let keys = self.controller.bindings();
        ui.label(format!("'{}' toggle face mask", keys.toggle));
        ui.label(format!("'{}' quit", keys.quit));
    }
}

impl eframe::App for FilterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.capture_frame(ctx);
        self.poll_keys(ctx);

        egui::SidePanel::left("controls").min_width(220.0).show(ctx, |ui| {
            self.side_panel(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(texture) = &self.texture {
                let available_size = ui.available_size();
                let texture_size = texture.size_vec2();

                // Scale to fit
                let scale = (available_size.x / texture_size.x)
                    .min(available_size.y / texture_size.y)
                    .min(1.0);
                let display_size = texture_size * scale;

                ui.centered_and_justified(|ui| {
                    ui.image((texture.id(), display_size));
                });
            } else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Waiting for camera...");
                });
            }
        });

        if self.camera.is_some() {
            ctx.request_repaint();
        }
    }
}
