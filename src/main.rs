//! YouTube video downloader: egui front end over yt-dlp

// Syntactic YouTube URL check
mod validate;
// Process runner for the external download tool (yt-dlp)
mod downloader;
// Single-flight job control
mod controller;
// UI-facing command entry points
mod commands;
// Startup configuration and download folder
mod config;
// Error types
mod error;
// File-manager reveal
mod folder;
// Quality selector and job lifecycle types
mod model;

use std::collections::VecDeque;

use config::DownloaderConfig;
use controller::DownloadController;
use downloader::TokioProcessRunner;
use error::AppError;
use model::{JobState, Quality};

// eframe/egui for GUI application framework
use eframe::{App, Frame, egui};
use egui::Visuals;
// OnceCell for single-time runtime initialization
use once_cell::sync::OnceCell;
use tokio::{
    runtime::{Handle, Runtime},
    sync::mpsc::{UnboundedReceiver, unbounded_channel},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// Global Tokio runtime stored in a OnceCell for lazy init
static RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Oldest status lines are dropped past this many
const MAX_STATUS_LINES: usize = 500;

/// Program entry point: initializes logging, config and runtime, then launches the GUI
fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DownloaderConfig::from_env();
    config.ensure_destination()?;
    info!(
        destination = %config.destination.display(),
        program = %config.program,
        "YouTube Video Downloader starting"
    );

    let runtime = Runtime::new().map_err(AppError::Runtime)?;
    let handle = RUNTIME.get_or_init(|| runtime).handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("YouTube Video Downloader")
            .with_inner_size([720.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "YouTube Video Downloader",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(DownloaderApp::new(cc.egui_ctx.clone(), config, handle))
        }),
    )?;
    Ok(())
}

/// Application state for the GUI
struct DownloaderApp {
    /// Input field for YouTube URL
    url_input: String,
    /// Selected quality option
    selected_quality: Quality,
    /// Status log shown under the buttons
    status_lines: VecDeque<String>,
    /// Lines pushed by the background download task
    status_rx: UnboundedReceiver<String>,
    controller: DownloadController,
}

impl DownloaderApp {
    fn new(ctx: egui::Context, config: DownloaderConfig, runtime: Handle) -> Self {
        let (tx, status_rx) = unbounded_channel();
        // Runs on the download task: hand the line to the UI thread and wake it up.
        let sink = move |message: String| {
            if tx.send(message).is_ok() {
                ctx.request_repaint();
            }
        };
        let controller = DownloadController::new(config, TokioProcessRunner, sink, runtime);

        let mut app = Self {
            url_input: String::new(),
            selected_quality: Quality::default(),
            status_lines: VecDeque::new(),
            status_rx,
            controller,
        };
        app.push_status("Ready to download...");
        app
    }

    fn push_status(&mut self, line: impl Into<String>) {
        if self.status_lines.len() == MAX_STATUS_LINES {
            self.status_lines.pop_front();
        }
        self.status_lines.push_back(line.into());
    }

    fn start_download(&mut self) {
        if self.url_input.trim().is_empty() {
            self.push_status("Please enter a YouTube URL");
            return;
        }
        self.push_status("Starting download...");

        let quality = self.selected_quality.to_string();
        let response = commands::start_download(&self.controller, &self.url_input, &quality);
        if response.is_error() {
            self.push_status(format!("Error: {}", response.message));
        } else {
            self.url_input.clear();
        }
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for DownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // Drain everything the download task sent since the last frame
        while let Ok(line) = self.status_rx.try_recv() {
            self.push_status(line);
        }
        let running = self.controller.state() == JobState::Running;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("YouTube Video Downloader");
            ui.add_space(8.0);

            ui.label("YouTube URL:");
            ui.add(
                egui::TextEdit::singleline(&mut self.url_input)
                    .hint_text("https://www.youtube.com/watch?v=...")
                    .desired_width(f32::INFINITY),
            );

            ui.label("Quality:");
            egui::ComboBox::from_id_source("quality")
                .selected_text(self.selected_quality.label())
                .show_ui(ui, |ui| {
                    for q in Quality::ALL {
                        ui.selectable_value(&mut self.selected_quality, q, q.label());
                    }
                });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.add_enabled(!running, egui::Button::new("Start download")).clicked() {
                    self.start_download();
                }
                if ui.button("Open download folder").clicked() {
                    let response = commands::open_output_folder(&self.controller);
                    debug!(?response, "open folder");
                }
            });

            ui.label(format!(
                "Saving to: {}",
                self.controller.config().destination.display()
            ));
            ui.separator();
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in &self.status_lines {
                        ui.label(egui::RichText::new(line).monospace());
                    }
                });
        });

        // The final Idle transition carries no message, so keep polling while a job runs
        if running {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
