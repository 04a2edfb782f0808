// ============================================================================
// ARTIFICIAL HORIZON
// ============================================================================

pub mod canvas;
pub mod config;
pub mod frame;
pub mod horizon;
pub mod overlay;
pub mod render;
pub mod scene;
pub mod tape;
pub mod telemetry;
pub mod turn_bank;

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bon::Builder;
use log::{debug, error, info, warn};
use pixels::{Pixels, SurfaceTexture};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

pub use canvas::{Canvas, TextRenderer};
pub use config::{Color, FontConfig, Palette};
pub use frame::{FrameContext, Viewport};
pub use render::render_frame;
pub use scene::{DrawCommand, Scene, Surface};
pub use telemetry::{
    BatteryStatus, CommandedAttitude, CommandedControl, SnapshotCache, Telemetry, TelemetryError,
    TelemetryHub, TelemetrySnapshot, TelemetryUpdate, VehicleState,
};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum HorizonError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("pixel buffer failed: {0}")]
    Pixels(#[from] pixels::Error),
    #[error("cannot read font {}: {source}", .path.display())]
    FontRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is not a usable TrueType/OpenType font", .0.display())]
    FontParse(PathBuf),
}

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

#[derive(Debug, Clone, Builder)]
pub struct HorizonConfig {
    #[builder(default = "Artificial Horizon".to_string())]
    pub title: String,

    // Window configuration
    #[builder(default = 600)]
    pub window_width: u32,
    #[builder(default = 600)]
    pub window_height: u32,
    #[builder(default = 30.0)]
    pub max_framerate: f64,
    #[builder(default = true)]
    pub resizable: bool,

    #[builder(default)]
    pub font: FontConfig,
    #[builder(default)]
    pub palette: Palette,
}

/// Instrument window; redraws from a telemetry source at the configured rate.
#[derive(Debug, Clone)]
pub struct Horizon {
    config: HorizonConfig,
}

impl Horizon {
    pub fn new(config: HorizonConfig) -> Self {
        Self { config }
    }

    /// Runs the window against `telemetry` until it is closed.
    pub fn show<T: Telemetry>(&self, telemetry: T) -> Result<(), HorizonError> {
        self.run_window(telemetry, |_| {})
    }

    /// Runs the window against a [`TelemetryHub`] fed through `receiver`.
    pub fn show_with_updates(&self, receiver: Receiver<TelemetryUpdate>) -> Result<(), HorizonError> {
        self.run_window(TelemetryHub::new(receiver), TelemetryHub::poll)
    }

    /// Draws one frame of `snapshot` into an RGBA8 buffer of `viewport` size.
    pub fn paint(
        &self,
        buffer: &mut [u8],
        viewport: Viewport,
        snapshot: &TelemetrySnapshot,
        text: &TextRenderer,
    ) {
        let frame = FrameContext::new(viewport, snapshot);
        let mut scene = Scene::new(self.config.font.size);
        render_frame(&mut scene, &frame, &self.config.palette);

        let mut canvas = Canvas::new(buffer, viewport.width as usize, viewport.height as usize);
        canvas.render(&scene, text);
    }

    fn run_window<T: Telemetry>(
        &self,
        mut telemetry: T,
        mut poll: impl FnMut(&mut T),
    ) -> Result<(), HorizonError> {
        let text = TextRenderer::from_config(&self.config.font)?;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(
                self.config.window_width as f64,
                self.config.window_height as f64,
            ))
            .with_resizable(self.config.resizable)
            .build(&event_loop)?;

        let window = Arc::new(window);

        let window_clone = window.clone();
        let size = window.inner_size();
        let mut viewport = Viewport::new(size.width, size.height);
        info!("window opened at {}x{}", size.width, size.height);
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let mut cache = SnapshotCache::new();
        let mut waiting_logged = false;

        let frame_duration = Duration::from_secs_f64(1.0 / self.config.max_framerate.max(1.0));
        let mut last_frame = Instant::now();

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if new_size.width == 0 || new_size.height == 0 {
                            debug!("ignoring resize to empty surface");
                            return;
                        }
                        viewport = Viewport::new(new_size.width, new_size.height);
                        if let Err(err) = pixels.resize_buffer(new_size.width, new_size.height) {
                            error!("resizing pixel buffer: {err}");
                            window_target.exit();
                            return;
                        }
                        if let Err(err) = pixels.resize_surface(new_size.width, new_size.height) {
                            error!("resizing surface: {err}");
                            window_target.exit();
                            return;
                        }
                        debug!("resized to {}x{}", new_size.width, new_size.height);
                    }
                    WindowEvent::RedrawRequested => {
                        poll(&mut telemetry);

                        let Some(snapshot) = cache.refresh(&telemetry) else {
                            if !waiting_logged {
                                warn!("no complete telemetry yet, skipping frames");
                                waiting_logged = true;
                            }
                            return;
                        };
                        waiting_logged = false;

                        self.paint(pixels.frame_mut(), viewport, &snapshot, &text);
                        if let Err(err) = pixels.render() {
                            error!("presenting frame: {err}");
                            window_target.exit();
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}
