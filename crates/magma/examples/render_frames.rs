//! Render a scripted stroke to PNG files.
//!
//! Draws a loop around the centre of the field, releases the pointer and
//! lets the heat cool, writing every tenth frame to `<out_dir>/` along
//! with the settings used.
//!
//! ```text
//! cargo run --example render_frames -- [out_dir] [settings.json]
//! ```
//!
//! Set `RUST_LOG=debug` for per-component logging.

use std::error::Error;
use std::f32::consts::TAU;
use std::fs;
use std::path::PathBuf;

use magma::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DRAW_FRAMES: u32 = 90;
const COOL_FRAMES: u32 = 60;
const SAVE_EVERY: u64 = 10;

/// Writes every `SAVE_EVERY`-th frame as `frame_NNNN.png`.
struct PngPresenter {
    dir: PathBuf,
}

impl Presenter for PngPresenter {
    fn present(&mut self, img: &FrameImage, frame: FrameId) -> Result<(), ResourceError> {
        if frame.0 % SAVE_EVERY != 0 {
            return Ok(());
        }
        let path = self.dir.join(format!("frame_{:04}.png", frame.0));
        let Some(buf) =
            image::RgbaImage::from_raw(img.width(), img.height(), img.to_rgba8_bytes())
        else {
            warn!(frame = frame.0, "image size mismatch, frame skipped");
            return Ok(());
        };
        // A failed write is not a context loss; keep rendering.
        if let Err(e) = buf.save(&path) {
            warn!(path = %path.display(), error = %e, "png write failed");
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let dir = PathBuf::from(args.next().unwrap_or_else(|| "frames".into()));
    let config = match args.next() {
        Some(path) => MagmaConfig::from_json_str(&fs::read_to_string(path)?)?,
        None => MagmaConfig::default(),
    };
    fs::create_dir_all(&dir)?;
    // Record the effective settings next to the frames.
    fs::write(dir.join("settings.json"), config.to_json_pretty()?)?;

    let presenter = PngPresenter { dir: dir.clone() };
    let mut scheduler = FrameScheduler::new(
        config,
        Box::new(SerialBackend),
        Box::new(Passthrough),
        Box::new(presenter),
    )?;
    let input = scheduler.input();

    input.send(InputEvent::TouchStart { x: 0.7, y: 0.5 })?;
    for i in 0..DRAW_FRAMES {
        let angle = i as f32 / DRAW_FRAMES as f32 * TAU;
        input.send(InputEvent::TouchMove {
            x: 0.5 + 0.2 * angle.cos(),
            y: 0.5 + 0.2 * angle.sin(),
        })?;
        scheduler.run_frame()?;
    }
    input.send(InputEvent::TouchEnd)?;

    for _ in 0..COOL_FRAMES {
        let report = scheduler.run_frame()?;
        if report.frame.0 % SAVE_EVERY == 0 {
            info!(
                frame = report.frame.0,
                max_heat = report.metrics.max_heat,
                coverage = report.metrics.coverage,
                "cooling"
            );
        }
    }

    info!(
        frames = scheduler.frame_id().0,
        dir = %dir.display(),
        "done"
    );
    Ok(())
}
