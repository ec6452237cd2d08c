// Renders every effect as a numbered PNG sequence, without FFmpeg.
//
// Usage: effect_gallery [OUT_DIR] [IMAGE]

use std::path::PathBuf;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use storyreel::{
    config::Config,
    effects::{EffectDispatcher, EffectKind},
    video::{ClipPlan, Frame, ImageLoader, PngSequenceSink},
};

const DURATION: f64 = 2.0;
const FPS: u32 = 12;
const SEED: u64 = 7;

/// Gradient with a grid so motion is easy to see
fn test_pattern(width: u32, height: u32) -> Frame {
    Frame::new(RgbImage::from_fn(width, height, |x, y| {
        if x % 40 == 0 || y % 40 == 0 {
            Rgb([255, 255, 255])
        } else {
            Rgb([
                (x * 255 / width) as u8,
                (y * 255 / height) as u8,
                160,
            ])
        }
    }))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "gallery".to_string()));
    let source = match args.next() {
        Some(image) => ImageLoader::load(&image)?,
        None => test_pattern(320, 200),
    };

    println!("🎬 storyreel effect gallery");
    println!("   Source: {}x{}", source.width(), source.height());

    let dispatcher = EffectDispatcher::new(&Config::default())?;

    let plan = ClipPlan::new(source.width(), source.height(), DURATION, FPS)?;

    for kind in EffectKind::ALL {
        let dir = out_dir.join(kind.name());
        let mut sink = PngSequenceSink::new(&dir, plan)
            .with_context(|| format!("creating {}", dir.display()))?;

        let stats = dispatcher.render_to_sink(kind, &source, &plan, SEED, &mut sink)?;
        println!(
            "   ✅ {:<14} {} frames ({:.1} fps) -> {}",
            kind.name(),
            sink.frame_paths().len(),
            stats.frames_per_second(),
            dir.display()
        );
    }

    Ok(())
}
