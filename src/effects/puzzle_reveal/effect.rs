use image::imageops;
use rand::Rng;

use crate::{
    effects::raster::paste,
    effects::traits::{invalid, EffectMetadata, EffectParams, EffectRng},
    effects::{Effect, EffectKind},
    error::Result,
    video::types::{Frame, FrameTiming},
};

use super::{DEFAULT_PUZZLE_SIZE, PUZZLE_SIZE, REVEAL_AT, SCATTER};

/// Grid of tiles settling into place
#[derive(Debug, Clone)]
pub struct PuzzleRevealEffect {
    puzzle_size: u32,
}

impl PuzzleRevealEffect {
    pub fn new(puzzle_size: u32) -> Result<Self> {
        if puzzle_size == 0 {
            return Err(invalid(
                EffectKind::PuzzleReveal,
                format!("{} must be at least 1", PUZZLE_SIZE),
            ));
        }
        Ok(Self { puzzle_size })
    }

    pub fn from_params(params: &EffectParams) -> Result<Self> {
        Self::new(params.uint_or(EffectKind::PuzzleReveal, PUZZLE_SIZE, DEFAULT_PUZZLE_SIZE)?)
    }

    /// Origin and size of tile `index` along an axis of length `span`
    fn tile_span(&self, index: u32, span: u32) -> (u32, u32) {
        let size = span / self.puzzle_size;
        let start = index * size;
        let len = if index + 1 == self.puzzle_size { span - start } else { size };
        (start, len)
    }

    /// Largest jitter, in pixels, along an axis of length `extent`
    fn scatter(p: f64, extent: u32) -> f64 {
        extent as f64 * SCATTER * (1.0 - p / REVEAL_AT)
    }
}

impl Effect for PuzzleRevealEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::PuzzleReveal
    }

    fn render_frame(&self, source: &Frame, timing: FrameTiming, rng: &mut EffectRng) -> Result<Frame> {
        let p = timing.progress();
        if p >= REVEAL_AT {
            return Ok(source.clone());
        }

        let (width, height) = source.dimensions();
        let (scatter_x, scatter_y) = (Self::scatter(p, width), Self::scatter(p, height));
        let image = source.as_image();
        let mut canvas = Frame::new_black(width, height);

        for row in 0..self.puzzle_size {
            let (top, tile_h) = self.tile_span(row, height);
            for col in 0..self.puzzle_size {
                let (left, tile_w) = self.tile_span(col, width);

                // Draw for every tile so the stream does not depend on tile sizes.
                let dx = (scatter_x * (rng.gen::<f64>() - 0.5)) as i64;
                let dy = (scatter_y * (rng.gen::<f64>() - 0.5)) as i64;

                if tile_w == 0 || tile_h == 0 {
                    continue;
                }
                let tile = imageops::crop_imm(image, left, top, tile_w, tile_h).to_image();
                paste(canvas.as_image_mut(), &tile, left as i64 + dx, top as i64 + dy);
            }
        }

        Ok(canvas)
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            randomized: true,
            performance_impact: 0.4,
            parameters: vec![(
                PUZZLE_SIZE.to_string(),
                format!("Tiles per side, >= 1 (default {})", DEFAULT_PUZZLE_SIZE),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::frame_rng;
    use crate::video::types::ClipPlan;
    use image::{Rgb, RgbImage};

    fn gradient(w: u32, h: u32) -> Frame {
        Frame::new(RgbImage::from_fn(w, h, |x, y| Rgb([(x * 3) as u8, (y * 3) as u8, 128])))
    }

    #[test]
    fn test_settled_frames_are_exact_for_any_seed() {
        let effect = PuzzleRevealEffect::new(4).unwrap();
        let source = gradient(50, 30);
        let plan = ClipPlan::new(50, 30, 1.0, 10).unwrap();

        for seed in [0u64, 1, 99, u64::MAX] {
            for index in 8..10 {
                let frame = effect
                    .render_frame(&source, plan.timing(index), &mut frame_rng(seed, index))
                    .unwrap();
                assert_eq!(frame, source, "seed {} frame {}", seed, index);
            }
        }
    }

    #[test]
    fn test_early_frames_scatter_tiles() {
        let effect = PuzzleRevealEffect::new(4).unwrap();
        let source = gradient(80, 80);
        let frame = effect
            .render_frame(&source, FrameTiming::new(0, 10), &mut frame_rng(5, 0))
            .unwrap();
        assert_eq!(frame.dimensions(), (80, 80));
        assert_ne!(frame, source);
    }

    #[test]
    fn test_same_seed_same_frame() {
        let effect = PuzzleRevealEffect::new(3).unwrap();
        let source = gradient(60, 45);
        let timing = FrameTiming::new(2, 10);

        let a = effect.render_frame(&source, timing, &mut frame_rng(11, 2)).unwrap();
        let b = effect.render_frame(&source, timing, &mut frame_rng(11, 2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_more_tiles_than_pixels() {
        let effect = PuzzleRevealEffect::new(16).unwrap();
        let source = gradient(5, 3);
        let frame = effect
            .render_frame(&source, FrameTiming::new(1, 10), &mut frame_rng(0, 1))
            .unwrap();
        assert_eq!(frame.dimensions(), (5, 3));
    }

    #[test]
    fn test_tile_spans_cover_axis() {
        let effect = PuzzleRevealEffect::new(3).unwrap();
        assert_eq!(effect.tile_span(0, 10), (0, 3));
        assert_eq!(effect.tile_span(1, 10), (3, 3));
        assert_eq!(effect.tile_span(2, 10), (6, 4));
        assert!(PuzzleRevealEffect::new(0).is_err());
    }
}
