use std::str::FromStr;

use image::RgbImage;

use crate::{
    effects::traits::{invalid, EffectMetadata, EffectParams, EffectRng},
    effects::{Effect, EffectKind},
    error::{ReelError, Result},
    video::types::{Frame, FrameTiming},
};

use super::{DEFAULT_DIRECTION, DIRECTION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

impl PanDirection {
    pub fn is_horizontal(self) -> bool {
        matches!(self, PanDirection::Left | PanDirection::Right)
    }
}

impl FromStr for PanDirection {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(PanDirection::Left),
            "right" => Ok(PanDirection::Right),
            "up" => Ok(PanDirection::Up),
            "down" => Ok(PanDirection::Down),
            other => Err(invalid(
                EffectKind::Pan,
                format!("{} must be left, right, up or down, got {:?}", DIRECTION, other),
            )),
        }
    }
}

/// Looping pan over a doubled canvas
#[derive(Debug, Clone)]
pub struct PanEffect {
    direction: PanDirection,
}

impl PanEffect {
    pub fn new(direction: PanDirection) -> Self {
        Self { direction }
    }

    pub fn from_params(params: &EffectParams) -> Result<Self> {
        let direction = params.text_or(EffectKind::Pan, DIRECTION, DEFAULT_DIRECTION)?;
        Ok(Self::new(direction.parse()?))
    }

    pub fn direction(&self) -> PanDirection {
        self.direction
    }

    /// Offset of the window into the doubled canvas, in `[0, extent]`.
    ///
    /// `extent` is the width for horizontal pans and the height for vertical ones.
    pub fn window_offset(&self, timing: FrameTiming, extent: u32) -> u32 {
        let p = timing.progress();
        let travel = match self.direction {
            PanDirection::Right | PanDirection::Down => p,
            PanDirection::Left | PanDirection::Up => 1.0 - p,
        };
        (extent as f64 * travel) as u32
    }
}

impl Effect for PanEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Pan
    }

    fn render_frame(&self, source: &Frame, timing: FrameTiming, _rng: &mut EffectRng) -> Result<Frame> {
        let image = source.as_image();
        let (width, height) = image.dimensions();
        let row_bytes = width as usize * 3;
        let src = image.as_raw();
        let mut out = vec![0u8; src.len()];

        if self.direction.is_horizontal() {
            // Window column x reads canvas column x + offset, i.e. source column (x + offset) mod width.
            let split = (self.window_offset(timing, width) % width) as usize * 3;
            for (dst_row, src_row) in out.chunks_exact_mut(row_bytes).zip(src.chunks_exact(row_bytes)) {
                let head = row_bytes - split;
                dst_row[..head].copy_from_slice(&src_row[split..]);
                dst_row[head..].copy_from_slice(&src_row[..split]);
            }
        } else {
            let offset = self.window_offset(timing, height) % height;
            for (y, dst_row) in out.chunks_exact_mut(row_bytes).enumerate() {
                let sy = (y + offset as usize) % height as usize;
                dst_row.copy_from_slice(&src[sy * row_bytes..(sy + 1) * row_bytes]);
            }
        }

        let buffer = RgbImage::from_raw(width, height, out)
            .ok_or_else(|| ReelError::generic("pan produced a short buffer"))?;
        Ok(Frame::new(buffer))
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            randomized: false,
            performance_impact: 0.1,
            parameters: vec![(
                DIRECTION.to_string(),
                format!("left, right, up or down (default {})", DEFAULT_DIRECTION),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::frame_rng;
    use crate::video::types::ClipPlan;
    use image::Rgb;

    fn columns(w: u32, h: u32) -> Frame {
        Frame::new(RgbImage::from_fn(w, h, |x, y| Rgb([x as u8, y as u8, 99])))
    }

    fn render(effect: &PanEffect, source: &Frame, timing: FrameTiming) -> Frame {
        effect.render_frame(source, timing, &mut frame_rng(0, timing.index)).unwrap()
    }

    #[test]
    fn test_right_pan_midpoint_offset() {
        let effect = PanEffect::new(PanDirection::Right);
        let plan = ClipPlan::new(100, 4, 1.0, 10).unwrap();
        assert_eq!(plan.total_frames, 10);

        let timing = plan.timing(5);
        assert_eq!(effect.window_offset(timing, 100), 50);

        let frame = render(&effect, &columns(100, 4), timing);
        assert_eq!(frame.get_pixel(0, 2), [50, 2, 99]);
        assert_eq!(frame.get_pixel(49, 0), [99, 0, 99]);
        // Past the seam the window continues into the second copy.
        assert_eq!(frame.get_pixel(50, 0), [0, 0, 99]);
    }

    #[test]
    fn test_left_pan_runs_backwards() {
        let effect = PanEffect::new(PanDirection::Left);
        let plan = ClipPlan::new(100, 4, 1.0, 10).unwrap();

        assert_eq!(effect.window_offset(plan.timing(0), 100), 100);
        assert_eq!(effect.window_offset(plan.timing(2), 100), 80);

        // Offset 100 sits on the second tile, which shows the untouched image.
        let source = columns(100, 4);
        assert_eq!(render(&effect, &source, plan.timing(0)), source);
    }

    #[test]
    fn test_vertical_pan_wraps_rows() {
        let effect = PanEffect::new(PanDirection::Down);
        let source = columns(3, 8);
        let frame = render(&effect, &source, FrameTiming::new(1, 4));

        assert_eq!(frame.dimensions(), (3, 8));
        assert_eq!(frame.get_pixel(1, 0), [1, 2, 99]);
        assert_eq!(frame.get_pixel(1, 6), [1, 0, 99]);
    }

    #[test]
    fn test_up_pan_starts_on_source_and_climbs() {
        let effect = PanEffect::new(PanDirection::Up);
        let source = columns(3, 8);

        assert_eq!(effect.window_offset(FrameTiming::new(0, 4), 8), 8);
        assert_eq!(render(&effect, &source, FrameTiming::new(0, 4)), source);

        // 1/4 of the way in, the window starts 6 rows down the canvas.
        let timing = FrameTiming::new(1, 4);
        assert_eq!(effect.window_offset(timing, 8), 6);
        let frame = render(&effect, &source, timing);
        assert_eq!(frame.get_pixel(1, 0), [1, 6, 99]);
        assert_eq!(frame.get_pixel(1, 2), [1, 0, 99]);
    }

    #[test]
    fn test_direction_from_params() {
        let params = EffectParams::new().set(DIRECTION, "Up");
        assert_eq!(PanEffect::from_params(&params).unwrap().direction(), PanDirection::Up);
        assert_eq!(
            PanEffect::from_params(&EffectParams::new()).unwrap().direction(),
            PanDirection::Right
        );
        assert!(PanEffect::from_params(&EffectParams::new().set(DIRECTION, "sideways")).is_err());
    }
}
