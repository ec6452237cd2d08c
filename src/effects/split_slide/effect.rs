use std::ops::Range;
use std::str::FromStr;

use image::{Rgb, RgbImage};

use crate::{
    effects::traits::{invalid, EffectMetadata, EffectParams, EffectRng},
    effects::{Effect, EffectKind},
    error::{ReelError, Result},
    video::types::{Frame, FrameTiming},
};

use super::{DEFAULT_NUM_SPLITS, DEFAULT_SPLIT_DIRECTION, NUM_SPLITS, SPLIT_DIRECTION};

/// Orientation of the cut lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    /// Vertical strips sliding up and down
    Vertical,
    /// Horizontal strips sliding left and right
    Horizontal,
}

impl FromStr for SplitDirection {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "vertical" => Ok(SplitDirection::Vertical),
            "horizontal" => Ok(SplitDirection::Horizontal),
            other => Err(invalid(
                EffectKind::SplitSlide,
                format!("{} must be vertical or horizontal, got {:?}", SPLIT_DIRECTION, other),
            )),
        }
    }
}

/// Alternating strips sliding in opposite directions
#[derive(Debug, Clone)]
pub struct SplitSlideEffect {
    direction: SplitDirection,
    num_splits: u32,
}

impl SplitSlideEffect {
    pub fn new(direction: SplitDirection, num_splits: u32) -> Result<Self> {
        if num_splits == 0 {
            return Err(invalid(
                EffectKind::SplitSlide,
                format!("{} must be at least 1", NUM_SPLITS),
            ));
        }
        Ok(Self { direction, num_splits })
    }

    pub fn from_params(params: &EffectParams) -> Result<Self> {
        let direction = params.text_or(EffectKind::SplitSlide, SPLIT_DIRECTION, DEFAULT_SPLIT_DIRECTION)?;
        let num_splits = params.uint_or(EffectKind::SplitSlide, NUM_SPLITS, DEFAULT_NUM_SPLITS)?;
        Self::new(direction.parse()?, num_splits)
    }

    /// Pixel range of strip `index` across an axis of length `span`.
    ///
    /// Strips are `span / num_splits` wide; the last one absorbs the remainder.
    pub fn strip_range(&self, index: u32, span: u32) -> Range<u32> {
        let size = span / self.num_splits;
        let start = index * size;
        let end = if index + 1 == self.num_splits { span } else { start + size };
        start..end
    }

    /// Signed slide of strip `index` along an axis of length `extent`.
    ///
    /// Magnitude is `|2p - 1| * extent / 2`: half the frame at the start,
    /// zero at `p = 0.5`. Odd strips move towards positive coordinates, even
    /// strips towards negative ones.
    pub fn strip_offset(&self, index: u32, p: f64, extent: u32) -> i64 {
        let sign = if index % 2 == 1 { 1.0 } else { -1.0 };
        ((2.0 * p - 1.0).abs() * extent as f64 * 0.5 * sign) as i64
    }
}

fn sample_or_black(image: &RgbImage, x: i64, y: i64) -> Rgb<u8> {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        Rgb([0, 0, 0])
    } else {
        *image.get_pixel(x as u32, y as u32)
    }
}

impl Effect for SplitSlideEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::SplitSlide
    }

    fn render_frame(&self, source: &Frame, timing: FrameTiming, _rng: &mut EffectRng) -> Result<Frame> {
        let (width, height) = source.dimensions();
        let p = timing.progress();
        let image = source.as_image();
        let mut output = RgbImage::new(width, height);

        match self.direction {
            SplitDirection::Vertical => {
                for strip in 0..self.num_splits {
                    let offset = self.strip_offset(strip, p, height);
                    for x in self.strip_range(strip, width) {
                        for y in 0..height {
                            output.put_pixel(x, y, sample_or_black(image, x as i64, y as i64 + offset));
                        }
                    }
                }
            }
            SplitDirection::Horizontal => {
                for strip in 0..self.num_splits {
                    let offset = self.strip_offset(strip, p, width);
                    for y in self.strip_range(strip, height) {
                        for x in 0..width {
                            output.put_pixel(x, y, sample_or_black(image, x as i64 + offset, y as i64));
                        }
                    }
                }
            }
        }

        Ok(Frame::new(output))
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            randomized: false,
            performance_impact: 0.3,
            parameters: vec![
                (
                    SPLIT_DIRECTION.to_string(),
                    format!("vertical or horizontal strips (default {})", DEFAULT_SPLIT_DIRECTION),
                ),
                (
                    NUM_SPLITS.to_string(),
                    format!("Number of strips, >= 1 (default {})", DEFAULT_NUM_SPLITS),
                ),
            ],
        }
    }
}
