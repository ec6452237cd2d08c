use std::f64::consts::PI;

use image::RgbImage;

use crate::{
    effects::raster::{paste, resize_lanczos, rotate_expand, scaled_size},
    effects::traits::{invalid, EffectMetadata, EffectParams, EffectRng},
    effects::{Effect, EffectKind},
    error::Result,
    video::types::{Frame, FrameTiming},
};

use super::{DEFAULT_MAX_SCALE, DEFAULT_ROTATION_DEGREES, MAX_SCALE, ROTATION_DEGREES};

/// Oscillating rotation combined with a scale pulse
#[derive(Debug, Clone)]
pub struct RotateEffect {
    rotation_degrees: f64,
    max_scale: f64,
}

impl RotateEffect {
    pub fn new(rotation_degrees: f64, max_scale: f64) -> Result<Self> {
        if !rotation_degrees.is_finite() {
            return Err(invalid(
                EffectKind::Rotate,
                format!("{} must be finite, got {}", ROTATION_DEGREES, rotation_degrees),
            ));
        }
        if !max_scale.is_finite() || max_scale <= 0.0 {
            return Err(invalid(
                EffectKind::Rotate,
                format!("{} must be positive, got {}", MAX_SCALE, max_scale),
            ));
        }
        Ok(Self {
            rotation_degrees,
            max_scale,
        })
    }

    pub fn from_params(params: &EffectParams) -> Result<Self> {
        Self::new(
            params.float_or(EffectKind::Rotate, ROTATION_DEGREES, DEFAULT_ROTATION_DEGREES)?,
            params.float_or(EffectKind::Rotate, MAX_SCALE, DEFAULT_MAX_SCALE)?,
        )
    }

    /// `rotation_degrees * sin(2πp)`: one full swing left and right per clip
    pub fn angle_at(&self, timing: FrameTiming) -> f64 {
        self.rotation_degrees * (2.0 * PI * timing.progress()).sin()
    }

    /// `1 + (max_scale - 1) * |sin(πp)|`: peaks halfway through
    pub fn scale_at(&self, timing: FrameTiming) -> f64 {
        1.0 + (self.max_scale - 1.0) * (PI * timing.progress()).sin().abs()
    }
}

impl Effect for RotateEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Rotate
    }

    fn render_frame(&self, source: &Frame, timing: FrameTiming, _rng: &mut EffectRng) -> Result<Frame> {
        let (width, height) = source.dimensions();

        let rotated = rotate_expand(source.as_image(), self.angle_at(timing));
        let (scaled_w, scaled_h) = scaled_size(rotated.width(), rotated.height(), self.scale_at(timing));
        let scaled = resize_lanczos(&rotated, scaled_w, scaled_h);

        let mut canvas = RgbImage::new(width, height);
        let x = (width as i64 - scaled_w as i64).div_euclid(2);
        let y = (height as i64 - scaled_h as i64).div_euclid(2);
        paste(&mut canvas, &scaled, x, y);

        Ok(Frame::new(canvas))
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            randomized: false,
            performance_impact: 0.8,
            parameters: vec![
                (
                    ROTATION_DEGREES.to_string(),
                    format!("Peak rotation in each direction (default {})", DEFAULT_ROTATION_DEGREES),
                ),
                (
                    MAX_SCALE.to_string(),
                    format!("Scale reached halfway through (default {})", DEFAULT_MAX_SCALE),
                ),
            ],
        }
    }
}
