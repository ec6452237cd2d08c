use std::f64::consts::PI;

use image::{Rgb, RgbImage};

use crate::{
    effects::raster::sample_bilinear,
    effects::traits::{invalid, EffectMetadata, EffectParams, EffectRng},
    effects::{Effect, EffectKind},
    error::Result,
    video::types::{Frame, FrameTiming},
};

use super::{DEFAULT_RIPPLE_AMPLITUDE, DEFAULT_RIPPLE_FREQUENCY, RIPPLE_AMPLITUDE, RIPPLE_FREQUENCY};

/// Fading radial ripple distortion
#[derive(Debug, Clone)]
pub struct RippleEffect {
    frequency: f64,
    amplitude: f64,
}

impl RippleEffect {
    pub fn new(frequency: f64, amplitude: f64) -> Result<Self> {
        if !frequency.is_finite() {
            return Err(invalid(
                EffectKind::Ripple,
                format!("{} must be finite, got {}", RIPPLE_FREQUENCY, frequency),
            ));
        }
        if !amplitude.is_finite() || amplitude < 0.0 {
            return Err(invalid(
                EffectKind::Ripple,
                format!("{} must be non-negative, got {}", RIPPLE_AMPLITUDE, amplitude),
            ));
        }
        Ok(Self { frequency, amplitude })
    }

    pub fn from_params(params: &EffectParams) -> Result<Self> {
        Self::new(
            params.float_or(EffectKind::Ripple, RIPPLE_FREQUENCY, DEFAULT_RIPPLE_FREQUENCY)?,
            params.float_or(EffectKind::Ripple, RIPPLE_AMPLITUDE, DEFAULT_RIPPLE_AMPLITUDE)?,
        )
    }

    /// Wave height in pixels for this frame
    pub fn current_amplitude(&self, timing: FrameTiming) -> f64 {
        self.amplitude * (1.0 - timing.progress())
    }
}

impl Effect for RippleEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Ripple
    }

    fn render_frame(&self, source: &Frame, timing: FrameTiming, _rng: &mut EffectRng) -> Result<Frame> {
        let amplitude = self.current_amplitude(timing);
        if amplitude == 0.0 {
            return Ok(source.clone());
        }

        let p = timing.progress();
        let (width, height) = source.dimensions();
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        let phase = 10.0 * p * PI;
        let (dir_x, dir_y) = ((p * PI).cos(), (p * PI).sin());
        let image = source.as_image();

        let output = RgbImage::from_fn(width, height, |x, y| {
            let (fx, fy) = (x as f64, y as f64);
            let radius = ((fx - cx).powi(2) + (fy - cy).powi(2)).sqrt();
            let wave = amplitude * (self.frequency * radius - phase).sin();
            Rgb(sample_bilinear(image, fx + wave * dir_x, fy + wave * dir_y))
        });

        Ok(Frame::new(output))
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            randomized: false,
            performance_impact: 0.7,
            parameters: vec![
                (
                    RIPPLE_FREQUENCY.to_string(),
                    format!("Radians per pixel of radius; higher is tighter (default {})", DEFAULT_RIPPLE_FREQUENCY),
                ),
                (
                    RIPPLE_AMPLITUDE.to_string(),
                    format!("Initial displacement in pixels (default {})", DEFAULT_RIPPLE_AMPLITUDE),
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::frame_rng;
    use crate::video::types::ClipPlan;

    fn stripes(w: u32, h: u32) -> Frame {
        Frame::new(RgbImage::from_fn(w, h, |x, _| {
            if x % 4 < 2 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        }))
    }

    #[test]
    fn test_amplitude_fades() {
        let effect = RippleEffect::new(0.4, 10.0).unwrap();
        let plan = ClipPlan::new(8, 8, 1.0, 10).unwrap();
        assert_eq!(effect.current_amplitude(plan.timing(0)), 10.0);
        assert!((effect.current_amplitude(plan.timing(5)) - 5.0).abs() < 1e-12);
        assert!(effect.current_amplitude(plan.timing(9)) > 0.0);
    }

    #[test]
    fn test_zero_amplitude_is_identity() {
        let effect = RippleEffect::new(0.4, 0.0).unwrap();
        let source = stripes(16, 9);
        let frame = effect
            .render_frame(&source, FrameTiming::new(2, 10), &mut frame_rng(0, 2))
            .unwrap();
        assert_eq!(frame, source);
    }

    #[test]
    fn test_distorts_patterned_image() {
        let effect = RippleEffect::new(0.4, 10.0).unwrap();
        let source = stripes(32, 32);
        let frame = effect
            .render_frame(&source, FrameTiming::new(0, 10), &mut frame_rng(0, 0))
            .unwrap();
        assert_eq!(frame.dimensions(), (32, 32));
        assert_ne!(frame, source);
    }

    #[test]
    fn test_uniform_image_unchanged() {
        let effect = RippleEffect::new(0.4, 25.0).unwrap();
        let source = Frame::new_filled(12, 12, [30, 60, 90]);
        let frame = effect
            .render_frame(&source, FrameTiming::new(1, 3), &mut frame_rng(0, 1))
            .unwrap();
        assert_eq!(frame, source);
    }

    #[test]
    fn test_rejects_negative_amplitude() {
        assert!(RippleEffect::new(0.4, -1.0).is_err());
        assert!(RippleEffect::from_params(&EffectParams::new().set(RIPPLE_FREQUENCY, "fast")).is_err());
    }
}
