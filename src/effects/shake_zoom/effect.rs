use rand::Rng;

use crate::{
    effects::traits::{invalid, EffectMetadata, EffectParams, EffectRng},
    effects::zoom::{zoom_factor, zoomed_frame},
    effects::{Effect, EffectKind},
    error::Result,
    video::types::{Frame, FrameTiming},
};

use super::{DEFAULT_MAX_ZOOM, DEFAULT_SHAKE_INTENSITY, MAX_ZOOM, SHAKE_INTENSITY};

/// Zoom-out with random per-frame jitter of the crop window
#[derive(Debug, Clone)]
pub struct ShakeZoomEffect {
    max_zoom: f64,
    shake_intensity: f64,
}

impl ShakeZoomEffect {
    pub fn new(max_zoom: f64, shake_intensity: f64) -> Result<Self> {
        if !max_zoom.is_finite() || max_zoom < 1.0 {
            return Err(invalid(
                EffectKind::ShakeZoom,
                format!("{} must be at least 1.0, got {}", MAX_ZOOM, max_zoom),
            ));
        }
        if !shake_intensity.is_finite() || shake_intensity < 0.0 {
            return Err(invalid(
                EffectKind::ShakeZoom,
                format!("{} must be non-negative, got {}", SHAKE_INTENSITY, shake_intensity),
            ));
        }
        Ok(Self {
            max_zoom,
            shake_intensity,
        })
    }

    pub fn from_params(params: &EffectParams) -> Result<Self> {
        Self::new(
            params.float_or(EffectKind::ShakeZoom, MAX_ZOOM, DEFAULT_MAX_ZOOM)?,
            params.float_or(EffectKind::ShakeZoom, SHAKE_INTENSITY, DEFAULT_SHAKE_INTENSITY)?,
        )
    }

    /// Draw the (x, y) jolt for one frame.
    ///
    /// Each axis is `trunc(extent * intensity * (r - 0.5))` for a uniform `r`
    /// in `[0, 1)`, so the magnitude stays below half the intensity share of
    /// the frame. x is drawn before y.
    pub fn draw_offset(&self, width: u32, height: u32, rng: &mut EffectRng) -> (i64, i64) {
        let rx: f64 = rng.gen();
        let ry: f64 = rng.gen();
        let dx = (width as f64 * self.shake_intensity * (rx - 0.5)) as i64;
        let dy = (height as f64 * self.shake_intensity * (ry - 0.5)) as i64;
        (dx, dy)
    }
}

impl Effect for ShakeZoomEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::ShakeZoom
    }

    fn render_frame(&self, source: &Frame, timing: FrameTiming, rng: &mut EffectRng) -> Result<Frame> {
        let (width, height) = source.dimensions();
        let zoom = zoom_factor(self.max_zoom, timing.progress());
        let (dx, dy) = self.draw_offset(width, height, rng);
        Ok(Frame::new(zoomed_frame(source.as_image(), zoom, dx, dy)))
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            randomized: true,
            performance_impact: 0.6,
            parameters: vec![
                (
                    MAX_ZOOM.to_string(),
                    format!("Magnification of the first frame, >= 1.0 (default {})", DEFAULT_MAX_ZOOM),
                ),
                (
                    SHAKE_INTENSITY.to_string(),
                    format!("Jitter as a fraction of the frame size (default {})", DEFAULT_SHAKE_INTENSITY),
                ),
            ],
        }
    }
}
