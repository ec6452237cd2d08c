use image::RgbImage;

use crate::{
    effects::raster::{crop_or_black, resize_lanczos, scaled_size},
    effects::traits::{invalid, EffectMetadata, EffectParams, EffectRng},
    effects::{Effect, EffectKind},
    error::Result,
    video::types::{Frame, FrameTiming},
};

use super::{DEFAULT_MAX_ZOOM, MAX_ZOOM};

/// Zoom factor at progress `p`: `max_zoom` at the start, easing towards 1
pub fn zoom_factor(max_zoom: f64, p: f64) -> f64 {
    max_zoom - (max_zoom - 1.0) * p
}

/// Resample `source` by `zoom` and cut the centre back out at the source size.
///
/// (`shift_x`, `shift_y`) move the crop window away from the centre.
pub fn zoomed_frame(source: &RgbImage, zoom: f64, shift_x: i64, shift_y: i64) -> RgbImage {
    let (width, height) = source.dimensions();
    let (zoomed_w, zoomed_h) = scaled_size(width, height, zoom);
    let zoomed = resize_lanczos(source, zoomed_w, zoomed_h);

    let left = (zoomed_w as i64 - width as i64).div_euclid(2) + shift_x;
    let top = (zoomed_h as i64 - height as i64).div_euclid(2) + shift_y;
    crop_or_black(&zoomed, left, top, width, height)
}

/// Linear zoom-out from `max_zoom` towards the original framing
#[derive(Debug, Clone)]
pub struct ZoomEffect {
    max_zoom: f64,
}

impl ZoomEffect {
    pub fn new(max_zoom: f64) -> Result<Self> {
        if !max_zoom.is_finite() || max_zoom < 1.0 {
            return Err(invalid(
                EffectKind::Zoom,
                format!("{} must be at least 1.0, got {}", MAX_ZOOM, max_zoom),
            ));
        }
        Ok(Self { max_zoom })
    }

    pub fn from_params(params: &EffectParams) -> Result<Self> {
        Self::new(params.float_or(EffectKind::Zoom, MAX_ZOOM, DEFAULT_MAX_ZOOM)?)
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    /// Crop factor used for the frame at `timing`
    pub fn factor_at(&self, timing: FrameTiming) -> f64 {
        zoom_factor(self.max_zoom, timing.progress())
    }
}

impl Effect for ZoomEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Zoom
    }

    fn render_frame(&self, source: &Frame, timing: FrameTiming, _rng: &mut EffectRng) -> Result<Frame> {
        let zoom = self.factor_at(timing);
        Ok(Frame::new(zoomed_frame(source.as_image(), zoom, 0, 0)))
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            randomized: false,
            performance_impact: 0.6,
            parameters: vec![(
                MAX_ZOOM.to_string(),
                format!("Magnification of the first frame, >= 1.0 (default {})", DEFAULT_MAX_ZOOM),
            )],
        }
    }
}
