use std::f64::consts::PI;

use crate::{
    effects::traits::{invalid, EffectMetadata, EffectParams, EffectRng},
    effects::{Effect, EffectKind},
    error::Result,
    video::types::{Frame, FrameTiming},
};

use super::{COLOR_SHIFT_SPEED, DEFAULT_COLOR_SHIFT_SPEED, SHIFT_AMPLITUDE};

/// Offsets for R, G and B at progress `p`
pub fn channel_shifts(speed: f64, p: f64) -> [f32; 3] {
    let phase = p * speed * 2.0 * PI;
    let mut shifts = [0.0f32; 3];
    for (k, shift) in shifts.iter_mut().enumerate() {
        let offset = k as f64 * 2.0 * PI / 3.0;
        *shift = (phase + offset).sin() as f32 * SHIFT_AMPLITUDE;
    }
    shifts
}

/// Lookup table mapping a channel value to its shifted value
fn shift_table(shift: f32) -> [u8; 256] {
    let mut table = [0u8; 256];
    for (value, out) in table.iter_mut().enumerate() {
        *out = (value as f32 + shift).clamp(0.0, 255.0) as u8;
    }
    table
}

#[derive(Debug, Clone)]
pub struct ColorShiftEffect {
    speed: f64,
}

impl ColorShiftEffect {
    pub fn new(speed: f64) -> Result<Self> {
        if !speed.is_finite() {
            return Err(invalid(
                EffectKind::ColorShift,
                format!("{} must be finite, got {}", COLOR_SHIFT_SPEED, speed),
            ));
        }
        Ok(Self { speed })
    }

    pub fn from_params(params: &EffectParams) -> Result<Self> {
        Self::new(params.float_or(EffectKind::ColorShift, COLOR_SHIFT_SPEED, DEFAULT_COLOR_SHIFT_SPEED)?)
    }

    pub fn shifts_at(&self, timing: FrameTiming) -> [f32; 3] {
        channel_shifts(self.speed, timing.progress())
    }
}

impl Effect for ColorShiftEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::ColorShift
    }

    fn render_frame(&self, source: &Frame, timing: FrameTiming, _rng: &mut EffectRng) -> Result<Frame> {
        let tables = self.shifts_at(timing).map(shift_table);

        let mut frame = source.clone();
        for pixel in frame.as_image_mut().pixels_mut() {
            for (channel, table) in pixel.0.iter_mut().zip(tables.iter()) {
                *channel = table[*channel as usize];
            }
        }
        Ok(frame)
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            randomized: false,
            performance_impact: 0.2,
            parameters: vec![(
                COLOR_SHIFT_SPEED.to_string(),
                format!("Full colour cycles over the clip (default {})", DEFAULT_COLOR_SHIFT_SPEED),
            )],
        }
    }
}
