//! # Color Shift Effect
//!
//! Adds a sine offset of up to ±50 to each channel, with the three waves a
//! third of a cycle apart so the tint rotates through the palette.

mod effect;

pub use effect::{channel_shifts, ColorShiftEffect};

pub const COLOR_SHIFT_SPEED: &str = "color_shift_speed";

pub const DEFAULT_COLOR_SHIFT_SPEED: f64 = 2.0;

/// Peak offset added to a channel
pub const SHIFT_AMPLITUDE: f32 = 50.0;
