//! # Rotate Effect
//!
//! Swings the image counter-clockwise and back on a sine wave while scaling
//! it up and down again, centred on a black canvas of the source size.

mod effect;

pub use effect::RotateEffect;

pub const ROTATION_DEGREES: &str = "rotation_degrees";
pub const MAX_SCALE: &str = "max_scale";

pub const DEFAULT_ROTATION_DEGREES: f64 = 90.0;
pub const DEFAULT_MAX_SCALE: f64 = 2.0;
