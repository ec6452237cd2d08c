//! # Ripple Effect
//!
//! Radial sine waves spreading from the image centre, displacing the sample
//! position of every pixel. The amplitude fades linearly to zero so the clip
//! settles on the undistorted still.

mod effect;

pub use effect::RippleEffect;

pub const RIPPLE_FREQUENCY: &str = "ripple_frequency";
pub const RIPPLE_AMPLITUDE: &str = "ripple_amplitude";

pub const DEFAULT_RIPPLE_FREQUENCY: f64 = 0.4;
pub const DEFAULT_RIPPLE_AMPLITUDE: f64 = 10.0;
