//! # Shake Zoom Effect
//!
//! The zoom-out of [`crate::effects::zoom`] with the crop window jolted by a
//! fresh random offset on every frame, like a handheld camera.

mod effect;

pub use effect::ShakeZoomEffect;

pub use crate::effects::zoom::{DEFAULT_MAX_ZOOM, MAX_ZOOM};

pub const SHAKE_INTENSITY: &str = "shake_intensity";

pub const DEFAULT_SHAKE_INTENSITY: f64 = 0.1;
