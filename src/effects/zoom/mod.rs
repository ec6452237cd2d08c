//! # Zoom Effect
//!
//! Starts magnified by `max_zoom` and eases linearly back towards the full
//! frame. Each frame is a Lanczos resample of the still, center-cropped to
//! the original size.

mod effect;

pub use effect::{zoom_factor, zoomed_frame, ZoomEffect};

pub const MAX_ZOOM: &str = "max_zoom";

pub const DEFAULT_MAX_ZOOM: f64 = 2.0;
