//! # Pan Effect
//!
//! Slides a source-sized window across the image tiled twice, so the motion
//! wraps around seamlessly. Left/right tile horizontally, up/down vertically.

mod effect;

pub use effect::{PanDirection, PanEffect};

pub const DIRECTION: &str = "direction";

pub const DEFAULT_DIRECTION: &str = "right";
