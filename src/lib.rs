//! # storyreel
//!
//! Turn narrated stills into short videos with procedural motion effects.
//!
//! The heart of the library is a family of effects that animate one still
//! image into a clip: every frame is computed from the source, the frame
//! index, the total frame count and the effect's parameters. Clips always
//! have exactly `max(1, round(duration * fps))` frames at the source
//! resolution.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use storyreel::{config::Config, effects::EffectDispatcher};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let dispatcher = EffectDispatcher::new(&config)?;
//!
//! dispatcher.invoke("ripple", "scene.png", 4.0, 24, "scene.mp4")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`effects`] - The motion effects, their registry and the dispatcher
//! - [`video`] - Image loading, clip timing, the frame sequencer and encoders
//! - [`audio`] - Narration duration measurement
//! - [`pipeline`] - Storyboards and the scene-by-scene orchestrator
//! - [`config`] - Configuration management
//!
//! ## Creating Custom Effects
//!
//! Implement the [`Effect`](effects::Effect) trait and drive it with a
//! [`FrameSequencer`](video::FrameSequencer):
//!
//! ```rust,no_run
//! use storyreel::effects::{Effect, EffectKind, EffectRng};
//! use storyreel::video::{Frame, FrameTiming};
//! use storyreel::Result;
//!
//! struct Invert;
//!
//! impl Effect for Invert {
//!     fn kind(&self) -> EffectKind {
//!         EffectKind::ColorShift
//!     }
//!
//!     fn render_frame(&self, source: &Frame, _timing: FrameTiming, _rng: &mut EffectRng) -> Result<Frame> {
//!         let mut frame = source.clone();
//!         for pixel in frame.as_image_mut().pixels_mut() {
//!             pixel.0 = pixel.0.map(|c| 255 - c);
//!         }
//!         Ok(frame)
//!     }
//! }
//! ```

pub mod audio;
pub mod config;
pub mod effects;
pub mod error;
pub mod pipeline;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    effects::{Effect, EffectDispatcher, EffectKind, EffectRegistry},
    error::{ReelError, Result},
    pipeline::{ScenePipeline, Storyboard},
};
