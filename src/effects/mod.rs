//! # Motion Effects
//!
//! Each effect turns one still image into a clip by rendering every frame
//! independently from `(source, frame index, total frames, parameters)`.
//! Effects never touch the source; every frame is a new buffer at the source
//! resolution.
//!
//! ## Built-in Effects
//!
//! - **zoom**: linear zoom-out from `max_zoom`
//! - **pan**: seamless looping pan in one of four directions
//! - **rotate**: rotation swing combined with a scale pulse
//! - **shake_zoom**: zoom-out with random camera jolts
//! - **color_shift**: out-of-phase channel pulsing
//! - **ripple**: fading radial ripple distortion
//! - **split_slide**: strips sliding apart and together
//! - **puzzle_reveal**: jittering tiles that lock into place
//!
//! ## Usage
//!
//! ```rust,no_run
//! use storyreel::effects::{EffectKind, EffectParams, EffectRegistry};
//!
//! let registry = EffectRegistry::new();
//! let params = EffectParams::new().set("max_zoom", 1.5);
//! let zoom = registry.build(EffectKind::Zoom, &params).unwrap();
//! println!("{}: {}", zoom.name(), zoom.description());
//! ```

pub mod dispatcher;
pub mod kind;
pub mod raster;
pub mod registry;
pub mod traits;

// Effect implementations
pub mod color_shift;
pub mod pan;
pub mod puzzle_reveal;
pub mod ripple;
pub mod rotate;
pub mod shake_zoom;
pub mod split_slide;
pub mod zoom;

// Re-exports for convenience
pub use dispatcher::EffectDispatcher;
pub use kind::EffectKind;
pub use registry::EffectRegistry;
pub use traits::{frame_rng, Effect, EffectMetadata, EffectParams, EffectRng, ParamValue};

// Re-export all built-in effects
pub use color_shift::ColorShiftEffect;
pub use pan::PanEffect;
pub use puzzle_reveal::PuzzleRevealEffect;
pub use ripple::RippleEffect;
pub use rotate::RotateEffect;
pub use shake_zoom::ShakeZoomEffect;
pub use split_slide::SplitSlideEffect;
pub use zoom::ZoomEffect;
