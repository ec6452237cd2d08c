//! # Audio Module
//!
//! Measures narration tracks so each scene clip can be timed to its audio.
//! WAV files are read with `hound`; compressed formats go through `symphonia`.

pub mod duration;

pub use duration::{AudioInfo, AudioProbe};
