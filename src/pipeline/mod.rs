//! # Scene Pipeline
//!
//! Turns a storyboard of narrated stills into one video: every scene gets a
//! subtitle, a randomly chosen motion effect and its narration track, and the
//! finished scene clips are concatenated in order.
//!
//! Subtitle burn-in, muxing and concatenation are external collaborators
//! behind the traits in [`tools`].

pub mod engine;
pub mod script;
pub mod storyboard;
pub mod tools;

// Re-exports for convenience
pub use engine::{ClipRenderer, PipelineReport, RenderedScene, ScenePipeline, SilentClip, SkippedScene};
pub use script::{split_narration, wrap_subtitle};
pub use storyboard::{Scene, Storyboard};
pub use tools::{AudioDurationProbe, AudioMuxer, ClipConcatenator, DurationProbe, FfmpegTools, SubtitleBurner};
