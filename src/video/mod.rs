//! # Video Module
//!
//! Still-image loading, clip timing, the parallel frame sequencer and the
//! sinks that receive rendered frames (ffmpeg, PNG sequence, memory).

pub mod encoder;
pub mod loader;
pub mod sequencer;
pub mod types;

pub use encoder::{check_ffmpeg_available, FfmpegEncoder, FrameSink, MemorySink, PngSequenceSink};
pub use loader::ImageLoader;
pub use sequencer::{FrameSequencer, RenderStats};
pub use types::{frame_count, ClipPlan, EncoderParams, Frame, FrameTiming};
