//! # Puzzle Reveal Effect
//!
//! Splits the frame into a `puzzle_size x puzzle_size` grid of tiles that
//! jitter around their home positions, with the jitter shrinking until the
//! picture locks together at 80% of the clip.

mod effect;

pub use effect::PuzzleRevealEffect;

pub const PUZZLE_SIZE: &str = "puzzle_size";

pub const DEFAULT_PUZZLE_SIZE: u32 = 16;

/// Progress at which every tile sits in place
pub const REVEAL_AT: f64 = 0.8;

/// Peak jitter as a fraction of the frame size
pub const SCATTER: f64 = 0.1;
