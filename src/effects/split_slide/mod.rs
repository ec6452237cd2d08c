//! # Split Slide Effect
//!
//! Cuts the frame into strips that start pushed apart, alternating up and
//! down (or left and right), meet exactly at the midpoint of the clip and
//! drift apart again towards the end.

mod effect;

pub use effect::{SplitDirection, SplitSlideEffect};

pub const SPLIT_DIRECTION: &str = "split_direction";
pub const NUM_SPLITS: &str = "num_splits";

pub const DEFAULT_SPLIT_DIRECTION: &str = "vertical";
pub const DEFAULT_NUM_SPLITS: u32 = 4;
