use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EffectError, ReelError};

/// Every built-in motion effect, in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Zoom,
    Pan,
    Rotate,
    ShakeZoom,
    ColorShift,
    Ripple,
    SplitSlide,
    PuzzleReveal,
}

impl EffectKind {
    pub const ALL: [EffectKind; 8] = [
        EffectKind::Zoom,
        EffectKind::Pan,
        EffectKind::Rotate,
        EffectKind::ShakeZoom,
        EffectKind::ColorShift,
        EffectKind::Ripple,
        EffectKind::SplitSlide,
        EffectKind::PuzzleReveal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Zoom => "zoom",
            EffectKind::Pan => "pan",
            EffectKind::Rotate => "rotate",
            EffectKind::ShakeZoom => "shake_zoom",
            EffectKind::ColorShift => "color_shift",
            EffectKind::Ripple => "ripple",
            EffectKind::SplitSlide => "split_slide",
            EffectKind::PuzzleReveal => "puzzle_reveal",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EffectKind::Zoom => "Slow zoom out from max_zoom back to the full image",
            EffectKind::Pan => "Seamless looping pan across the image",
            EffectKind::Rotate => "Rotation swinging left and right while scaling up and back",
            EffectKind::ShakeZoom => "Zoom out with per-frame camera shake",
            EffectKind::ColorShift => "Colour channels pulsing out of phase",
            EffectKind::Ripple => "Radial ripple distortion fading out over the clip",
            EffectKind::SplitSlide => "Strips sliding apart and back together",
            EffectKind::PuzzleReveal => "Jittering tiles settling into place",
        }
    }

    /// Whether frames of this effect depend on the random seed
    pub fn is_randomized(self) -> bool {
        matches!(self, EffectKind::ShakeZoom | EffectKind::PuzzleReveal)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        EffectKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| {
                EffectError::Unknown {
                    name: s.to_string(),
                }
                .into()
            })
    }
}
