use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    effects::EffectKind,
    error::{EffectError, Result},
    video::types::{Frame, FrameTiming},
};

/// Random source handed to effects, one per frame
pub type EffectRng = SmallRng;

/// Derive the generator for one frame of a clip.
///
/// Each frame gets its own stream, so output does not depend on the order
/// or thread frames are rendered on.
pub fn frame_rng(seed: u64, index: u32) -> EffectRng {
    let mixed = seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    SmallRng::seed_from_u64(mixed)
}

/// Core trait that all motion effects implement
pub trait Effect: Send + Sync {
    /// Which registered effect this is
    fn kind(&self) -> EffectKind;

    /// Returns the unique name of this effect
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Returns a human-readable description of this effect
    fn description(&self) -> &'static str {
        self.kind().description()
    }

    /// Render one frame of the clip from the still `source`.
    ///
    /// # Arguments
    ///
    /// * `source` - The still image, never modified
    /// * `timing` - Index of the frame and total frame count
    /// * `rng` - Generator for effects that jitter; deterministic effects ignore it
    ///
    /// # Returns
    ///
    /// A new frame with the same dimensions as `source`.
    fn render_frame(&self, source: &Frame, timing: FrameTiming, rng: &mut EffectRng) -> Result<Frame>;

    /// Get effect-specific metadata
    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::default()
    }
}

/// Named parameter bag for one effect
///
/// Keys are parameter names such as `max_zoom`; values come from the
/// configuration file or the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectParams {
    values: HashMap<String, ParamValue>,
}

impl EffectParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter value
    pub fn set<K: Into<String>, V: Into<ParamValue>>(mut self, key: K, value: V) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert<K: Into<String>, V: Into<ParamValue>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` on top of these parameters
    pub fn merged(&self, other: &EffectParams) -> EffectParams {
        let mut values = self.values.clone();
        values.extend(other.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        EffectParams { values }
    }

    /// Numeric parameter, or `default` when unset
    pub fn float_or(&self, effect: EffectKind, key: &str, default: f64) -> Result<f64> {
        match self.values.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_f64()
                .ok_or_else(|| wrong_type(effect, key, "a number", value)),
        }
    }

    /// Non-negative integer parameter, or `default` when unset
    pub fn uint_or(&self, effect: EffectKind, key: &str, default: u32) -> Result<u32> {
        match self.values.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_u32()
                .ok_or_else(|| wrong_type(effect, key, "a non-negative integer", value)),
        }
    }

    /// Text parameter, or `default` when unset
    pub fn text_or<'a>(&'a self, effect: EffectKind, key: &str, default: &'a str) -> Result<&'a str> {
        match self.values.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_str()
                .ok_or_else(|| wrong_type(effect, key, "a string", value)),
        }
    }
}

fn wrong_type(effect: EffectKind, key: &str, expected: &str, value: &ParamValue) -> crate::error::ReelError {
    EffectError::InvalidParameters {
        effect: effect.name().to_string(),
        details: format!("{} must be {}, got {}", key, expected, value),
    }
    .into()
}

/// Build an `InvalidParameters` error for `effect`
pub(crate) fn invalid(effect: EffectKind, details: String) -> crate::error::ReelError {
    EffectError::InvalidParameters {
        effect: effect.name().to_string(),
        details,
    }
    .into()
}

/// Flexible parameter value that can hold different types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl ParamValue {
    /// Parse a command-line value: integers, then floats, then booleans, else text
    pub fn parse(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            ParamValue::Integer(i)
        } else if let Ok(f) = raw.parse::<f64>() {
            ParamValue::Float(f)
        } else if let Ok(b) = raw.parse::<bool>() {
            ParamValue::Bool(b)
        } else {
            ParamValue::Text(raw.to_string())
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            ParamValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ParamValue::Integer(i) => u32::try_from(*i).ok(),
            ParamValue::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64 => {
                Some(*f as u32)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Integer(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(value as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Metadata about an effect's parameters and characteristics
#[derive(Debug, Clone, Default)]
pub struct EffectMetadata {
    /// Whether frames depend on the random seed
    pub randomized: bool,

    /// Estimated performance impact (0.0 = minimal, 1.0 = heavy)
    pub performance_impact: f32,

    /// Parameter names with descriptions and defaults
    pub parameters: Vec<(String, String)>,
}
