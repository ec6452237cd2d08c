use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    effects::{EffectKind, EffectParams, EffectRegistry},
    error::{ConfigError, ReelError, Result},
    video::EncoderParams,
};

/// Main configuration for storyreel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame rendering and encoding settings
    pub render: RenderConfig,

    /// Effect selection and parameter overrides
    pub effects: EffectsConfig,

    /// Scene pipeline settings
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into(),
            _ => ReelError::from(e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        self.effects.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }
}

/// Frame rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output frame rate
    pub fps: u32,

    /// Worker threads for frame rendering
    pub threads: usize,

    /// Frames rendered in parallel before being written out
    pub batch_size: usize,

    /// Seed for effect choice and per-frame randomness; random when unset
    pub seed: Option<u64>,

    /// Output encoder settings
    pub encoder: EncoderParams,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: 24,
            threads: num_cpus::get(),
            batch_size: 32,
            seed: None,
            encoder: EncoderParams::default(),
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(ConfigError::InvalidValue {
                key: "render.fps".to_string(),
                value: self.fps.to_string()
            }.into());
        }

        if self.threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "render.threads".to_string(),
                value: self.threads.to_string()
            }.into());
        }

        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "render.batch_size".to_string(),
                value: self.batch_size.to_string()
            }.into());
        }

        if self.encoder.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "render.encoder.quality".to_string(),
                value: self.encoder.quality.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Effect selection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Effect names available for random choice; empty enables all
    pub enabled: Vec<String>,

    /// Parameter overrides keyed by effect name
    pub parameters: BTreeMap<String, EffectParams>,
}

impl EffectsConfig {
    /// Enabled effects, parsed; empty means every effect
    pub fn enabled_kinds(&self) -> Result<Vec<EffectKind>> {
        self.enabled.iter().map(|name| name.parse()).collect()
    }

    /// Configured parameters for `kind`, empty when none are set
    pub fn params_for(&self, kind: EffectKind) -> EffectParams {
        self.parameters.get(kind.name()).cloned().unwrap_or_default()
    }

    fn validate(&self) -> Result<()> {
        for name in &self.enabled {
            if name.parse::<EffectKind>().is_err() {
                return Err(ConfigError::InvalidValue {
                    key: "effects.enabled".to_string(),
                    value: name.clone()
                }.into());
            }
        }

        let registry = EffectRegistry::new();
        for (name, params) in &self.parameters {
            let kind: EffectKind = name.parse().map_err(|_| ConfigError::InvalidValue {
                key: "effects.parameters".to_string(),
                value: name.clone()
            })?;

            registry.build(kind, params).map_err(|e| ConfigError::InvalidValue {
                key: format!("effects.parameters.{}", name),
                value: e.to_string()
            })?;
        }

        Ok(())
    }
}

/// Scene pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory for intermediate per-scene files
    pub work_dir: PathBuf,

    /// Keep intermediate files after a successful run
    pub keep_work_dir: bool,

    /// Characters that end a narration segment
    pub delimiters: String,

    /// Subtitle burn-in settings
    pub subtitles: SubtitleConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("temp"),
            keep_work_dir: false,
            delimiters: "，。！？：".to_string(),
            subtitles: SubtitleConfig::default(),
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<()> {
        if self.work_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "pipeline.work_dir".to_string(),
                value: String::new()
            }.into());
        }

        self.subtitles.validate()
    }
}

/// Subtitle burn-in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleConfig {
    pub enabled: bool,

    /// Font file passed to ffmpeg's drawtext; ffmpeg's default font when unset
    pub font_file: Option<PathBuf>,

    pub font_size: u32,

    /// Any colour ffmpeg understands (`white`, `#ffcc00`, ...)
    pub color: String,

    /// Characters per subtitle line before wrapping
    pub max_chars_per_line: usize,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font_file: None,
            font_size: 60,
            color: "white".to_string(),
            max_chars_per_line: 10,
        }
    }
}

impl SubtitleConfig {
    fn validate(&self) -> Result<()> {
        if self.font_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "pipeline.subtitles.font_size".to_string(),
                value: self.font_size.to_string()
            }.into());
        }

        if self.max_chars_per_line == 0 {
            return Err(ConfigError::InvalidValue {
                key: "pipeline.subtitles.max_chars_per_line".to_string(),
                value: self.max_chars_per_line.to_string()
            }.into());
        }

        Ok(())
    }
}
