use thiserror::Error;

/// Main error type for the storyreel library
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Effect error: {0}")]
    Effect(#[from] EffectError),

    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Effect lookup and execution errors
#[derive(Error, Debug)]
pub enum EffectError {
    #[error("Unknown effect: {name}")]
    Unknown { name: String },

    #[error("Invalid parameter for {effect}: {details}")]
    InvalidParameters { effect: String, details: String },

    #[error("Effect '{effect}' failed: {source}")]
    Execution {
        effect: String,
        #[source]
        source: Box<ReelError>,
    },
}

/// Image decoding, frame and encoder errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to decode image {path}: {reason}")]
    ImageDecode { path: String, reason: String },

    #[error("Video encoding failed: {reason}")]
    Encode { reason: String },

    #[error("Frame size mismatch: got {got_width}x{got_height}, expected {expected_width}x{expected_height}")]
    FrameMismatch {
        got_width: u32,
        got_height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("Invalid video parameters: {details}")]
    InvalidParameters { details: String },
}

/// Narration audio errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Could not determine duration of {path}")]
    UnknownDuration { path: String },
}

/// Scene pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Storyboard has no scenes: {path}")]
    EmptyStoryboard { path: String },

    #[error("Nothing to render: the storyboard has no scenes")]
    NoScenes,

    #[error("Scene {index} is missing its {asset}: {path}")]
    MissingAsset {
        index: usize,
        asset: String,
        path: String,
    },

    #[error("No scene clips were produced ({skipped} scenes skipped)")]
    NoClips { skipped: usize },

    #[error("External tool failed: {tool} - {reason}")]
    ToolFailed { tool: String, reason: String },

    #[error("Invalid storyboard {path}: {reason}")]
    InvalidStoryboard { path: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file {path}: {reason}")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using ReelError
pub type Result<T> = std::result::Result<T, ReelError>;

impl ReelError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Wrap any failure raised while running an effect
    pub fn execution<S: Into<String>>(effect: S, source: ReelError) -> Self {
        EffectError::Execution {
            effect: effect.into(),
            source: Box::new(source),
        }
        .into()
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // IO errors might be temporary
            Self::Io(_) => true,
            Self::Audio(AudioError::LoadFailed { .. }) => true,
            Self::Pipeline(PipelineError::ToolFailed { .. }) => true,
            Self::Effect(EffectError::Execution { source, .. }) => source.is_recoverable(),
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Video(VideoError::ImageDecode { path, .. }) => {
                format!("Could not read image '{}'. Please check the file exists and is a PNG or JPEG.", path)
            }
            Self::Audio(AudioError::LoadFailed { path }) => {
                format!("Could not load audio file '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Effect(EffectError::Unknown { name }) => {
                format!(
                    "Effect '{}' not found. Available effects: {}",
                    name,
                    crate::effects::EffectKind::ALL
                        .iter()
                        .map(|kind| kind.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Self::Effect(EffectError::Execution { source, .. }) => source.user_message(),
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_keeps_cause() {
        let cause = VideoError::Encode {
            reason: "pipe closed".to_string(),
        };
        let error = ReelError::execution("zoom", cause.into());

        let source = std::error::Error::source(&error).expect("effect error source");
        assert!(source.to_string().contains("pipe closed"));
        assert!(error.to_string().contains("zoom"));
    }

    #[test]
    fn test_unknown_effect_message_lists_effects() {
        let error: ReelError = EffectError::Unknown {
            name: "wobble".to_string(),
        }
        .into();

        let message = error.user_message();
        assert!(message.contains("wobble"));
        assert!(message.contains("puzzle_reveal"));
    }

    #[test]
    fn test_recoverable_follows_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::Interrupted, "interrupted");
        let error = ReelError::execution("pan", io.into());
        assert!(error.is_recoverable());

        let decode = ReelError::execution(
            "pan",
            VideoError::ImageDecode {
                path: "a.png".to_string(),
                reason: "truncated".to_string(),
            }
            .into(),
        );
        assert!(!decode.is_recoverable());
    }
}
