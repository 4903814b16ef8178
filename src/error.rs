use thiserror::Error;

/// Main error type for the lomo-reel library
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Strip processing error: {0}")]
    Strip(#[from] StripError),

    #[error("Video assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures local to a single strip image. A batch records these and moves on.
#[derive(Error, Debug)]
pub enum StripError {
    #[error("Failed to decode strip image: {path} ({reason})")]
    UnreadableImage { path: String, reason: String },

    #[error("No frames could be extracted from {path} ({separators} separators found)")]
    NoFramesDetected { path: String, separators: usize },
}

/// Failures that abort one video assembly call
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("No frames to assemble")]
    EmptyFrameSet,

    #[error("Could not write {path}: {reason}")]
    WriterFailure { path: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path} ({reason})")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using ReelError
pub type Result<T> = std::result::Result<T, ReelError>;

impl AssemblyError {
    pub fn writer<P: AsRef<std::path::Path>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::WriterFailure {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }
}

impl ReelError {
    /// Whether the failure only concerns one strip and the batch may continue
    pub fn is_per_strip(&self) -> bool {
        matches!(self, Self::Strip(_))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Strip(StripError::UnreadableImage { path, .. }) => {
                format!(
                    "Could not read '{}'. Please check the file exists and is a JPEG, PNG, BMP or TIFF image.",
                    path
                )
            }
            Self::Strip(StripError::NoFramesDetected { path, .. }) => {
                format!(
                    "No frames were found in '{}'. Try a different sensitivity or set a frame height.",
                    path
                )
            }
            Self::Assembly(AssemblyError::EmptyFrameSet) => {
                "No frames were extracted from any strip, so no video was written.".to_string()
            }
            Self::Assembly(AssemblyError::WriterFailure { path, reason }) => {
                format!(
                    "Writing '{}' failed: {}. Is ffmpeg installed and the directory writable?",
                    path, reason
                )
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
