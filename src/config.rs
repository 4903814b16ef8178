use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    detection::DetectionConfig,
    error::{ConfigError, Result},
    extraction::ManualRegion,
    video::EncoderSettings,
};

/// Main configuration for lomo-reel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Separator detection settings
    pub detection: DetectionConfig,

    /// Video encoding settings
    pub video: VideoConfig,

    /// Frame export settings
    pub output: OutputConfig,

    /// Strips cut from hand-drawn regions instead of detection
    pub manual: Vec<ManualStrip>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_detection(&self.detection)?;
        self.video.validate()?;
        for strip in &self.manual {
            strip.validate()?;
        }
        Ok(())
    }

    /// Manual regions registered for `strip`, matched by full path or file name
    pub fn manual_regions_for(&self, strip: &Path) -> Option<&[ManualRegion]> {
        self.manual
            .iter()
            .find(|m| m.matches(strip))
            .map(|m| m.regions.as_slice())
    }
}

fn validate_detection(detection: &DetectionConfig) -> Result<()> {
    if detection.frame_height_override == Some(0) {
        return Err(ConfigError::InvalidValue {
            key: "detection.frame_height".to_string(),
            value: "0".to_string(),
        }
        .into());
    }

    if detection.min_frame_distance == Some(0) {
        return Err(ConfigError::InvalidValue {
            key: "detection.min_frame_distance".to_string(),
            value: "0".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Video encoding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Playback rate of the reel
    pub fps: u32,

    /// ffmpeg video codec name
    pub codec: String,

    /// Encoding quality (0-100)
    pub quality: u8,

    /// ffmpeg binary name or path
    pub ffmpeg: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        let encoder = EncoderSettings::default();
        Self {
            fps: 12,
            codec: encoder.codec,
            quality: encoder.quality,
            ffmpeg: encoder.ffmpeg,
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(ConfigError::InvalidValue {
                key: "video.fps".to_string(),
                value: self.fps.to_string(),
            }
            .into());
        }

        if self.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "video.quality".to_string(),
                value: self.quality.to_string(),
            }
            .into());
        }

        if self.codec.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "video.codec".to_string(),
                value: self.codec.clone(),
            }
            .into());
        }

        Ok(())
    }

    pub fn encoder_settings(&self) -> EncoderSettings {
        EncoderSettings {
            ffmpeg: self.ffmpeg.clone(),
            codec: self.codec.clone(),
            quality: self.quality,
        }
    }
}

/// Image format for exported frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    #[default]
    Jpg,
    Png,
}

impl FrameFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Frame export configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write each strip's frames next to it as `<stem>_frames/frame_NNN.<ext>`
    pub save_frames: bool,

    pub frame_format: FrameFormat,

    /// Put the `<stem>_frames` directories here instead of beside each strip
    pub frames_dir: Option<PathBuf>,
}

/// Hand-drawn regions for one strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualStrip {
    pub strip: PathBuf,
    pub regions: Vec<ManualRegion>,
}

impl ManualStrip {
    fn matches(&self, path: &Path) -> bool {
        if self.strip == path {
            return true;
        }
        // a bare file name matches the strip wherever it lives
        self.strip.parent().map_or(true, |p| p.as_os_str().is_empty())
            && path.file_name() == Some(self.strip.as_os_str())
    }

    fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "manual.regions".to_string(),
                value: format!("{} has no regions", self.strip.display()),
            }
            .into());
        }
        Ok(())
    }
}
