use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    assets::fonts::DEFAULT_FONT_SIZE_PX,
    encode::ffmpeg::EncoderSettings,
    foundation::error::{StillcutError, StillcutResult},
};

/// Where per-video output directories are created by default.
pub const DEFAULT_OUTPUT_ROOT: &str = "data/videos";

/// Font selection settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontSettings {
    /// Font files tried before the built-in candidate list.
    pub files: Vec<PathBuf>,
    pub size_px: f32,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            size_px: DEFAULT_FONT_SIZE_PX,
        }
    }
}

/// Immutable render configuration loaded once per invocation.
///
/// Keys this crate does not know about (API keys, voice settings, ...) are kept untouched in
/// [`RenderConfig::extra`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub output_root: PathBuf,
    pub encoder: EncoderSettings,
    pub fonts: FontSettings,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            encoder: EncoderSettings::default(),
            fonts: FontSettings::default(),
            extra: serde_json::Map::new(),
        }
    }
}

impl RenderConfig {
    /// Read a JSON config file.
    pub fn from_path(path: &Path) -> StillcutResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// Parse a JSON config document; the top level must be an object.
    pub fn from_json_str(raw: &str) -> StillcutResult<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| StillcutError::config(format!("invalid config JSON: {e}")))?;
        if !value.is_object() {
            return Err(StillcutError::config("config must be a JSON object"));
        }
        let cfg: Self = serde_json::from_value(value)
            .map_err(|e| StillcutError::config(format!("invalid config value: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> StillcutResult<()> {
        if self.encoder.program.trim().is_empty() {
            return Err(StillcutError::config("encoder.program must be non-empty"));
        }
        if !self.fonts.size_px.is_finite() || self.fonts.size_px <= 0.0 {
            return Err(StillcutError::config(
                "fonts.size_px must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Directory holding every artifact of `video_id`.
    pub fn video_dir(&self, video_id: &str) -> PathBuf {
        self.output_root.join(video_id)
    }

    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    pub fn with_encoder(mut self, encoder: EncoderSettings) -> Self {
        self.encoder = encoder;
        self
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
