use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;

use crate::foundation::error::{StillcutError, StillcutResult};

/// What happens to the intermediate frame image once the encoder has run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameCleanup {
    /// Delete after a successful encode; keep it for inspection when encoding fails.
    #[default]
    OnSuccess,
    /// Delete whatever the outcome.
    Always,
    /// Never delete.
    Never,
}

/// How the external encoder is invoked.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// Executable name or path.
    pub program: String,
    /// Arguments placed before everything else on the command line, such as `-hide_banner` or
    /// the script path when `program` is an interpreter wrapping the encoder.
    pub global_args: Vec<String>,
    /// Value for `-c:v`.
    pub video_codec: String,
    /// Value for `-pix_fmt`.
    pub pixel_format: String,
    /// Replace an existing output file (`-y`) instead of refusing (`-n`).
    pub overwrite: bool,
    pub frame_cleanup: FrameCleanup,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            global_args: Vec::new(),
            video_codec: "libx264".to_string(),
            // yuv420p keeps the output playable in browsers and phone players.
            pixel_format: "yuv420p".to_string(),
            overwrite: true,
            frame_cleanup: FrameCleanup::OnSuccess,
        }
    }
}

/// One still-image-to-video encode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StillEncodeJob {
    /// Image looped for the whole video.
    pub frame_path: PathBuf,
    /// Destination video file.
    pub out_path: PathBuf,
    /// Output duration in whole seconds.
    pub duration_secs: u32,
}

impl StillEncodeJob {
    pub fn validate(&self) -> StillcutResult<()> {
        if self.duration_secs == 0 {
            return Err(StillcutError::validation(
                "encode duration_secs must be non-zero",
            ));
        }
        if self.frame_path == self.out_path {
            return Err(StillcutError::validation(
                "encode frame and output paths must differ",
            ));
        }
        Ok(())
    }
}

/// A video file written by the encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedVideo {
    pub path: PathBuf,
}

impl EncodedVideo {
    /// Current size of the file on disk.
    pub fn size_bytes(&self) -> StillcutResult<u64> {
        let meta = std::fs::metadata(&self.path)
            .with_context(|| format!("stat video '{}'", self.path.display()))?;
        Ok(meta.len())
    }
}

/// Loops a single image into a fixed-length video using the system `ffmpeg`.
#[derive(Clone, Debug, Default)]
pub struct FfmpegStillEncoder {
    settings: EncoderSettings,
}

impl FfmpegStillEncoder {
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    /// Build the encoder command line for `job` without running it.
    pub fn command(&self, job: &StillEncodeJob) -> Command {
        let s = &self.settings;
        let mut cmd = Command::new(&s.program);
        cmd.args(&s.global_args);
        cmd.args(["-loglevel", "error", "-loop", "1", "-i"])
            .arg(&job.frame_path)
            .args(["-c:v", s.video_codec.as_str()])
            .args(["-t", &job.duration_secs.to_string()])
            .args(["-pix_fmt", s.pixel_format.as_str()])
            .arg(if s.overwrite { "-y" } else { "-n" })
            .arg(&job.out_path);
        cmd
    }

    /// Run the encoder to completion.
    ///
    /// Blocks until the process exits. The captured stderr is carried verbatim in the
    /// [`StillcutError::EncodingFailed`] message on failure.
    pub fn encode(&self, job: &StillEncodeJob) -> StillcutResult<EncodedVideo> {
        job.validate()?;
        ensure_parent_dir(&job.out_path)?;

        if !self.settings.overwrite && job.out_path.exists() {
            return Err(StillcutError::validation(format!(
                "output file '{}' already exists",
                job.out_path.display()
            )));
        }

        let result = self.run(job);
        self.cleanup_frame(&job.frame_path, result.is_ok());
        result
    }

    fn run(&self, job: &StillEncodeJob) -> StillcutResult<EncodedVideo> {
        let program = &self.settings.program;
        let output = self
            .command(job)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                StillcutError::encoding_failed(format!(
                    "failed to spawn {program} (is it installed and on PATH?): {e}"
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(status = %output.status, "encoder exited with failure");
            return Err(StillcutError::encoding_failed(format!(
                "{program} exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if !job.out_path.is_file() {
            return Err(StillcutError::encoding_failed(format!(
                "{program} reported success but '{}' was not created",
                job.out_path.display()
            )));
        }

        Ok(EncodedVideo {
            path: job.out_path.clone(),
        })
    }

    fn cleanup_frame(&self, frame_path: &Path, encoded: bool) {
        let remove = match self.settings.frame_cleanup {
            FrameCleanup::OnSuccess => encoded,
            FrameCleanup::Always => true,
            FrameCleanup::Never => false,
        };
        if !remove {
            return;
        }
        if let Err(e) = std::fs::remove_file(frame_path) {
            tracing::warn!(path = %frame_path.display(), error = %e, "failed to remove frame image");
        }
    }

    /// Return `true` when the configured program answers `-version`.
    pub fn is_available(&self) -> bool {
        Command::new(&self.settings.program)
            .args(&self.settings.global_args)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> StillcutResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    FfmpegStillEncoder::default().is_available()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
