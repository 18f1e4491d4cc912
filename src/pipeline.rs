use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    path::PathBuf,
};

use anyhow::Context as _;
use sha2::Digest as _;

use crate::{
    assets::fonts::{FontChain, Typeface},
    config::RenderConfig,
    encode::ffmpeg::{EncodedVideo, FfmpegStillEncoder, StillEncodeJob},
    foundation::core::Canvas,
    foundation::error::{StillcutError, StillcutResult},
    layout::wrap::{WrapOptions, WrappedText, wrap_text},
    render::compose::{Frame, FrameStyle, compose_frame},
};

/// Characters kept from a script before wrapping.
pub const DEFAULT_MAX_CHARS: usize = 200;
/// Lines drawn on the frame.
pub const DEFAULT_MAX_LINES: usize = 10;
/// Length of every produced video.
pub const DEFAULT_DURATION_SECS: u32 = 10;

pub const VIDEO_EXTENSION: &str = "mp4";
pub const FRAME_EXTENSION: &str = "png";

const SUCCESS_MESSAGE: &str = "video created successfully";

/// One script-to-video render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderRequest {
    script_text: String,
    video_id: String,
    canvas: Canvas,
    max_chars: usize,
    max_lines: usize,
    duration_secs: u32,
}

impl RenderRequest {
    /// Request with the standard vertical canvas, caps and duration.
    pub fn new(script_text: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            script_text: script_text.into(),
            video_id: video_id.into(),
            canvas: Canvas::VERTICAL_1080P,
            max_chars: DEFAULT_MAX_CHARS,
            max_lines: DEFAULT_MAX_LINES,
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }

    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    pub fn with_duration_secs(mut self, duration_secs: u32) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn script_text(&self) -> &str {
        &self.script_text
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn wrap_options(&self) -> WrapOptions {
        WrapOptions::for_canvas_width(self.canvas.width, self.max_chars, self.max_lines)
    }

    pub fn validate(&self) -> StillcutResult<()> {
        validate_video_id(&self.video_id)?;
        Canvas::new(self.canvas.width, self.canvas.height)?;
        if self.max_lines == 0 {
            return Err(StillcutError::validation("max_lines must be non-zero"));
        }
        if self.duration_secs == 0 {
            return Err(StillcutError::validation("duration_secs must be non-zero"));
        }
        Ok(())
    }
}

/// The video id names a directory and two files, so it must be a single plain path component.
pub fn validate_video_id(video_id: &str) -> StillcutResult<()> {
    if video_id.trim().is_empty() {
        return Err(StillcutError::validation("video_id must be non-empty"));
    }
    if video_id == "." || video_id == ".." {
        return Err(StillcutError::validation(
            "video_id must not be '.' or '..'",
        ));
    }
    if video_id.contains(['/', '\\', '\0']) {
        return Err(StillcutError::validation(
            "video_id must not contain path separators or NUL",
        ));
    }
    Ok(())
}

/// On-disk locations of one request's artifacts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoPaths {
    pub dir: PathBuf,
    pub frame: PathBuf,
    pub video: PathBuf,
}

impl VideoPaths {
    pub fn new(dir: impl Into<PathBuf>, video_id: &str) -> Self {
        let dir = dir.into();
        Self {
            frame: dir.join(format!("{video_id}.{FRAME_EXTENSION}")),
            video: dir.join(format!("{video_id}.{VIDEO_EXTENSION}")),
            dir,
        }
    }
}

/// Classification of a failed render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingDependency,
    EncodingFailed,
    Unexpected,
}

impl FailureKind {
    pub fn of(err: &StillcutError) -> Self {
        match err {
            StillcutError::MissingDependency(_) => Self::MissingDependency,
            StillcutError::EncodingFailed(_) => Self::EncodingFailed,
            StillcutError::Validation(_) | StillcutError::Config(_) | StillcutError::Other(_) => {
                Self::Unexpected
            }
        }
    }
}

/// Outcome of one [`Pipeline::run`], serialized as the CLI's stdout JSON.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status")]
pub enum RenderResult {
    #[serde(rename = "success")]
    Success {
        video_path: String,
        video_id: String,
        file_size: u64,
        message: String,
    },
    #[serde(rename = "error")]
    Failure {
        video_id: String,
        error: String,
        kind: FailureKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        traceback: Option<String>,
    },
}

impl RenderResult {
    pub fn failure(video_id: &str, err: &StillcutError) -> Self {
        let kind = FailureKind::of(err);
        let (error, traceback) = match (kind, err) {
            (FailureKind::MissingDependency | FailureKind::EncodingFailed, _) => {
                (err.to_string(), None)
            }
            (FailureKind::Unexpected, StillcutError::Other(inner)) => (
                format!("video creation failed: {inner:#}"),
                Some(format!("{inner:?}")),
            ),
            (FailureKind::Unexpected, _) => (
                format!("video creation failed: {err}"),
                Some(format!("{err:?}")),
            ),
        };
        Self::Failure {
            video_id: video_id.to_string(),
            error,
            kind,
            traceback,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn video_id(&self) -> &str {
        match self {
            Self::Success { video_id, .. } | Self::Failure { video_id, .. } => video_id,
        }
    }
}

/// Script → frame → video orchestration.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    config: RenderConfig,
    style: FrameStyle,
}

impl Pipeline {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            style: FrameStyle::default(),
        }
    }

    pub fn with_style(mut self, style: FrameStyle) -> Self {
        self.style = style;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn font_chain(&self) -> FontChain {
        FontChain::with_defaults(&self.config.fonts.files, self.config.fonts.size_px)
    }

    /// Run every stage and report the outcome. Never panics and never returns early.
    #[tracing::instrument(skip(self, request), fields(video_id = %request.video_id()))]
    pub fn run(&self, request: &RenderRequest) -> RenderResult {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.execute(request)));
        match outcome {
            Ok(Ok((video, file_size))) => {
                tracing::info!(path = %video.path.display(), file_size, "video created");
                RenderResult::Success {
                    video_path: video.path.display().to_string(),
                    video_id: request.video_id().to_string(),
                    file_size,
                    message: SUCCESS_MESSAGE.to_string(),
                }
            }
            Ok(Err(err)) => {
                tracing::error!(error = %err, "video creation failed");
                RenderResult::failure(request.video_id(), &err)
            }
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                tracing::error!(panic = %msg, "video creation panicked");
                RenderResult::Failure {
                    video_id: request.video_id().to_string(),
                    error: format!("video creation failed: {msg}"),
                    kind: FailureKind::Unexpected,
                    traceback: Some(std::backtrace::Backtrace::force_capture().to_string()),
                }
            }
        }
    }

    fn execute(&self, request: &RenderRequest) -> StillcutResult<(EncodedVideo, u64)> {
        tracing::info!(
            script_chars = request.script_text().chars().count(),
            "starting video creation"
        );

        let paths = self.setup(request)?;

        let frame = self.render_frame(request)?;
        frame.save_png(&paths.frame)?;

        let video = self.encode(request, &paths)?;
        let file_size = video.size_bytes()?;
        Ok((video, file_size))
    }

    /// Validate the request and create its output directory.
    pub fn setup(&self, request: &RenderRequest) -> StillcutResult<VideoPaths> {
        request.validate()?;
        let dir = self.config.video_dir(request.video_id());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output directory '{}'", dir.display()))?;
        let dir = std::fs::canonicalize(&dir)
            .with_context(|| format!("resolve output directory '{}'", dir.display()))?;
        tracing::info!(dir = %dir.display(), "output directory ready");
        Ok(VideoPaths::new(dir, request.video_id()))
    }

    /// Wrap and compose the request's script into a frame.
    pub fn render_frame(&self, request: &RenderRequest) -> StillcutResult<Frame> {
        let mut face = self.font_chain().resolve();
        let wrapped = self.wrap(request, &mut face);
        tracing::info!(
            lines = wrapped.len(),
            truncated = wrapped.truncated(),
            font = %face.source(),
            "composing frame"
        );
        compose_frame(
            &wrapped,
            request.canvas(),
            request.max_lines(),
            &self.style,
            &mut face,
        )
    }

    pub fn wrap(&self, request: &RenderRequest, face: &mut Typeface) -> WrappedText {
        wrap_text(request.script_text(), request.wrap_options(), face)
    }

    fn encode(&self, request: &RenderRequest, paths: &VideoPaths) -> StillcutResult<EncodedVideo> {
        let job = StillEncodeJob {
            frame_path: paths.frame.clone(),
            out_path: paths.video.clone(),
            duration_secs: request.duration_secs(),
        };
        tracing::info!(program = %self.config.encoder.program, "encoding video");
        FfmpegStillEncoder::new(self.config.encoder.clone()).encode(&job)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Encoder availability as seen by [`check_dependencies`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct EncoderReport {
    pub program: String,
    pub available: bool,
}

/// Font resolution as seen by [`check_dependencies`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FontReport {
    pub source: String,
    pub family: String,
    pub builtin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Host readiness for rendering.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DependencyReport {
    pub status: &'static str,
    pub encoder: EncoderReport,
    pub font: FontReport,
}

/// Probe the encoder program and resolve the font chain without rendering anything.
pub fn check_dependencies(config: &RenderConfig) -> DependencyReport {
    let encoder = FfmpegStillEncoder::new(config.encoder.clone());
    let available = encoder.is_available();

    let face = FontChain::with_defaults(&config.fonts.files, config.fonts.size_px).resolve();
    let font = FontReport {
        source: face.source(),
        family: face.family(),
        builtin: face.is_builtin(),
        sha256: face.loaded_font().map(|f| sha256_hex(&f.bytes)),
    };

    DependencyReport {
        status: if available { "success" } else { "error" },
        encoder: EncoderReport {
            program: config.encoder.program.clone(),
            available,
        },
        font,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Default location for a request's artifacts under `config`.
pub fn video_paths(config: &RenderConfig, video_id: &str) -> VideoPaths {
    VideoPaths::new(config.video_dir(video_id), video_id)
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
