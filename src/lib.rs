//! Stillcut turns a plain-text narration script into a short vertical video.
//!
//! # Pipeline overview
//!
//! 1. **Wrap**: cap the script and break it into lines that fit the frame ([`wrap_text`])
//! 2. **Compose**: draw the lines centered on a solid background ([`compose_frame`])
//! 3. **Encode**: loop the still frame into an MP4 with the system `ffmpeg` ([`FfmpegStillEncoder`])
//!
//! [`Pipeline::run`] drives all three for one [`RenderRequest`] and always returns exactly one
//! [`RenderResult`], which the `stillcut` binary prints as JSON on stdout.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No ambient state**: configuration is loaded once into [`RenderConfig`] and passed down.
#![forbid(unsafe_code)]

mod assets;
mod config;
mod encode;
mod foundation;
mod layout;
mod pipeline;
mod render;

pub use assets::fonts::{
    BlockFont, DEFAULT_FONT_FILES, DEFAULT_FONT_SIZE_PX, DEFAULT_SYSTEM_FAMILIES, FontChain,
    FontFile, FontProvider, GlyphBox, LineLayout, LoadedFont, SystemFamily, TextBrushRgba8,
    TextMeasure, Typeface,
};
pub use config::{DEFAULT_OUTPUT_ROOT, FontSettings, RenderConfig};
pub use encode::ffmpeg::{
    EncodedVideo, EncoderSettings, FfmpegStillEncoder, FrameCleanup, StillEncodeJob,
    ensure_parent_dir, is_ffmpeg_on_path,
};
pub use foundation::core::{Canvas, Rgba8};
pub use foundation::error::{StillcutError, StillcutResult};
pub use layout::wrap::{
    ELLIPSIS, WRAP_MARGIN_PX, WrapOptions, WrappedText, truncate_script, wrap_text,
};
pub use pipeline::{
    DEFAULT_DURATION_SECS, DEFAULT_MAX_CHARS, DEFAULT_MAX_LINES, DependencyReport, EncoderReport,
    FRAME_EXTENSION, FailureKind, FontReport, Pipeline, RenderRequest, RenderResult,
    VIDEO_EXTENSION, VideoPaths, check_dependencies, validate_video_id, video_paths,
};
pub use render::compose::{Frame, FrameStyle, LINE_HEIGHT_PX, compose_frame};
