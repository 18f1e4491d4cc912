/// `ffmpeg`-based still-image encoder.
pub mod ffmpeg;
