use super::*;
use crate::encode::ffmpeg::FrameCleanup;

#[test]
fn empty_object_gives_defaults() {
    let cfg = RenderConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, RenderConfig::default());
    assert_eq!(cfg.output_root, PathBuf::from("data/videos"));
    assert_eq!(cfg.encoder.program, "ffmpeg");
    assert_eq!(cfg.fonts.size_px, 50.0);
}

#[test]
fn unknown_keys_pass_through() {
    let raw = r#"{
        "openai_key": "sk-test",
        "voice_name": "Charlie",
        "video_settings": {"resolution": "1080x1920", "fps": 30}
    }"#;
    let cfg = RenderConfig::from_json_str(raw).unwrap();
    assert_eq!(cfg.extra["openai_key"], "sk-test");
    assert_eq!(cfg.extra["video_settings"]["fps"], 30);
    assert_eq!(cfg.encoder, EncoderSettings::default());
}

#[test]
fn known_sections_override_defaults() {
    let raw = r#"{
        "output_root": "/tmp/shorts",
        "encoder": {"program": "/usr/local/bin/ffmpeg", "frame_cleanup": "never"},
        "fonts": {"files": ["fonts/Inter.ttf"], "size_px": 44}
    }"#;
    let cfg = RenderConfig::from_json_str(raw).unwrap();
    assert_eq!(cfg.video_dir("abc123"), PathBuf::from("/tmp/shorts/abc123"));
    assert_eq!(cfg.encoder.program, "/usr/local/bin/ffmpeg");
    assert_eq!(cfg.encoder.frame_cleanup, FrameCleanup::Never);
    assert_eq!(cfg.encoder.video_codec, "libx264");
    assert_eq!(cfg.fonts.files, vec![PathBuf::from("fonts/Inter.ttf")]);
    assert_eq!(cfg.fonts.size_px, 44.0);
    assert!(cfg.extra.is_empty());
}

#[test]
fn non_object_documents_are_rejected() {
    for raw in ["[]", "42", "\"text\"", "null"] {
        let err = RenderConfig::from_json_str(raw).unwrap_err();
        assert!(matches!(err, StillcutError::Config(_)), "{raw}");
    }
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = RenderConfig::from_json_str("{not json").unwrap_err();
    assert!(err.to_string().starts_with("config error:"));
}

#[test]
fn invalid_values_are_rejected() {
    assert!(RenderConfig::from_json_str(r#"{"encoder": {"program": " "}}"#).is_err());
    assert!(RenderConfig::from_json_str(r#"{"fonts": {"size_px": 0}}"#).is_err());
    assert!(RenderConfig::from_json_str(r#"{"output_root": 5}"#).is_err());
}

#[test]
fn unreadable_file_is_reported_with_path() {
    let err = RenderConfig::from_path(Path::new("target/no-such-config.json")).unwrap_err();
    assert!(err.to_string().contains("no-such-config.json"));
}

#[test]
fn encoder_global_args_are_a_config_key() {
    let raw = r#"{"encoder": {"program": "/bin/sh", "global_args": ["wrap_ffmpeg.sh"]}}"#;
    let cfg = RenderConfig::from_json_str(raw).unwrap();
    assert_eq!(cfg.encoder.global_args, vec!["wrap_ffmpeg.sh".to_string()]);
    assert!(cfg.extra.is_empty());

    let defaults = RenderConfig::from_json_str("{}").unwrap();
    assert!(defaults.encoder.global_args.is_empty());
}
