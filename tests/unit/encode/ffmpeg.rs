use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_encode").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn job_in(dir: &Path) -> StillEncodeJob {
    let frame_path = dir.join("frame.png");
    std::fs::write(&frame_path, b"png").unwrap();
    StillEncodeJob {
        frame_path,
        out_path: dir.join("out.mp4"),
        duration_secs: 10,
    }
}

/// Encoder settings that run `body` with `/bin/sh` in place of ffmpeg.
fn fake_encoder(dir: &Path, body: &str) -> EncoderSettings {
    let script = dir.join("fake_ffmpeg.sh");
    std::fs::write(&script, format!("for last; do :; done\n{body}\n")).unwrap();
    EncoderSettings {
        program: "/bin/sh".to_string(),
        global_args: vec![script.to_string_lossy().into_owned()],
        ..EncoderSettings::default()
    }
}

fn args_of(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn default_command_loops_still_image_for_duration() {
    let job = StillEncodeJob {
        frame_path: PathBuf::from("videos/abc/abc.png"),
        out_path: PathBuf::from("videos/abc/abc.mp4"),
        duration_secs: 10,
    };
    let cmd = FfmpegStillEncoder::default().command(&job);
    assert_eq!(cmd.get_program(), "ffmpeg");
    assert_eq!(
        args_of(&cmd),
        [
            "-loglevel",
            "error",
            "-loop",
            "1",
            "-i",
            "videos/abc/abc.png",
            "-c:v",
            "libx264",
            "-t",
            "10",
            "-pix_fmt",
            "yuv420p",
            "-y",
            "videos/abc/abc.mp4",
        ]
    );
}

#[test]
fn no_overwrite_uses_refuse_flag_and_global_args_lead() {
    let settings = EncoderSettings {
        program: "/opt/ffmpeg/bin/ffmpeg".to_string(),
        global_args: vec!["-hide_banner".to_string()],
        overwrite: false,
        ..EncoderSettings::default()
    };
    let job = StillEncodeJob {
        frame_path: PathBuf::from("f.png"),
        out_path: PathBuf::from("o.mp4"),
        duration_secs: 3,
    };
    let args = args_of(&FfmpegStillEncoder::new(settings).command(&job));
    assert_eq!(args.first().map(String::as_str), Some("-hide_banner"));
    assert!(args.contains(&"-n".to_string()));
    assert!(!args.contains(&"-y".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("o.mp4"));
}

#[test]
fn job_validation_catches_bad_values() {
    let mut job = StillEncodeJob {
        frame_path: PathBuf::from("a.png"),
        out_path: PathBuf::from("a.mp4"),
        duration_secs: 0,
    };
    assert!(job.validate().is_err());

    job.duration_secs = 10;
    assert!(job.validate().is_ok());

    job.out_path = job.frame_path.clone();
    assert!(job.validate().is_err());
}

#[test]
fn settings_deserialize_with_defaults() {
    let s: EncoderSettings = serde_json::from_str(r#"{"program": "avconv"}"#).unwrap();
    assert_eq!(s.program, "avconv");
    assert_eq!(s.video_codec, "libx264");
    assert_eq!(s.pixel_format, "yuv420p");
    assert!(s.overwrite);
    assert_eq!(s.frame_cleanup, FrameCleanup::OnSuccess);

    let s: EncoderSettings = serde_json::from_str(r#"{"frame_cleanup": "always"}"#).unwrap();
    assert_eq!(s.frame_cleanup, FrameCleanup::Always);
}

#[test]
fn missing_program_is_an_encoding_failure() {
    let dir = scratch_dir("missing_program");
    let job = job_in(&dir);
    let encoder = FfmpegStillEncoder::new(EncoderSettings {
        program: "stillcut-no-such-encoder".to_string(),
        ..EncoderSettings::default()
    });

    let err = encoder.encode(&job).unwrap_err();
    assert!(matches!(err, StillcutError::EncodingFailed(_)));
    assert!(err.to_string().contains("stillcut-no-such-encoder"));
    assert!(job.frame_path.exists(), "frame kept after failed encode");
    assert!(!encoder.is_available());
}

#[cfg(unix)]
#[test]
fn successful_encode_removes_frame() {
    let dir = scratch_dir("success");
    let job = job_in(&dir);
    let encoder = FfmpegStillEncoder::new(fake_encoder(&dir, "printf 'fake-mp4' > \"$last\""));

    let video = encoder.encode(&job).unwrap();
    assert_eq!(video.path, job.out_path);
    assert_eq!(video.size_bytes().unwrap(), 8);
    assert!(!job.frame_path.exists());
}

#[cfg(unix)]
#[test]
fn nonzero_exit_carries_stderr_and_keeps_frame() {
    let dir = scratch_dir("nonzero");
    let job = job_in(&dir);
    let encoder = FfmpegStillEncoder::new(fake_encoder(
        &dir,
        "echo 'Unknown encoder libx264' >&2\nexit 3",
    ));

    let err = encoder.encode(&job).unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, StillcutError::EncodingFailed(_)));
    assert!(msg.contains("Unknown encoder libx264"), "{msg}");
    assert!(job.frame_path.exists());
    assert!(!job.out_path.exists());
}

#[cfg(unix)]
#[test]
fn zero_exit_without_output_is_a_failure() {
    let dir = scratch_dir("no_output");
    let job = job_in(&dir);
    let encoder = FfmpegStillEncoder::new(fake_encoder(&dir, "exit 0"));

    let err = encoder.encode(&job).unwrap_err();
    assert!(matches!(err, StillcutError::EncodingFailed(_)));
    assert!(err.to_string().contains("was not created"));
}

#[cfg(unix)]
#[test]
fn cleanup_policy_always_and_never() {
    let dir = scratch_dir("cleanup_always");
    let job = job_in(&dir);
    let mut settings = fake_encoder(&dir, "exit 1");
    settings.frame_cleanup = FrameCleanup::Always;
    assert!(FfmpegStillEncoder::new(settings).encode(&job).is_err());
    assert!(!job.frame_path.exists());

    let dir = scratch_dir("cleanup_never");
    let job = job_in(&dir);
    let mut settings = fake_encoder(&dir, "printf 'x' > \"$last\"");
    settings.frame_cleanup = FrameCleanup::Never;
    assert!(FfmpegStillEncoder::new(settings).encode(&job).is_ok());
    assert!(job.frame_path.exists());
}

#[test]
fn existing_output_is_refused_without_overwrite() {
    let dir = scratch_dir("refuse");
    let job = job_in(&dir);
    std::fs::write(&job.out_path, b"old").unwrap();
    let encoder = FfmpegStillEncoder::new(EncoderSettings {
        overwrite: false,
        ..EncoderSettings::default()
    });

    assert!(matches!(
        encoder.encode(&job),
        Err(StillcutError::Validation(_))
    ));
    assert_eq!(std::fs::read(&job.out_path).unwrap(), b"old");
}

#[test]
fn real_ffmpeg_encodes_png_when_available() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let dir = scratch_dir("real_ffmpeg");
    let frame_path = dir.join("frame.png");
    image::save_buffer_with_format(
        &frame_path,
        &[30u8, 30, 30, 255].repeat(64 * 64),
        64,
        64,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .unwrap();
    let job = StillEncodeJob {
        frame_path,
        out_path: dir.join("out.mp4"),
        duration_secs: 1,
    };

    let video = FfmpegStillEncoder::default().encode(&job).unwrap();
    assert!(video.size_bytes().unwrap() > 0);
    assert!(!job.frame_path.exists());
}
