use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "stillcut",
    version,
    about = "Render a narration script into a vertical MP4 and report the result as JSON."
)]
struct Cli {
    /// JSON configuration file.
    config_path: PathBuf,

    /// Script text drawn on the frame.
    #[arg(required_unless_present = "check_deps")]
    script_text: Option<String>,

    /// Identifier naming the output directory and files.
    #[arg(required_unless_present = "check_deps")]
    video_id: Option<String>,

    /// Report encoder and font availability instead of rendering.
    #[arg(long)]
    check_deps: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                e.exit();
            }
            print_json(&serde_json::json!({
                "status": "error",
                "error": e.to_string().trim(),
            }));
            return ExitCode::FAILURE;
        }
    };

    init_logging();

    let config = match stillcut::RenderConfig::from_path(&cli.config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            let mut out = serde_json::json!({
                "status": "error",
                "error": format!("critical error: {e}"),
                "traceback": format!("{e:?}"),
            });
            if let Some(id) = &cli.video_id {
                out["video_id"] = serde_json::Value::from(id.as_str());
            }
            print_json(&out);
            return ExitCode::FAILURE;
        }
    };

    if cli.check_deps {
        let report = stillcut::check_dependencies(&config);
        print_json(&report);
        return ExitCode::SUCCESS;
    }

    let (Some(script_text), Some(video_id)) = (cli.script_text, cli.video_id) else {
        print_json(&serde_json::json!({
            "status": "error",
            "error": "script_text and video_id are required",
        }));
        return ExitCode::FAILURE;
    };

    let request = stillcut::RenderRequest::new(script_text, video_id);
    let result = stillcut::Pipeline::new(config).run(&request);
    print_json(&result);
    ExitCode::SUCCESS
}

/// Logs go to stderr; stdout carries only the JSON result.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => println!(r#"{{"status": "error", "error": "failed to serialize result: {e}"}}"#),
    }
}
