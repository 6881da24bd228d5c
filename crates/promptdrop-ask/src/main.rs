//! promptdrop-ask: ask a generative model about files on disk.
//!
//! Runs the same upload controller as the web widget, natively: files are
//! filtered by the configured constraints, admitted (extra files beyond
//! the cap are dropped), pushed through the simulated upload progress,
//! and the first one is sent to the model together with the prompt.
//!
//! # Usage
//!
//! ```text
//! cargo run --bin promptdrop-ask -- [OPTIONS] --prompt <TEXT> <FILES>...
//! ```
//!
//! The API key comes from `--api-key` or `GEMINI_API_KEY` (a `.env` file
//! in the working directory is honored). Set `RUST_LOG=debug` for
//! request details.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use promptdrop_core::{
    Constraints, Controller, Effect, Event, FileHandle, FileId, MIB, PROGRESS_TICK, SubmitConfig,
    SubmitError, SubmitRequest, mime_for_name, preview,
};
use promptdrop_gemini::{GeminiClient, GeminiConfig};
use tracing_subscriber::EnvFilter;

/// Ask a generative model about local files.
///
/// Files go through the same admission and progress simulation as the
/// web widget before the first one is submitted with the prompt.
#[derive(Parser)]
#[command(name = "promptdrop-ask", version)]
struct Cli {
    /// Files to upload. Only the first admitted file is sent.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Prompt sent with the file.
    #[arg(long, short)]
    prompt: String,

    /// Maximum number of files admitted.
    #[arg(long, default_value_t = Constraints::DEFAULT_MAX_FILES)]
    max_files: usize,

    /// Maximum file size in MB.
    #[arg(long, default_value_t = Constraints::DEFAULT_MAX_SIZE_BYTES / MIB)]
    max_size_mb: u64,

    /// Full constraints as a JSON string.
    ///
    /// When provided, `--max-files` and `--max-size-mb` are ignored.
    #[arg(long)]
    constraints_json: Option<String>,

    /// Model name.
    #[arg(long, default_value = GeminiConfig::DEFAULT_MODEL)]
    model: String,

    /// API key (falls back to GEMINI_API_KEY).
    #[arg(long)]
    api_key: Option<String>,

    /// Seconds to wait for the model before giving up.
    #[arg(long, default_value_t = SubmitConfig::DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Run the progress simulation without sleeping between ticks.
    #[arg(long)]
    fast: bool,

    /// Print the final session as JSON instead of the bare answer.
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let constraints = constraints_from_cli(&cli)?;
    let client = client_from_cli(&cli)?;
    let submit = SubmitConfig {
        timeout: Duration::from_secs(cli.timeout_secs),
    };

    let batch = load_files(&cli.files, &constraints);
    if batch.is_empty() {
        bail!("no file passed the type and size checks");
    }

    let mut controller = Controller::with_submit_config(constraints, submit);
    controller.set_prompt(cli.prompt.clone());
    let effects = controller.dispatch(Event::AddFiles(batch));
    simulate_upload(&mut controller, effects, cli.fast).await;

    let Some(request) = controller.submit() else {
        bail!("nothing to submit");
    };
    eprintln!(
        "Asking {} about {} ({})",
        client.model(),
        request.file.name(),
        request.file.mime()
    );
    let epoch = request.epoch;
    let outcome = generate(&client, &request).await;
    controller.dispatch(Event::SubmissionSettled { epoch, outcome });

    let session = controller.session();
    if cli.json {
        let view = session.view(controller.constraints());
        let json = serde_json::to_string_pretty(&view).context("serializing session")?;
        println!("{json}");
    } else if let Some(text) = &session.result {
        println!("{text}");
    }

    if let Some(err) = &session.last_error {
        bail!("submission failed: {err}");
    }
    Ok(())
}

/// Build constraints from `--constraints-json` or the individual flags.
fn constraints_from_cli(cli: &Cli) -> anyhow::Result<Constraints> {
    if let Some(json) = &cli.constraints_json {
        return serde_json::from_str(json).context("invalid --constraints-json");
    }
    Ok(Constraints {
        max_files: cli.max_files,
        max_size_bytes: cli.max_size_mb.saturating_mul(MIB),
        ..Constraints::default()
    })
}

/// Resolve the API key: flag, then environment.
fn client_from_cli(cli: &Cli) -> anyhow::Result<GeminiClient> {
    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .unwrap_or_default();
    let config = GeminiConfig {
        model: cli.model.clone(),
        ..GeminiConfig::with_api_key(api_key)
    };
    GeminiClient::new(config).context("set GEMINI_API_KEY or pass --api-key")
}

/// Read every path, skipping unreadable files and files the constraints
/// reject.
fn load_files(paths: &[PathBuf], constraints: &Constraints) -> Vec<FileHandle> {
    paths
        .iter()
        .filter_map(|path| match load_file(path) {
            Ok(file) => match constraints.check(&file) {
                Ok(()) => Some(file),
                Err(rejection) => {
                    log::warn!("skipping {}: {rejection}", path.display());
                    None
                }
            },
            Err(e) => {
                log::warn!("skipping {}: {e:#}", path.display());
                None
            }
        })
        .collect()
}

fn load_file(path: &Path) -> anyhow::Result<FileHandle> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let mime = mime_for_name(&name);
    Ok(FileHandle::new(name, mime, bytes))
}

/// Execute admission effects and tick every file to completion.
///
/// Previews are encoded inline. With `fast`, ticks run back to back.
async fn simulate_upload(controller: &mut Controller, effects: Vec<Effect>, fast: bool) {
    let mut running: BTreeSet<FileId> = BTreeSet::new();
    for effect in effects {
        match effect {
            Effect::StartProgress { id } => {
                running.insert(id);
            }
            Effect::DecodePreview { epoch, id, file } => {
                let url = match preview::data_url(&file) {
                    Ok(url) => Some(url),
                    Err(e) => {
                        log::warn!("no preview for {}: {e}", file.name());
                        None
                    }
                };
                controller.dispatch(Event::PreviewDecoded {
                    epoch,
                    id,
                    preview: url,
                });
            }
            Effect::FilesDropped { count } => {
                log::info!("dropped {count} file(s) over the limit");
            }
            _ => {}
        }
    }

    while !running.is_empty() {
        if !fast {
            tokio::time::sleep(PROGRESS_TICK).await;
        }
        for id in running.clone() {
            for effect in controller.dispatch(Event::ProgressTick(id)) {
                if let Effect::ProgressFinished { id } | Effect::CancelProgress { id } = effect {
                    running.remove(&id);
                    if let Some(file) = controller.session().file(id) {
                        log::info!("uploaded {}", file.file.name());
                    }
                }
            }
        }
    }
}

/// Perform the model call under the request's timeout.
async fn generate(client: &GeminiClient, request: &SubmitRequest) -> Result<String, SubmitError> {
    let call = client.generate(&request.prompt, request.file.mime(), request.file.content());
    match tokio::time::timeout(request.timeout, call).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => {
            log::error!("generation failed: {e}");
            Err(SubmitError::Rejected(e.to_string()))
        }
        Err(_) => {
            log::error!("generation timed out after {}s", request.timeout.as_secs());
            Err(SubmitError::TimedOut(request.timeout))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("promptdrop-ask").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_build_constraints() {
        let cli = parse(&["--prompt", "hi", "--max-files", "3", "--max-size-mb", "2", "a.png"]);
        let constraints = constraints_from_cli(&cli).unwrap();
        assert_eq!(constraints.max_files, 3);
        assert_eq!(constraints.max_size_bytes, 2 * MIB);
        assert_eq!(constraints.accepted_types, Constraints::default().accepted_types);
    }

    #[test]
    fn constraints_json_overrides_flags() {
        let cli = parse(&[
            "--prompt",
            "hi",
            "--max-files",
            "3",
            "--constraints-json",
            r#"{"max_files": 2, "disabled": true}"#,
            "a.png",
        ]);
        let constraints = constraints_from_cli(&cli).unwrap();
        assert_eq!(constraints.max_files, 2);
        assert!(constraints.disabled);
        assert_eq!(constraints.max_size_bytes, Constraints::DEFAULT_MAX_SIZE_BYTES);
    }

    #[test]
    fn prompt_and_file_are_required() {
        assert!(Cli::try_parse_from(["promptdrop-ask", "a.png"]).is_err());
        assert!(Cli::try_parse_from(["promptdrop-ask", "--prompt", "hi"]).is_err());
    }

    #[test]
    fn missing_files_are_skipped() {
        let files = load_files(&[PathBuf::from("/nonexistent/promptdrop.png")], &Constraints::default());
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn fast_simulation_completes_every_admitted_file() {
        let constraints = Constraints {
            max_files: 2,
            ..Constraints::default()
        };
        let mut controller = Controller::new(constraints);
        let effects = controller.dispatch(Event::AddFiles(vec![
            FileHandle::new("a.png", "image/png", vec![1_u8; 8]),
            FileHandle::new("b.pdf", "application/pdf", vec![2_u8; 8]),
            FileHandle::new("c.pdf", "application/pdf", vec![3_u8; 8]),
        ]));

        simulate_upload(&mut controller, effects, true).await;

        let session = controller.session();
        assert_eq!(session.files.len(), 2);
        assert!(session.files.iter().all(|f| f.progress == 100 && f.succeeded));
        assert!(session.files[0].preview.url().unwrap().starts_with("data:image/png;base64,"));
        assert!(controller.can_submit());
    }
}
