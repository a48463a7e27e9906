//! CLI binary for manual-simplifier.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SimplifyConfig`, drives one `UploadWorkflow` attempt and prints the
//! rendered guide.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use manual_simplifier::{
    write_guide, ErrorKind, GuidePage, OutputFormat, Provider, SimplifyConfig, SubmitOutcome,
    UploadSessionState, UploadWorkflow,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Spinner driven by workflow state ─────────────────────────────────────────

/// Mirror the workflow's status label on a spinner until the attempt ends.
fn spawn_spinner(mut rx: watch::Receiver<UploadSessionState>) -> JoinHandle<()> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Simplifying");
    bar.set_message("Waiting…");
    bar.enable_steady_tick(Duration::from_millis(80));

    tokio::spawn(async move {
        loop {
            let (status, label) = {
                let s = rx.borrow_and_update();
                (s.status, s.status_label())
            };
            if status.is_terminal() {
                break;
            }
            if let Some(label) = label {
                bar.set_message(label);
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
        bar.finish_and_clear();
    })
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Print a Markdown guide to stdout
  simplify router-manual.pdf

  # Terminal-friendly layout
  simplify --format text router-manual.pdf

  # Write the raw JSON guide to a file
  simplify --format json router-manual.pdf -o router-guide.json

  # Use Gemini instead of Claude
  simplify --provider gemini blender.pdf

SUPPORTED PROVIDERS:
  Provider     Default model               Key variable
  ─────────    ──────────────────────────  ─────────────────
  anthropic    claude-sonnet-4-20250514    ANTHROPIC_API_KEY
  gemini       gemini-2.0-flash            GEMINI_API_KEY

ENVIRONMENT VARIABLES:
  SIMPLIFY_API_KEY        API key (overrides the provider variable above)
  SIMPLIFY_PROVIDER       Provider (anthropic, gemini)
  SIMPLIFY_MODEL          Model ID
  SIMPLIFY_ENDPOINT       Base URL override, e.g. a local proxy
  RUST_LOG                Log filter (overrides -v / -q)

Press Ctrl-C while a manual is processing to cancel the upload.
"#;

/// Turn product manuals (PDF) into beginner-friendly setup guides.
#[derive(Parser, Debug)]
#[command(
    name = "simplify",
    version,
    about = "Turn product manuals (PDF) into beginner-friendly setup guides",
    long_about = "Send a product manual (PDF) to a document-understanding language model and \
print a short setup guide: numbered steps, warnings, common mistakes and a final checklist. \
Supports Anthropic Claude and Google Gemini.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Manual to simplify (must be a .pdf).
    input: PathBuf,

    /// Write the guide to this file instead of stdout.
    #[arg(short, long, env = "SIMPLIFY_OUTPUT")]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, env = "SIMPLIFY_FORMAT", value_enum, default_value = "markdown")]
    format: FormatArg,

    /// API key for the provider.
    #[arg(
        long,
        env = "SIMPLIFY_API_KEY",
        hide_env_values = true,
        long_help = "API key for the provider. Falls back to ANTHROPIC_API_KEY or \
          GEMINI_API_KEY depending on --provider. Never logged."
    )]
    api_key: Option<String>,

    /// Provider: anthropic, gemini.
    #[arg(long, env = "SIMPLIFY_PROVIDER", default_value = "anthropic")]
    provider: String,

    /// Model ID (e.g. claude-sonnet-4-20250514, gemini-2.0-flash).
    #[arg(long, env = "SIMPLIFY_MODEL")]
    model: Option<String>,

    /// Base URL override for the provider API.
    #[arg(long, env = "SIMPLIFY_ENDPOINT")]
    endpoint: Option<String>,

    /// Path to a text file replacing the built-in guide instruction.
    #[arg(long, env = "SIMPLIFY_INSTRUCTION")]
    instruction: Option<PathBuf>,

    /// Max output tokens.
    #[arg(long, env = "SIMPLIFY_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Sampling temperature (0.0–1.0).
    #[arg(long, env = "SIMPLIFY_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Request timeout in seconds.
    #[arg(long, env = "SIMPLIFY_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Disable the progress spinner.
    #[arg(long, env = "SIMPLIFY_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SIMPLIFY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the guide itself.
    #[arg(short, long, env = "SIMPLIFY_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Markdown,
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already shows what the workflow is doing; keep library
    // INFO logs out of its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli).await?;
    let credential = resolve_credential(&cli, config.provider);
    let format = OutputFormat::from(cli.format);

    // ── Run one attempt ──────────────────────────────────────────────────
    let workflow = UploadWorkflow::new(config);
    let spinner = show_progress.then(|| spawn_spinner(workflow.subscribe()));
    let started = Instant::now();

    let mut page = GuidePage::new();
    let outcome = {
        let submit = workflow.submit(cli.input.clone(), &credential, |g| page.show(g));
        tokio::pin!(submit);
        loop {
            tokio::select! {
                outcome = &mut submit => break outcome,
                _ = tokio::signal::ctrl_c() => {
                    workflow.cancel();
                }
            }
        }
    };

    if let Some(handle) = spinner {
        handle.await.ok();
    }

    match outcome {
        SubmitOutcome::Done => {}
        SubmitOutcome::Failed { kind, message } => {
            if !cli.quiet && kind == ErrorKind::InputRejected {
                eprintln!("{}", dim("Run `simplify --help` for usage."));
            }
            eprintln!("{} {}", red("✘"), message);
            std::process::exit(if kind == ErrorKind::Cancelled { 130 } else { 1 });
        }
        SubmitOutcome::Busy => anyhow::bail!("Another upload is already in progress"),
    }

    let guide = page.guide().context("Workflow finished without a guide")?;

    // ── Output ───────────────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        write_guide(guide, output_path, format)
            .await
            .context("Failed to write guide")?;
    } else {
        let rendered = page.render(format);
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
        handle.flush().ok();
    }

    if !cli.quiet {
        eprintln!(
            "{}  {} steps  {} warnings  {} mistakes  {} checks  {}",
            green("✔"),
            bold(&guide.steps().len().to_string()),
            guide.warnings().len(),
            guide.common_mistakes().len(),
            guide.final_checklist().len(),
            dim(&format!("{:.1}s", started.elapsed().as_secs_f64())),
        );
        if let Some(ref output_path) = cli.output {
            eprintln!("   →  {}", bold(&output_path.display().to_string()));
        }
    }

    Ok(())
}

/// Map CLI args to `SimplifyConfig`.
async fn build_config(cli: &Cli) -> Result<SimplifyConfig> {
    let provider: Provider = cli.provider.parse().context("Invalid --provider")?;

    let mut builder = SimplifyConfig::builder()
        .provider(provider)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref endpoint) = cli.endpoint {
        builder = builder.endpoint(endpoint.clone());
    }
    if let Some(ref path) = cli.instruction {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read instruction from {:?}", path))?;
        builder = builder.instruction(text);
    }

    builder.build().context("Invalid configuration")
}

/// `--api-key` / `SIMPLIFY_API_KEY`, else the provider's own variable.
///
/// An empty result is passed through; the workflow reports it.
fn resolve_credential(cli: &Cli, provider: Provider) -> String {
    if let Some(ref key) = cli.api_key {
        return key.clone();
    }
    let var = match provider {
        Provider::Anthropic => "ANTHROPIC_API_KEY",
        Provider::Gemini => "GEMINI_API_KEY",
    };
    std::env::var(var).unwrap_or_default()
}
