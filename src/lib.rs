//! # manual-simplifier
//!
//! Turn a product manual (PDF) into a short, beginner-friendly setup guide
//! using a document-understanding language model.
//!
//! ## Why this crate?
//!
//! Product manuals bury the ten things a first-time owner needs among a
//! hundred pages of specifications and legal text. This crate sends the
//! whole PDF to a model that can read documents, asks for a fixed JSON
//! shape (title, time estimate, numbered steps, warnings, common mistakes,
//! final checklist), validates the answer, and renders it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    accept .pdf + credential, read bytes
//!  ├─ 2. Encode   bytes → base64 document block
//!  ├─ 3. Request  one POST to Anthropic Messages / Gemini generateContent
//!  ├─ 4. Decode   locate text part, strip fences, all-or-nothing JSON decode
//!  └─ 5. Render   Markdown / terminal text / JSON
//! ```
//!
//! The [`UploadWorkflow`] drives steps 1–4 as a state machine
//! (`idle → uploading → processing → done | error`) and hands the decoded
//! [`GuideData`] to a callback; a [`GuidePage`] keeps the latest one for
//! rendering.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use manual_simplifier::{GuidePage, OutputFormat, SimplifyConfig, SubmitOutcome, UploadWorkflow};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let workflow = UploadWorkflow::new(SimplifyConfig::default());
//!     let key = std::env::var("ANTHROPIC_API_KEY")?;
//!
//!     let mut page = GuidePage::new();
//!     match workflow.submit("router-manual.pdf", &key, |g| page.show(g)).await {
//!         SubmitOutcome::Done => println!("{}", page.render(OutputFormat::Markdown)),
//!         SubmitOutcome::Failed { message, .. } => eprintln!("{message}"),
//!         SubmitOutcome::Busy => unreachable!("single caller"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `simplify` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! manual-simplifier = { version = "0.1", default-features = false }
//! ```
//!
//! ## Choosing a Provider
//!
//! | Provider | Default model | Credential env var |
//! |----------|---------------|--------------------|
//! | `anthropic` | `claude-sonnet-4-20250514` | `ANTHROPIC_API_KEY` |
//! | `gemini`    | `gemini-2.0-flash`         | `GEMINI_API_KEY` |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod guide;
pub mod page;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod render;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Provider, SimplifyConfig, SimplifyConfigBuilder};
pub use error::{ErrorKind, SimplifyError};
pub use guide::{GuideData, GuideStep};
pub use page::GuidePage;
pub use pipeline::input::SelectedFile;
pub use pipeline::llm::{HttpTransport, ServiceRequest, ServiceResponse, Transport};
pub use render::{render, write_guide, OutputFormat};
pub use workflow::{Credential, Status, SubmitOutcome, UploadSessionState, UploadWorkflow};
