//! Guide rendering: a pure function from "maybe a guide" to text.
//!
//! Rendering never mutates the guide and never reorders it. Step labels are
//! printed exactly as the service numbered them. An empty warnings, mistakes
//! or checklist list produces no section at all, not an empty heading. No
//! guide produces an empty string.

use crate::error::SimplifyError;
use crate::guide::GuideData;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;
use tracing::info;

/// Output format for a rendered guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// GitHub-flavoured Markdown. (default)
    #[default]
    Markdown,
    /// Plain text laid out for a terminal.
    Text,
    /// The raw JSON guide, pretty-printed with wire field names.
    Json,
}

/// Render a guide, or nothing.
pub fn render(guide: Option<&GuideData>, format: OutputFormat) -> String {
    let Some(guide) = guide else {
        return String::new();
    };
    match format {
        OutputFormat::Markdown => render_markdown(guide),
        OutputFormat::Text => render_text(guide),
        OutputFormat::Json => format!("{}\n", guide.to_json_pretty()),
    }
}

fn render_markdown(guide: &GuideData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", guide.title());
    if !guide.estimated_time().trim().is_empty() {
        let _ = writeln!(out, "**Estimated time:** {}\n", guide.estimated_time());
    }

    // Bullets with a bold label, not an ordered list: Markdown viewers
    // renumber ordered lists, and the service's labels must show as given.
    out.push_str("## Steps\n\n");
    for s in guide.steps() {
        let _ = writeln!(out, "- **{}.** {}", s.step, s.instruction);
    }

    markdown_list(&mut out, "Warnings", guide.warnings(), "- ");
    markdown_list(&mut out, "Common Mistakes", guide.common_mistakes(), "- ");
    markdown_list(&mut out, "Final Checklist", guide.final_checklist(), "- [ ] ");
    out
}

fn markdown_list(out: &mut String, heading: &str, items: &[String], bullet: &str) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n## {heading}\n");
    for item in items {
        let _ = writeln!(out, "{bullet}{item}");
    }
}

fn render_text(guide: &GuideData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", guide.title());
    if !guide.estimated_time().trim().is_empty() {
        let _ = writeln!(out, "Estimated time: {}", guide.estimated_time());
    }

    let width = guide
        .steps()
        .iter()
        .map(|s| s.step.to_string().len())
        .max()
        .unwrap_or(1);
    out.push_str("\nSTEPS\n");
    for s in guide.steps() {
        let _ = writeln!(out, "  {:>width$}  {}", s.step, s.instruction);
    }

    text_list(&mut out, "WARNINGS", guide.warnings(), "•");
    text_list(&mut out, "COMMON MISTAKES", guide.common_mistakes(), "•");
    text_list(&mut out, "FINAL CHECKLIST", guide.final_checklist(), "[ ]");
    out
}

fn text_list(out: &mut String, heading: &str, items: &[String], bullet: &str) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{heading}");
    for item in items {
        let _ = writeln!(out, "  {bullet} {item}");
    }
}

/// Render a guide and write it to `path`.
///
/// The text goes to a temp file in the target directory which is then
/// renamed over `path`, so readers never see a partial guide.
pub async fn write_guide(
    guide: &GuideData,
    path: impl AsRef<Path>,
    format: OutputFormat,
) -> Result<(), SimplifyError> {
    let path = path.as_ref().to_path_buf();
    let content = render(Some(guide), format);
    let target = path.clone();
    tokio::task::spawn_blocking(move || persist(&target, content.as_bytes()))
        .await
        .map_err(|e| SimplifyError::Internal(format!("write task failed: {e}")))??;

    info!("Wrote guide to {}", path.display());
    Ok(())
}

fn persist(path: &Path, bytes: &[u8]) -> Result<(), SimplifyError> {
    let output_err = |source: std::io::Error| SimplifyError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    std::fs::create_dir_all(parent).map_err(output_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(output_err)?;
    tmp.write_all(bytes).map_err(output_err)?;
    tmp.persist(path).map_err(|e| output_err(e.error))?;
    Ok(())
}
