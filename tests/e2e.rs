//! End-to-end tests against the real guide services.
//!
//! These tests send real manuals from `./test_cases/` to a live provider.
//! They are gated behind the `E2E_ENABLED` environment variable so they do
//! not run in CI unless explicitly requested, and each one also needs the
//! provider's API key.
//!
//! Run with:
//!   E2E_ENABLED=1 ANTHROPIC_API_KEY=sk-ant-... cargo test --test e2e -- --nocapture
//!
//! To restrict to one provider:
//!   E2E_ENABLED=1 GEMINI_API_KEY=... cargo test --test e2e gemini -- --nocapture

use manual_simplifier::{
    write_guide, ErrorKind, GuideData, GuidePage, OutputFormat, Provider, SelectedFile,
    SimplifyConfig, Status, SubmitOutcome, UploadWorkflow,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip unless E2E_ENABLED is set, the key variable is set and the manual exists.
macro_rules! e2e_skip_unless_ready {
    ($path:expr, $key_var:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let key = match std::env::var($key_var) {
            Ok(k) if !k.trim().is_empty() => k,
            _ => {
                println!("SKIP: {} is not set", $key_var);
                return;
            }
        };
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            return;
        }
        (p, key)
    }};
}

/// Assert the guide looks like something a beginner could follow.
fn assert_guide_quality(guide: &GuideData, context: &str) {
    assert!(!guide.title().trim().is_empty(), "[{context}] empty title");
    assert!(
        !guide.steps().is_empty(),
        "[{context}] guide has no steps"
    );
    assert!(
        guide.steps().len() <= 30,
        "[{context}] {} steps is not a short guide",
        guide.steps().len()
    );
    for s in guide.steps() {
        assert!(
            s.instruction.len() < 600,
            "[{context}] step {} reads like a paragraph",
            s.step
        );
    }
    assert!(
        !guide.final_checklist().is_empty(),
        "[{context}] no final checklist"
    );

    println!(
        "[{context}] ✓  {} steps, {} warnings, {} mistakes, {} checks",
        guide.steps().len(),
        guide.warnings().len(),
        guide.common_mistakes().len(),
        guide.final_checklist().len()
    );
}

async fn run(provider: Provider, path: PathBuf, key: &str) -> (SubmitOutcome, GuidePage) {
    let config = SimplifyConfig::builder()
        .provider(provider)
        .build()
        .expect("valid config");
    let workflow = UploadWorkflow::new(config);
    let mut page = GuidePage::new();
    let outcome = workflow.submit(path, key, |g| page.show(g)).await;
    (outcome, page)
}

// ── Live provider tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_anthropic_router_manual() {
    let (path, key) =
        e2e_skip_unless_ready!(test_cases_dir().join("router-manual.pdf"), "ANTHROPIC_API_KEY");

    let (outcome, page) = run(Provider::Anthropic, path, &key).await;

    assert_eq!(outcome, SubmitOutcome::Done, "anthropic attempt failed");
    let guide = page.guide().expect("guide delivered");
    assert_guide_quality(guide, "anthropic");
    println!("{}", page.render(OutputFormat::Text));
}

#[tokio::test]
async fn test_gemini_router_manual() {
    let (path, key) =
        e2e_skip_unless_ready!(test_cases_dir().join("router-manual.pdf"), "GEMINI_API_KEY");

    let (outcome, page) = run(Provider::Gemini, path, &key).await;

    assert_eq!(outcome, SubmitOutcome::Done, "gemini attempt failed");
    assert_guide_quality(page.guide().expect("guide delivered"), "gemini");
}

#[tokio::test]
async fn test_anthropic_rejects_bad_key() {
    let (path, _key) =
        e2e_skip_unless_ready!(test_cases_dir().join("router-manual.pdf"), "ANTHROPIC_API_KEY");

    let (outcome, page) = run(Provider::Anthropic, path, "sk-ant-not-a-real-key").await;

    let SubmitOutcome::Failed { kind, message } = outcome else {
        panic!("a bad key must not produce a guide");
    };
    assert_eq!(kind, ErrorKind::TransportFailure);
    assert!(!message.is_empty());
    assert!(page.guide().is_none());
    println!("bad key → {message}");
}

#[tokio::test]
async fn test_write_markdown_guide() {
    let (path, key) =
        e2e_skip_unless_ready!(test_cases_dir().join("router-manual.pdf"), "ANTHROPIC_API_KEY");

    let bytes = std::fs::read(&path).expect("read manual");
    let workflow = UploadWorkflow::new(SimplifyConfig::default());
    let mut page = GuidePage::new();
    let outcome = workflow
        .submit(
            SelectedFile::from_bytes("router-manual.pdf", bytes),
            &key,
            |g| page.show(g),
        )
        .await;
    assert_eq!(outcome, SubmitOutcome::Done);
    assert_eq!(workflow.status(), Status::Done);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("router-guide.md");
    write_guide(page.guide().unwrap(), &out, OutputFormat::Markdown)
        .await
        .expect("write guide");
    let md = std::fs::read_to_string(&out).unwrap();
    assert!(md.starts_with("# "));
    assert!(md.contains("## Steps"));
}
