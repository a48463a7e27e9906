//! Post-processing: turn a raw service response into a [`GuideData`].
//!
//! Three deterministic passes, in order:
//!
//! 1. **Locate** the text-bearing part of the provider's response envelope
//! 2. **Strip** a fenced-code wrapper (` ```json … ``` `) the model may add
//!    despite being told not to
//! 3. **Decode** the remaining text as a guide, all-or-nothing
//!
//! Passes 1 and 3 fail with a [`SimplifyError`] of kind
//! [`crate::error::ErrorKind::ResponseShapeInvalid`]; pass 2 never fails.

use crate::config::Provider;
use crate::error::SimplifyError;
use crate::guide::GuideData;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, error};

// ── Pass 1: Locate the text part ─────────────────────────────────────────────

/// Find the first text part in a provider response.
///
/// * Anthropic: `{"content": [{"type": "text", "text": "..."}, ...]}`
/// * Gemini: `{"candidates": [{"content": {"parts": [{"text": "..."}]}}]}`
pub fn extract_text(provider: Provider, body: &str) -> Result<String, SimplifyError> {
    let envelope: Value = serde_json::from_str(body).map_err(|e| {
        let err = SimplifyError::MissingText {
            detail: format!("response body is not JSON: {e}"),
        };
        error!("{}: {}", err, e);
        err
    })?;

    let text = match provider {
        Provider::Anthropic => envelope
            .get("content")
            .and_then(Value::as_array)
            .and_then(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                    .find_map(|b| b.get("text").and_then(Value::as_str))
            }),
        Provider::Gemini => envelope
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .and_then(|c| c.pointer("/content/parts"))
            .and_then(Value::as_array)
            .and_then(|parts| parts.iter().find_map(|p| p.get("text").and_then(Value::as_str))),
    };

    match text {
        Some(t) if !t.trim().is_empty() => {
            debug!("Located {} chars of text in {} response", t.len(), provider);
            Ok(t.to_string())
        }
        _ => {
            let err = SimplifyError::MissingText {
                detail: format!("no text part in {provider} response"),
            };
            error!("{}", err);
            Err(err)
        }
    }
}

// ── Pass 2: Strip fenced-code markers ────────────────────────────────────────

static RE_OPEN_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_-]*[ \t]*\r?\n?").unwrap());

static RE_CLOSE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n?```$").unwrap());

/// Remove a leading and/or trailing fence marker around the payload.
///
/// Markers are removed independently, so a response truncated after the
/// opening fence still has it stripped.
pub fn strip_code_fences(input: &str) -> String {
    let s = input.trim();
    let s = RE_OPEN_FENCE.replace(s, "");
    let s = RE_CLOSE_FENCE.replace(s.trim_end(), "");
    s.trim().to_string()
}

// ── Pass 3: Decode ───────────────────────────────────────────────────────────

/// Strip fences and decode the guide.
pub fn decode_guide(text: &str) -> Result<GuideData, SimplifyError> {
    let cleaned = strip_code_fences(text);
    GuideData::from_json(&cleaned).inspect_err(|e| {
        let preview: String = cleaned.chars().take(500).collect();
        error!("{e:?}. Text (first 500 chars): {preview}");
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const GUIDE: &str = r#"{"title":"T","estimated_time":"1 minute","steps":[{"step":1,"instruction":"Go."}],"warnings":["w"],"common_mistakes":[],"final_checklist":["c"]}"#;

    #[test]
    fn test_strip_json_fences() {
        let input = format!("```json\n{GUIDE}\n```");
        assert_eq!(strip_code_fences(&input), GUIDE);
    }

    #[test]
    fn test_strip_fences_no_lang() {
        let input = format!("```\n{GUIDE}\n```\n");
        assert_eq!(strip_code_fences(&input), GUIDE);
    }

    #[test]
    fn test_strip_fences_crlf_and_padding() {
        let input = format!("  ```json\r\n{GUIDE}\r\n```  ");
        assert_eq!(strip_code_fences(&input), GUIDE);
    }

    #[test]
    fn test_strip_leading_fence_only() {
        let input = format!("```json\n{GUIDE}");
        assert_eq!(strip_code_fences(&input), GUIDE);
    }

    #[test]
    fn test_no_fences_passthrough() {
        assert_eq!(strip_code_fences(GUIDE), GUIDE);
    }

    #[test]
    fn test_extract_anthropic_text_skips_other_blocks() {
        let body = serde_json::json!({
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": GUIDE}
            ]
        })
        .to_string();
        assert_eq!(extract_text(Provider::Anthropic, &body).unwrap(), GUIDE);
    }

    #[test]
    fn test_extract_gemini_text() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": GUIDE}], "role": "model"}}]
        })
        .to_string();
        assert_eq!(extract_text(Provider::Gemini, &body).unwrap(), GUIDE);
    }

    #[test]
    fn test_missing_text_part() {
        let body = r#"{"content": []}"#;
        let err = extract_text(Provider::Anthropic, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseShapeInvalid);
        assert!(matches!(err, SimplifyError::MissingText { .. }));
    }

    #[test]
    fn test_non_json_envelope() {
        let err = extract_text(Provider::Gemini, "<html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseShapeInvalid);
    }

    #[test]
    fn test_decode_rejects_prose() {
        let err = decode_guide("Sorry, I can't read that manual.").unwrap_err();
        assert!(matches!(err, SimplifyError::MalformedGuide { .. }));
    }

    #[test]
    fn test_anthropic_envelope_to_guide() {
        let body = serde_json::json!({
            "content": [{"type": "text", "text": format!("```json\n{GUIDE}\n```")}]
        })
        .to_string();
        let text = extract_text(Provider::Anthropic, &body).unwrap();
        let guide = decode_guide(&text).unwrap();
        assert_eq!(guide.title(), "T");
        assert_eq!(guide.warnings(), ["w".to_string()]);
    }

    #[test]
    fn test_fenced_pretty_json_decodes_to_equal_guide() {
        let original = GuideData::from_json(
            r#"{
                "title": "Espresso Machine First Use",
                "estimated_time": "25 minutes",
                "steps": [
                    {"step": 1, "instruction": "Rinse the water tank and fill it to MAX."},
                    {"step": 2, "instruction": "Lock the portafilter into the group head."},
                    {"step": 7, "instruction": "Run two empty shots to flush the system."}
                ],
                "warnings": ["The steam wand gets very hot."],
                "common_mistakes": ["Tamping before the grounds are level.", "Skipping the flush."],
                "final_checklist": ["Tank seated", "Drip tray empty"]
            }"#,
        )
        .unwrap();
        let pretty = original.to_json_pretty();

        for fenced in [
            format!("```json\n{pretty}\n```"),
            format!("```\n{pretty}\n```"),
        ] {
            let back = decode_guide(&fenced).unwrap();
            assert_eq!(back, original);
        }
    }
}
