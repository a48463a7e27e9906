//! The guide data model: what a simplified manual looks like.
//!
//! A [`GuideData`] is an immutable value. The only way to obtain one is to
//! decode it from JSON (see [`GuideData::from_json`] or any serde
//! `Deserialize` path), and decoding is all-or-nothing: a missing field, a
//! wrong type, a blank title or instruction, or a zero step number rejects
//! the whole document. There is no partially-filled guide.
//!
//! Field names on the wire are snake_case and match the instruction sent to
//! the service:
//!
//! ```text
//! { "title", "estimated_time", "steps": [{ "step", "instruction" }],
//!   "warnings", "common_mistakes", "final_checklist" }
//! ```

use crate::error::SimplifyError;
use serde::{Deserialize, Serialize};

/// One numbered instruction.
///
/// `step` is the label supplied by the service. It is expected to count up
/// from 1 but is never renumbered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideStep {
    pub step: u32,
    pub instruction: String,
}

/// A beginner-oriented setup guide derived from a manual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGuide")]
pub struct GuideData {
    title: String,
    estimated_time: String,
    steps: Vec<GuideStep>,
    warnings: Vec<String>,
    common_mistakes: Vec<String>,
    final_checklist: Vec<String>,
}

/// Unvalidated wire shape. Every field is required.
#[derive(Deserialize)]
struct RawGuide {
    title: String,
    estimated_time: String,
    steps: Vec<GuideStep>,
    warnings: Vec<String>,
    common_mistakes: Vec<String>,
    final_checklist: Vec<String>,
}

impl TryFrom<RawGuide> for GuideData {
    type Error = String;

    fn try_from(raw: RawGuide) -> Result<Self, Self::Error> {
        if raw.title.trim().is_empty() {
            return Err("`title` must not be empty".into());
        }
        for (i, s) in raw.steps.iter().enumerate() {
            if s.step == 0 {
                return Err(format!("steps[{i}].step must be a positive integer"));
            }
            if s.instruction.trim().is_empty() {
                return Err(format!("steps[{i}].instruction must not be empty"));
            }
        }

        Ok(GuideData {
            title: raw.title,
            estimated_time: raw.estimated_time,
            steps: raw.steps,
            warnings: raw.warnings,
            common_mistakes: raw.common_mistakes,
            final_checklist: raw.final_checklist,
        })
    }
}

impl GuideData {
    /// Decode a guide from JSON text.
    ///
    /// Any failure is reported as [`SimplifyError::MalformedGuide`].
    pub fn from_json(text: &str) -> Result<Self, SimplifyError> {
        serde_json::from_str(text).map_err(|e| SimplifyError::MalformedGuide {
            detail: e.to_string(),
        })
    }

    /// Serialise back to the wire shape, pretty-printed.
    pub fn to_json_pretty(&self) -> String {
        // A struct of strings and integers always serialises.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Free-text duration estimate, e.g. "15-20 minutes".
    pub fn estimated_time(&self) -> &str {
        &self.estimated_time
    }

    /// Steps in the order the service returned them.
    pub fn steps(&self) -> &[GuideStep] {
        &self.steps
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn common_mistakes(&self) -> &[String] {
        &self.common_mistakes
    }

    pub fn final_checklist(&self) -> &[String] {
        &self.final_checklist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "title": "Kettle Setup",
        "estimated_time": "5 minutes",
        "steps": [{"step": 1, "instruction": "Fill with water."}],
        "warnings": [],
        "common_mistakes": [],
        "final_checklist": []
    }"#;

    #[test]
    fn decodes_minimal_guide() {
        let g = GuideData::from_json(MINIMAL).unwrap();
        assert_eq!(g.title(), "Kettle Setup");
        assert_eq!(g.estimated_time(), "5 minutes");
        assert_eq!(g.steps().len(), 1);
        assert!(g.warnings().is_empty());
    }

    #[test]
    fn missing_field_is_rejected() {
        let text = MINIMAL.replace(r#""final_checklist": []"#, r#""extra": 1"#);
        let err = GuideData::from_json(&text).unwrap_err();
        assert!(matches!(err, SimplifyError::MalformedGuide { .. }));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let text = MINIMAL.replace(r#""warnings": []"#, r#""warnings": "none""#);
        assert!(GuideData::from_json(&text).is_err());
    }

    #[test]
    fn blank_title_is_rejected() {
        let text = MINIMAL.replace("Kettle Setup", "  ");
        let err = GuideData::from_json(&text).unwrap_err();
        match err {
            SimplifyError::MalformedGuide { detail } => assert!(detail.contains("title")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_step_is_rejected() {
        let text = MINIMAL.replace(r#""step": 1"#, r#""step": 0"#);
        assert!(GuideData::from_json(&text).is_err());
    }

    #[test]
    fn non_contiguous_steps_are_kept_as_given() {
        let text = MINIMAL.replace(
            r#"[{"step": 1, "instruction": "Fill with water."}]"#,
            r#"[{"step": 3, "instruction": "B"}, {"step": 1, "instruction": "A"}]"#,
        );
        let g = GuideData::from_json(&text).unwrap();
        let labels: Vec<u32> = g.steps().iter().map(|s| s.step).collect();
        assert_eq!(labels, vec![3, 1]);
    }

    #[test]
    fn pretty_json_uses_wire_names() {
        let g = GuideData::from_json(MINIMAL).unwrap();
        let json = g.to_json_pretty();
        assert!(json.contains("\"estimated_time\""));
        assert!(json.contains("\"common_mistakes\""));
        assert_eq!(GuideData::from_json(&json).unwrap(), g);
    }
}
