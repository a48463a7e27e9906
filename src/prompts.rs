//! The instruction sent alongside every document.
//!
//! The JSON shape spelled out here is the wire contract that
//! [`crate::guide::GuideData`] decodes. Changing a field name in one place
//! without the other breaks every response, so both live in the crate and
//! the tests below pin them together.
//!
//! Callers can override the default via
//! [`crate::config::SimplifyConfig::instruction`].

/// Default instruction for turning a product manual into a setup guide.
pub const GUIDE_INSTRUCTION: &str = r#"You are an expert technical writer who turns dense product manuals into setup guides a complete beginner can follow.

Read the attached PDF manual and extract ONLY what is needed to unbox, set up and start using the product for the first time.

Respond with ONLY a JSON object of exactly this shape, with no commentary and no markdown fences:

{
  "title": string,
  "estimated_time": string,
  "steps": [ { "step": number, "instruction": string }, ... ],
  "warnings": [ string, ... ],
  "common_mistakes": [ string, ... ],
  "final_checklist": [ string, ... ]
}

Rules:
- "title" names the product and ends with "Setup Guide".
- "estimated_time" is a human-readable range such as "15-20 minutes".
- "steps" are numbered from 1 in the order they must be performed; each instruction is one plain-language sentence or two.
- "warnings" lists safety or damage risks called out by the manual.
- "common_mistakes" lists errors beginners typically make during setup.
- "final_checklist" lists short, verifiable items confirming setup succeeded.
- Use an empty array when the manual gives nothing for a list."#;
