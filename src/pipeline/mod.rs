//! Pipeline stages for manual-to-guide generation.
//!
//! Each submodule implements exactly one transformation step so each can be
//! tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ llm ──▶ postprocess
//! (.pdf?)   (base64)  (POST)  (text → fences → GuideData)
//! ```
//!
//! 1. [`input`]: accept or reject the file name and credential, read bytes
//! 2. [`encode`]: base64-wrap the document for the JSON request body
//! 3. [`llm`]: build the provider request and send it; the only stage
//!    with network I/O
//! 4. [`postprocess`]: locate the text part, strip code fences, decode

pub mod encode;
pub mod input;
pub mod llm;
pub mod postprocess;
