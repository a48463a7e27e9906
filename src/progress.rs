//! Cosmetic progress for the processing phase.
//!
//! The external service gives no incremental feedback, so the workflow walks
//! through a fixed list of stage labels on a timer purely to show that
//! something is happening. The index carries no correctness meaning: it
//! never reaches "done" on its own and it clamps at the last label however
//! long the request takes.

/// Label shown while the file is being read and encoded.
pub const UPLOADING_LABEL: &str = "Uploading...";

/// Labels cycled through while waiting on the service.
pub const PROCESSING_MESSAGES: [&str; 6] = [
    "Extracting text from PDF...",
    "Cleaning & normalizing content...",
    "Filtering setup sections...",
    "Chunking for LLM processing...",
    "Generating beginner-friendly guide...",
    "Assembling final output...",
];

/// Index of the last label.
pub const LAST_STAGE: usize = PROCESSING_MESSAGES.len() - 1;

/// Next progress index after one tick.
pub fn advance(index: usize) -> usize {
    (index + 1).min(LAST_STAGE)
}

/// Label for a progress index, clamped to the last label.
pub fn stage_label(index: usize) -> &'static str {
    PROCESSING_MESSAGES[index.min(LAST_STAGE)]
}
