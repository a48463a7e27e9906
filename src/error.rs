//! Error types for the manual-simplifier library.
//!
//! Every failure the upload workflow can hit is a [`SimplifyError`]. The
//! `Display` text of each variant is the human-readable message shown to the
//! user; the structured fields carry the detail that goes to the logs.
//!
//! Variants are grouped into an [`ErrorKind`] so front-ends can tell apart
//! "you gave me something I can't use" ([`ErrorKind::InputRejected`]), "the
//! service couldn't be reached or said no" ([`ErrorKind::TransportFailure`])
//! and "the service answered but the answer is unusable"
//! ([`ErrorKind::ResponseShapeInvalid`]).

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`SimplifyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Wrong file type or missing credential. Detected before any network I/O.
    InputRejected,
    /// The external call could not complete or returned a non-success status.
    TransportFailure,
    /// The call succeeded but the payload could not be decoded into a guide.
    ResponseShapeInvalid,
    /// The attempt was abandoned by the user while in flight.
    Cancelled,
    /// Configuration or internal failure unrelated to a single attempt.
    Internal,
}

/// All errors returned by the manual-simplifier library.
#[derive(Debug, Error)]
pub enum SimplifyError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The selected file does not carry a `.pdf` extension.
    #[error("Only PDF files are supported ('{file_name}' is not a .pdf)")]
    NotAPdf { file_name: String },

    /// The service requires a credential and none was entered.
    #[error("An API key is required to generate a guide")]
    CredentialRequired,

    /// The file could not be read from disk.
    #[error("Could not read '{path}': {source}")]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Transport errors ──────────────────────────────────────────────────
    /// The service answered with a non-success status code.
    ///
    /// `message` is the service's own explanation when its error body had
    /// one, otherwise a generic message naming the status code.
    #[error("{message}")]
    ServiceError { status: u16, message: String },

    /// The request never produced a response (DNS, TLS, connection reset…).
    #[error("Request to the guide service failed: {reason}")]
    RequestFailed { reason: String },

    /// The request exceeded the configured timeout.
    #[error("The guide service did not respond within {secs}s")]
    Timeout { secs: u64 },

    // ── Response shape errors ─────────────────────────────────────────────
    /// The response body carried no text part to decode.
    #[error("The service responded but returned no guide text. Please try again.")]
    MissingText { detail: String },

    /// The text part was not a valid guide structure.
    #[error("Could not parse the generated guide. Please try again.")]
    MalformedGuide { detail: String },

    // ── Workflow errors ───────────────────────────────────────────────────
    /// The in-flight attempt was cancelled.
    #[error("Upload cancelled")]
    Cancelled,

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SimplifyError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimplifyError::NotAPdf { .. }
            | SimplifyError::CredentialRequired
            | SimplifyError::FileUnreadable { .. } => ErrorKind::InputRejected,
            SimplifyError::ServiceError { .. }
            | SimplifyError::RequestFailed { .. }
            | SimplifyError::Timeout { .. } => ErrorKind::TransportFailure,
            SimplifyError::MissingText { .. } | SimplifyError::MalformedGuide { .. } => {
                ErrorKind::ResponseShapeInvalid
            }
            SimplifyError::Cancelled => ErrorKind::Cancelled,
            SimplifyError::OutputWriteFailed { .. }
            | SimplifyError::InvalidConfig(_)
            | SimplifyError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Build a [`SimplifyError::ServiceError`] from a failed response.
    ///
    /// Both supported services report failures as
    /// `{"error": {"message": "..."}}`. When that message is present it is
    /// surfaced verbatim; otherwise the status code is named instead.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("The guide service returned HTTP status {status}"));

        SimplifyError::ServiceError { status, message }
    }
}
