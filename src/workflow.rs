//! The upload workflow: one file in, one guide (or one error) out.
//!
//! ## State machine
//!
//! ```text
//!          submit                 encoded              parsed
//!   idle ─────────▶ uploading ─────────▶ processing ─────────▶ done
//!    ▲  │               │                    │                  │
//!    │  │ rejected      │ read failed        │ transport /      │
//!    │  ▼               ▼                    ▼ shape / cancel   │
//!    └──────────────── error ◀───────────────┘                  │
//!         reset                                                 │
//!    ◀──────────────────────────────────────────────────────────┘
//! ```
//!
//! State lives in a [`tokio::sync::watch`] channel so any number of
//! observers (a spinner, a test) see every transition. `submit` takes
//! `&self`; a second call while an attempt is uploading or processing is
//! refused with [`SubmitOutcome::Busy`] and does not touch the in-flight
//! attempt.

use crate::config::SimplifyConfig;
use crate::error::{ErrorKind, SimplifyError};
use crate::guide::GuideData;
use crate::pipeline::input::{self, SelectedFile};
use crate::pipeline::{encode, llm, postprocess};
use crate::progress;
use std::fmt;
use tokio::sync::watch;
use tokio::time::{interval_at, Duration, Instant};
use tracing::{debug, info, warn};

/// Where the workflow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Status {
    /// Waiting for a file.
    #[default]
    Idle,
    /// Reading and encoding the file. No network call yet.
    Uploading,
    /// Request sent; waiting on the service.
    Processing,
    /// A guide was decoded and handed to the caller.
    Done,
    /// The attempt failed; see [`UploadSessionState::error`].
    Error,
}

impl Status {
    /// True while an attempt owns the workflow and the submit control must
    /// be disabled.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Status::Uploading | Status::Processing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Done | Status::Error)
    }
}

/// A session-scoped API key. Never printed by `Debug`, never persisted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Credential(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The value as a masked/unmasked text field would show it.
    pub fn display(&self, reveal: bool) -> String {
        if reveal {
            self.0.clone()
        } else {
            "•".repeat(self.0.chars().count().min(32))
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

/// Everything a front-end needs to draw the upload section.
#[derive(Debug, Clone, Default)]
pub struct UploadSessionState {
    pub status: Status,
    /// Name of the file in the current attempt; empty when idle.
    pub file_name: String,
    /// Survives `reset`.
    pub credential: Credential,
    /// Masked/unmasked toggle for the credential field. Survives `reset`.
    pub credential_visible: bool,
    /// Human-readable message when `status == Error`.
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    /// Cosmetic processing stage, see [`crate::progress`].
    pub progress_index: usize,
}

impl UploadSessionState {
    /// Line to show next to the spinner, if any.
    pub fn status_label(&self) -> Option<&'static str> {
        match self.status {
            Status::Uploading => Some(progress::UPLOADING_LABEL),
            Status::Processing => Some(progress::stage_label(self.progress_index)),
            _ => None,
        }
    }

    fn fail(&mut self, err: &SimplifyError) {
        self.status = Status::Error;
        self.error = Some(err.to_string());
        self.error_kind = Some(err.kind());
    }
}

/// Result of one call to [`UploadWorkflow::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The guide was delivered to the callback.
    Done,
    /// The attempt ended in the error state with this message.
    Failed { kind: ErrorKind, message: String },
    /// Another attempt was in flight; nothing happened.
    Busy,
}

impl SubmitOutcome {
    fn failed(err: &SimplifyError) -> Self {
        SubmitOutcome::Failed {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Drives a single upload → request → parse cycle at a time.
pub struct UploadWorkflow {
    config: SimplifyConfig,
    state: watch::Sender<UploadSessionState>,
    cancel: watch::Sender<bool>,
}

impl UploadWorkflow {
    pub fn new(config: SimplifyConfig) -> Self {
        let (state, _) = watch::channel(UploadSessionState::default());
        let (cancel, _) = watch::channel(false);
        Self {
            config,
            state,
            cancel,
        }
    }

    pub fn config(&self) -> &SimplifyConfig {
        &self.config
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> UploadSessionState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> Status {
        self.state.borrow().status
    }

    /// Observe every state transition.
    pub fn subscribe(&self) -> watch::Receiver<UploadSessionState> {
        self.state.subscribe()
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.status().is_in_flight()
    }

    /// Store a credential for later submissions without submitting.
    pub fn set_credential(&self, value: impl Into<String>) {
        let credential = Credential::new(value);
        self.state.send_modify(|s| s.credential = credential);
    }

    /// Flip the masked/unmasked toggle; returns the new visibility.
    pub fn toggle_credential_visibility(&self) -> bool {
        let mut visible = false;
        self.state.send_modify(|s| {
            s.credential_visible = !s.credential_visible;
            visible = s.credential_visible;
        });
        visible
    }

    /// The credential as the field currently shows it.
    pub fn credential_display(&self) -> String {
        let s = self.state.borrow();
        s.credential.display(s.credential_visible)
    }

    /// Run one attempt: validate, read, encode, request, parse.
    ///
    /// `on_guide` is called exactly once, and only when the attempt reaches
    /// [`Status::Done`], just before the state is published. Every failure
    /// ends in [`Status::Error`] with a message; nothing is returned as `Err`.
    /// Dropping the returned future mid-flight also ends in
    /// [`Status::Error`] ("Upload cancelled").
    pub async fn submit<F>(
        &self,
        file: impl Into<SelectedFile>,
        credential: &str,
        on_guide: F,
    ) -> SubmitOutcome
    where
        F: FnOnce(GuideData),
    {
        let file = file.into();
        let file_name = file.name();
        let credential = Credential::new(credential);

        // Claim the workflow and validate in one step so two callers can
        // never both pass the in-flight check.
        let mut verdict: Option<Result<(), SimplifyError>> = None;
        self.state.send_if_modified(|s| {
            if s.status.is_in_flight() {
                return false;
            }
            let check = input::validate_submission(
                &file_name,
                credential.expose(),
                self.config.require_credential,
            );
            s.file_name = file_name.clone();
            s.credential = credential.clone();
            s.progress_index = 0;
            match &check {
                Ok(()) => {
                    s.status = Status::Uploading;
                    s.error = None;
                    s.error_kind = None;
                    self.cancel.send_replace(false);
                }
                Err(e) => s.fail(e),
            }
            verdict = Some(check);
            true
        });

        let Some(verdict) = verdict else {
            warn!("Ignoring submit of '{}': an upload is already in progress", file_name);
            return SubmitOutcome::Busy;
        };
        if let Err(e) = verdict {
            warn!("Rejected '{}': {}", file_name, e);
            return SubmitOutcome::failed(&e);
        }

        info!("Uploading '{}'", file_name);
        let cancel_rx = self.cancel.subscribe();
        let _abandoned = AbandonGuard { state: &self.state };

        match self.run_attempt(&file, &file_name, &credential, cancel_rx).await {
            Ok(guide) => {
                info!(
                    "Guide ready for '{}': {} steps, {} warnings, {} mistakes, {} checklist items",
                    file_name,
                    guide.steps().len(),
                    guide.warnings().len(),
                    guide.common_mistakes().len(),
                    guide.final_checklist().len()
                );
                // Deliver before publishing Done so observers of Done find the guide.
                on_guide(guide);
                self.state.send_modify(|s| s.status = Status::Done);
                SubmitOutcome::Done
            }
            Err(e) => {
                warn!("Attempt for '{}' failed: {}", file_name, e);
                self.state.send_modify(|s| s.fail(&e));
                SubmitOutcome::failed(&e)
            }
        }
    }

    /// Return to idle from `done` or `error`.
    ///
    /// Clears the file name, error and progress index; keeps the credential.
    /// Refused (returns `false`) while an attempt is in flight.
    pub fn reset(&self) -> bool {
        let mut refused = false;
        self.state.send_if_modified(|s| {
            if s.status.is_in_flight() {
                refused = true;
                return false;
            }
            let changed = s.status != Status::Idle
                || !s.file_name.is_empty()
                || s.error.is_some()
                || s.progress_index != 0;
            s.status = Status::Idle;
            s.file_name.clear();
            s.error = None;
            s.error_kind = None;
            s.progress_index = 0;
            changed
        });
        if !refused {
            debug!("Workflow reset to idle");
        }
        !refused
    }

    /// Abandon the in-flight attempt, if any.
    ///
    /// The attempt ends in [`Status::Error`] with "Upload cancelled".
    pub fn cancel(&self) -> bool {
        if self.status().is_in_flight() {
            info!("Cancelling in-flight upload");
            self.cancel.send_replace(true);
            true
        } else {
            false
        }
    }

    async fn run_attempt(
        &self,
        file: &SelectedFile,
        file_name: &str,
        credential: &Credential,
        mut cancel_rx: watch::Receiver<bool>,
    ) -> Result<GuideData, SimplifyError> {
        let transport = llm::resolve_transport(&self.config)?;

        // ── Uploading: read + encode ─────────────────────────────────────
        let bytes = tokio::select! {
            biased;
            _ = cancelled(&mut cancel_rx) => return Err(SimplifyError::Cancelled),
            read = file.read() => read?,
        };
        let doc = encode::encode_document(file_name, &bytes);
        drop(bytes);

        // ── Processing: one request, cosmetic ticker alongside ───────────
        self.state.send_modify(|s| {
            s.status = Status::Processing;
            s.progress_index = 0;
        });

        let request = llm::request_guide_text(&transport, &self.config, &doc, credential.expose());
        tokio::pin!(request);

        let period = Duration::from_millis(self.config.progress_interval_ms);
        let mut ticker = interval_at(Instant::now() + period, period);

        let text = loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel_rx) => return Err(SimplifyError::Cancelled),
                result = &mut request => break result?,
                _ = ticker.tick() => {
                    self.state.send_modify(|s| {
                        s.progress_index = progress::advance(s.progress_index);
                    });
                }
            }
        };

        postprocess::decode_guide(&text)
    }
}

/// Moves a claimed attempt to the error state if its `submit` future is
/// dropped before finishing (timeout, losing `select!` branch, aborted task).
struct AbandonGuard<'a> {
    state: &'a watch::Sender<UploadSessionState>,
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        let abandoned = self.state.send_if_modified(|s| {
            if !s.status.is_in_flight() {
                return false;
            }
            s.fail(&SimplifyError::Cancelled);
            true
        });
        if abandoned {
            warn!("Upload abandoned before it finished");
        }
    }
}

/// Resolve once the cancel flag is raised. Never resolves if the sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|c| *c).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let c = Credential::new("sk-ant-secret");
        assert!(!format!("{c:?}").contains("secret"));
        assert_eq!(c.display(true), "sk-ant-secret");
        assert_eq!(c.display(false).chars().count(), 13);
        assert!(!c.display(false).contains('s'));
    }

    #[test]
    fn status_predicates() {
        assert!(Status::Uploading.is_in_flight());
        assert!(Status::Processing.is_in_flight());
        assert!(!Status::Idle.is_in_flight());
        assert!(Status::Done.is_terminal());
        assert!(Status::Error.is_terminal());
    }

    #[test]
    fn status_labels() {
        let mut s = UploadSessionState::default();
        assert_eq!(s.status_label(), None);
        s.status = Status::Uploading;
        assert_eq!(s.status_label(), Some("Uploading..."));
        s.status = Status::Processing;
        s.progress_index = 4;
        assert_eq!(s.status_label(), Some("Generating beginner-friendly guide..."));
    }

    #[test]
    fn visibility_toggle_survives_reset() {
        let wf = UploadWorkflow::new(SimplifyConfig::default());
        wf.set_credential("abc");
        assert_eq!(wf.credential_display(), "•••");
        assert!(wf.toggle_credential_visibility());
        assert_eq!(wf.credential_display(), "abc");
        assert!(wf.reset());
        assert_eq!(wf.credential_display(), "abc");
    }

    #[test]
    fn cancel_when_idle_is_noop() {
        let wf = UploadWorkflow::new(SimplifyConfig::default());
        assert!(!wf.cancel());
        assert!(wf.can_submit());
    }
}
