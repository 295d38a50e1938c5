//! Submit-then-poll orchestration.
//!
//! `idle → submitting → processing → {completed | timed_out | failed}`.
//! Validation happens before any network call. Once the relay hands back a
//! request id, the status endpoint is checked once per interval until it
//! reports completion or the time budget runs out. A failed check is logged
//! and the next tick simply tries again.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, timeout_at, MissedTickBehavior};

use crate::client::api::{ClientError, RelayApi, SubmitReply};
use crate::client::session::{PollSession, PollState};
use crate::client::submission::{SubmissionDraft, ValidationError};
use crate::config::ClientConfig;
use crate::models::status::ResultData;

/// A finished submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// `None` when the relay answered with the result directly.
    pub request_id: Option<String>,
    pub data: ResultData,
    pub polls: u32,
}

impl Completion {
    /// Link to the generated image.
    pub fn image_link(&self) -> &str {
        self.link(&self.data.file_url, &self.data.file_name)
    }

    /// Link to the generated video.
    pub fn video_link(&self) -> &str {
        self.link(&self.data.video_url, &self.data.video_name)
    }

    // Synchronous workflow replies put the link in the name fields.
    fn link<'a>(&self, url: &'a str, name: &'a str) -> &'a str {
        if url.is_empty() && self.request_id.is_none() {
            name
        } else {
            url
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Could not reach the server: {0}")]
    Network(#[from] ClientError),

    #[error("No result for request {request_id} after {}s; the workflow may still be running", elapsed.as_secs())]
    Timeout { request_id: String, elapsed: Duration },
}

pub struct PollingController<R> {
    relay: R,
    interval: Duration,
    timeout: Duration,
}

impl<R: RelayApi> PollingController<R> {
    pub fn new(relay: R, interval: Duration, timeout: Duration) -> Self {
        Self {
            relay,
            interval,
            timeout,
        }
    }

    pub fn from_config(relay: R, config: &ClientConfig) -> Self {
        Self::new(relay, config.poll_interval(), config.poll_timeout())
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    /// Validate, submit and poll until a terminal state.
    pub async fn run(&self, draft: SubmissionDraft) -> Result<Completion, ControllerError> {
        let (progress, _) = watch::channel(PollState::Idle);
        self.run_with_progress(draft, &progress).await
    }

    /// Like [`run`](Self::run), publishing every state change on `progress`
    /// so a front end can disable/re-enable its submit control.
    pub async fn run_with_progress(
        &self,
        draft: SubmissionDraft,
        progress: &watch::Sender<PollState>,
    ) -> Result<Completion, ControllerError> {
        let result = self.submit_and_poll(draft, progress).await;
        if let Err(e) = &result {
            let state = match e {
                ControllerError::Timeout { .. } => PollState::TimedOut,
                _ => PollState::Failed,
            };
            progress.send_replace(state);
        }
        result
    }

    async fn submit_and_poll(
        &self,
        draft: SubmissionDraft,
        progress: &watch::Sender<PollState>,
    ) -> Result<Completion, ControllerError> {
        progress.send_replace(PollState::Submitting);

        // The draft is consumed here: the form is cleared whatever happens next.
        let submission = draft.into_submission()?;
        let reply = self.relay.submit(&submission).await?;

        match reply {
            SubmitReply::Direct(data) => {
                tracing::info!("Relay answered with the finished result directly");
                progress.send_replace(PollState::Completed);
                Ok(Completion {
                    request_id: None,
                    data,
                    polls: 0,
                })
            }
            SubmitReply::Accepted { id } => {
                tracing::info!(request_id = %id, "Submission accepted, polling for results");
                let mut session = PollSession::start(id);
                progress.send_replace(session.state());
                self.poll(&mut session, progress).await
            }
        }
    }

    /// Check the status endpoint once per interval until completion or timeout.
    ///
    /// The first check happens one interval after the session started. Each
    /// check is awaited before the next tick is considered, so checks for a
    /// session never overlap. A check still in flight when the budget runs
    /// out is abandoned, and a reply that lands at or after the deadline is
    /// not accepted.
    pub async fn poll(
        &self,
        session: &mut PollSession,
        progress: &watch::Sender<PollState>,
    ) -> Result<Completion, ControllerError> {
        let deadline = session.started() + self.timeout;
        let mut ticker = interval_at(session.started() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if session.is_expired(self.timeout) {
                return Err(self.expire(session, progress));
            }

            let attempt = session.record_poll();
            tracing::debug!(
                request_id = %session.request_id(),
                attempt,
                elapsed = %format_elapsed(session.elapsed()),
                "Checking status"
            );

            let checked = timeout_at(deadline, self.relay.check_status(session.request_id())).await;
            let Ok(checked) = checked else {
                tracing::warn!(
                    request_id = %session.request_id(),
                    attempt,
                    "Status check still pending when the budget ran out"
                );
                return Err(self.expire(session, progress));
            };
            if session.is_expired(self.timeout) {
                return Err(self.expire(session, progress));
            }

            match checked {
                Ok(response) => {
                    if let Some(data) = response.completed_data() {
                        if session.transition(PollState::Completed) {
                            progress.send_replace(PollState::Completed);
                            tracing::info!(
                                request_id = %session.request_id(),
                                attempt,
                                "Content generated"
                            );
                            return Ok(Completion {
                                request_id: Some(session.request_id().to_string()),
                                data: data.clone(),
                                polls: session.polls(),
                            });
                        }
                    }
                    tracing::debug!(
                        request_id = %session.request_id(),
                        found = response.found,
                        "Still processing"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        request_id = %session.request_id(),
                        attempt,
                        error = %e,
                        "Status check failed, retrying on next tick"
                    );
                }
            }
        }
    }

    fn expire(&self, session: &mut PollSession, progress: &watch::Sender<PollState>) -> ControllerError {
        let elapsed = session.elapsed();
        session.transition(PollState::TimedOut);
        progress.send_replace(PollState::TimedOut);
        tracing::warn!(
            request_id = %session.request_id(),
            polls = session.polls(),
            elapsed_secs = elapsed.as_secs(),
            "Polling budget exhausted"
        );
        ControllerError::Timeout {
            request_id: session.request_id().to_string(),
            elapsed,
        }
    }
}

/// `m:ss`, the way progress is shown to the user.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
