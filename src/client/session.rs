use std::time::Duration;
use tokio::time::Instant;

/// Lifecycle of one submission as seen by the submitting side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PollState {
    Idle,
    Submitting,
    Processing,
    Completed,
    TimedOut,
    Failed,
}

impl PollState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PollState::Completed | PollState::TimedOut | PollState::Failed)
    }
}

/// State of one polling run. Owned by a single controller call; nothing is
/// shared between sessions.
#[derive(Debug)]
pub struct PollSession {
    request_id: String,
    started: Instant,
    polls: u32,
    state: PollState,
}

impl PollSession {
    pub fn start(request_id: String) -> Self {
        Self {
            request_id,
            started: Instant::now(),
            polls: 0,
            state: PollState::Processing,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Budget is spent once elapsed time reaches it.
    pub fn is_expired(&self, budget: Duration) -> bool {
        self.elapsed() >= budget
    }

    pub fn record_poll(&mut self) -> u32 {
        self.polls += 1;
        self.polls
    }

    /// Move to `next`. Terminal states are final: returns `false` and leaves
    /// the state untouched if the session already finished.
    pub fn transition(&mut self, next: PollState) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = next;
        true
    }
}
