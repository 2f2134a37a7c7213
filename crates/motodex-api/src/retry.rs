//! Retry policy and failure classification.

use std::time::Duration;

use reqwest::StatusCode;

/// Fixed-count, fixed-delay retry policy for idempotent requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Total physical attempts allowed for one logical request.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// How one physical attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx response.
    Success,
    /// 401 response.
    Unauthorized,
    /// No response reached the client.
    Transport,
    /// Any other status.
    Status(StatusCode),
}

impl Outcome {
    /// Classifies an HTTP status.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() {
            Self::Success
        } else if status == StatusCode::UNAUTHORIZED {
            Self::Unauthorized
        } else {
            Self::Status(status)
        }
    }
}

/// Recovery step chosen for an attempt outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Return the body.
    Succeed,
    /// Refresh the access token and replay.
    Refresh,
    /// Sleep, then attempt again.
    Backoff,
    /// Give up with `Unauthorized`.
    FailUnauthorized,
    /// Give up with `Network`.
    FailNetwork,
    /// Give up with the server's status.
    FailStatus,
}

/// Per-logical-request recovery bookkeeping.
#[derive(Debug, Clone)]
pub struct Recovery {
    policy: RetryPolicy,
    idempotent: bool,
    refreshable: bool,
    retries_left: u32,
    refresh_consumed: bool,
    attempts: u32,
}

impl Recovery {
    /// Starts tracking a logical request.
    #[must_use]
    pub const fn new(policy: RetryPolicy, idempotent: bool, refreshable: bool) -> Self {
        Self {
            policy,
            idempotent,
            refreshable,
            retries_left: policy.max_retries,
            refresh_consumed: false,
            attempts: 0,
        }
    }

    /// Records that a physical attempt is being dispatched.
    pub const fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Physical attempts made so far.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Retry delay from the policy.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.policy.delay
    }

    /// Chooses the next step and updates the counters it consumes.
    pub fn next_step(&mut self, outcome: &Outcome) -> Step {
        match outcome {
            Outcome::Success => Step::Succeed,
            Outcome::Unauthorized if self.refreshable && !self.refresh_consumed => {
                self.refresh_consumed = true;
                Step::Refresh
            }
            Outcome::Unauthorized => Step::FailUnauthorized,
            Outcome::Transport if self.idempotent && self.retries_left > 0 => {
                self.retries_left -= 1;
                Step::Backoff
            }
            Outcome::Transport => Step::FailNetwork,
            Outcome::Status(_) => Step::FailStatus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
    }

    #[test]
    fn test_transport_retries_are_bounded() {
        let mut recovery = Recovery::new(RetryPolicy::new(2, Duration::ZERO), true, true);
        assert_eq!(recovery.next_step(&Outcome::Transport), Step::Backoff);
        assert_eq!(recovery.next_step(&Outcome::Transport), Step::Backoff);
        assert_eq!(recovery.next_step(&Outcome::Transport), Step::FailNetwork);
    }

    #[test]
    fn test_mutations_never_back_off() {
        let mut recovery = Recovery::new(RetryPolicy::default(), false, true);
        assert_eq!(recovery.next_step(&Outcome::Transport), Step::FailNetwork);
    }

    #[test]
    fn test_refresh_only_once() {
        let mut recovery = Recovery::new(RetryPolicy::default(), true, true);
        assert_eq!(recovery.next_step(&Outcome::Unauthorized), Step::Refresh);
        assert_eq!(
            recovery.next_step(&Outcome::Unauthorized),
            Step::FailUnauthorized
        );
    }

    #[test]
    fn test_auth_endpoints_skip_refresh() {
        let mut recovery = Recovery::new(RetryPolicy::default(), false, false);
        assert_eq!(
            recovery.next_step(&Outcome::Unauthorized),
            Step::FailUnauthorized
        );
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(Outcome::from_status(StatusCode::OK), Outcome::Success);
        assert_eq!(
            Outcome::from_status(StatusCode::UNAUTHORIZED),
            Outcome::Unauthorized
        );
        assert_eq!(
            Outcome::from_status(StatusCode::NOT_FOUND),
            Outcome::Status(StatusCode::NOT_FOUND)
        );
    }
}
