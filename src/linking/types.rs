//! Shared types for the account-linking poller

use crate::config::LinkingConfig;
use crate::errors::ClientResult;
use async_trait::async_trait;
use std::time::Duration;

/// Delay before the first linked-status check (and backoff base).
pub const BASE_INTERVAL_MS: u64 = 2_000;
/// Upper bound for the backoff delay between checks.
pub const MAX_INTERVAL_MS: u64 = 30_000;
/// Overall deadline for one linking attempt, from the start of polling.
pub const DEADLINE_MS: u64 = 600_000; // 10 minutes

/// Timing knobs for a poll session.
#[derive(Debug, Clone, Copy)]
pub struct PollTiming {
    pub base_interval: Duration,
    pub max_interval: Duration,
    pub deadline: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(BASE_INTERVAL_MS),
            max_interval: Duration::from_millis(MAX_INTERVAL_MS),
            deadline: Duration::from_millis(DEADLINE_MS),
        }
    }
}

impl From<&LinkingConfig> for PollTiming {
    fn from(config: &LinkingConfig) -> Self {
        Self {
            base_interval: Duration::from_millis(config.base_interval_ms),
            max_interval: Duration::from_millis(config.max_interval_ms),
            deadline: Duration::from_millis(config.deadline_ms),
        }
    }
}

/// Observable state of a poll session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Authorization window opened, first check not yet due
    PopupOpened,
    /// Waiting between linked-status checks
    Polling,
    /// Terminal: the backend confirmed the account link
    Linked,
    /// Terminal: the user closed the window before linking finished
    PopupClosed,
    /// Terminal: the deadline elapsed without a confirmed link
    TimedOut,
}

impl LinkState {
    pub fn outcome(&self) -> Option<LinkOutcome> {
        match self {
            LinkState::Linked => Some(LinkOutcome::Linked),
            LinkState::PopupClosed => Some(LinkOutcome::PopupClosed),
            LinkState::TimedOut => Some(LinkOutcome::TimedOut),
            LinkState::PopupOpened | LinkState::Polling => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }
}

/// Terminal result of a poll session.
///
/// A closed window is a deliberate cancellation, not an error; callers may
/// surface it as "connection cancelled" or silently return to the prior
/// screen. A timeout carries a retry affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked,
    PopupClosed,
    TimedOut,
}

impl LinkOutcome {
    pub(crate) fn into_state(self) -> LinkState {
        match self {
            LinkOutcome::Linked => LinkState::Linked,
            LinkOutcome::PopupClosed => LinkState::PopupClosed,
            LinkOutcome::TimedOut => LinkState::TimedOut,
        }
    }
}

/// Asks the backend whether the external account has been linked yet.
///
/// A probe error is indistinguishable from "not yet linked" as far as the
/// poll loop is concerned; transient failures must not abort the wait.
#[async_trait]
pub trait LinkProbe: Send + Sync {
    async fn is_linked(&self) -> ClientResult<bool>;
}
