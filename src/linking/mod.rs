//! Account-linking completion detection
//!
//! Linking an external account happens in a browser window owned by the
//! OAuth provider; this module owns everything on our side of that window:
//! opening it, polling the backend for the linked condition with exponential
//! backoff, and reporting exactly one terminal outcome per attempt.

pub mod backoff;
pub mod poller;
pub mod popup;
pub mod types;

pub use backoff::Backoff;
pub use poller::{LinkPoller, LinkSession};
pub use popup::{PopupFeatures, PopupLauncher, PopupWindow, SystemBrowserLauncher};
pub use types::{LinkOutcome, LinkProbe, LinkState, PollTiming};

use crate::errors::ClientResult;
use crate::logger::{self, LogTag};
use std::sync::Arc;
use tokio::task::AbortHandle;

/// Orchestrates linking attempts for one target platform.
///
/// Holds no global state: each manager is owned by whoever drives the
/// linking flow. It enforces the single-session contract: starting a new
/// attempt cancels the previous session's pending timers before the new one
/// schedules anything, so ticks from two sessions can never interleave.
pub struct LinkManager {
    probe: Arc<dyn LinkProbe>,
    launcher: Box<dyn PopupLauncher>,
    timing: PollTiming,
    features: PopupFeatures,
    active: Option<AbortHandle>,
}

impl LinkManager {
    pub fn new(
        probe: Arc<dyn LinkProbe>,
        launcher: Box<dyn PopupLauncher>,
        timing: PollTiming,
        features: PopupFeatures,
    ) -> Self {
        Self {
            probe,
            launcher,
            timing,
            features,
            active: None,
        }
    }

    /// Open the authorization window and start polling.
    ///
    /// Any session still running from a previous attempt is cancelled first.
    /// If the window cannot be opened the error surfaces immediately and no
    /// polling starts.
    pub fn start(&mut self, auth_url: &str) -> ClientResult<LinkSession> {
        if let Some(previous) = self.active.take() {
            logger::debug(LogTag::Link, "Superseding previous linking attempt");
            previous.abort();
        }

        let popup = self.launcher.open(auth_url, &self.features)?;
        let session = LinkPoller::start(self.probe.clone(), popup, self.timing);
        self.active = Some(session.abort_handle());
        Ok(session)
    }

    /// Cancel whatever attempt is currently running, if any.
    pub fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            active.abort();
        }
    }
}
