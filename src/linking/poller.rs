//! Poll loop that detects completion of an external account link
//!
//! There is no server push: after the authorization window opens, the only
//! way to learn that the backend finished linking the account is to ask it.
//! The loop waits a base interval (giving the window time to navigate),
//! then checks on an exponential backoff schedule until the link is
//! confirmed, the window is closed, or the deadline elapses.
//!
//! One tick runs to completion before the next is scheduled (a single
//! rescheduled sleep, never a fixed-rate interval), so a slow status check
//! can never overlap with itself. The deadline watchdog runs independently
//! of the tick timer and wins any race, including against an in-flight
//! status check.

use super::backoff::Backoff;
use super::popup::PopupWindow;
use super::types::{LinkOutcome, LinkProbe, LinkState, PollTiming};
use crate::logger::{self, LogTag};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::sleep;

pub struct LinkPoller;

impl LinkPoller {
    /// Spawn a poll session for an already-opened authorization window.
    ///
    /// The returned handle owns the session: dropping it (or calling
    /// `cancel`) clears every pending timer, and an in-flight status check
    /// is discarded rather than acted upon.
    pub fn start(
        probe: Arc<dyn LinkProbe>,
        popup: Box<dyn PopupWindow>,
        timing: PollTiming,
    ) -> LinkSession {
        let (state_tx, state_rx) = watch::channel(LinkState::PopupOpened);
        let handle = tokio::spawn(run(probe, popup, timing, state_tx));
        LinkSession { state_rx, handle }
    }
}

/// Owned handle to one poll session.
///
/// Exactly one terminal outcome is observable through `wait`. At most one
/// session should be active per linking target; `LinkManager` enforces that
/// for callers juggling repeated attempts.
pub struct LinkSession {
    state_rx: watch::Receiver<LinkState>,
    handle: JoinHandle<()>,
}

impl LinkSession {
    /// Current state snapshot.
    pub fn state(&self) -> LinkState {
        *self.state_rx.borrow()
    }

    /// Await the terminal outcome.
    ///
    /// Returns None if the session was cancelled before reaching one.
    pub async fn wait(&mut self) -> Option<LinkOutcome> {
        loop {
            let state = *self.state_rx.borrow_and_update();
            if let Some(outcome) = state.outcome() {
                return Some(outcome);
            }
            if self.state_rx.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Cancel the session, dropping any pending timers.
    ///
    /// A no-op once the session has reached a terminal state.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub(crate) fn abort_handle(&self) -> AbortHandle {
        self.handle.abort_handle()
    }
}

impl Drop for LinkSession {
    // Teardown must not leave orphaned timers firing against a dropped
    // context.
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(
    probe: Arc<dyn LinkProbe>,
    popup: Box<dyn PopupWindow>,
    timing: PollTiming,
    state_tx: watch::Sender<LinkState>,
) {
    let deadline = sleep(timing.deadline);
    tokio::pin!(deadline);

    let mut backoff = Backoff::new(timing.base_interval, timing.max_interval);

    let outcome = loop {
        let delay = backoff.next_delay();
        tokio::select! {
            // The watchdog wins any race, including a tick due at the same
            // instant as the deadline.
            biased;
            _ = &mut deadline => break LinkOutcome::TimedOut,
            _ = sleep(delay) => {}
        }

        if *state_tx.borrow() == LinkState::PopupOpened {
            let _ = state_tx.send(LinkState::Polling);
        }

        // Tick order matters: a window the user already closed must win
        // over a late "linked" answer.
        if popup.is_closed() {
            logger::info(
                LogTag::Link,
                "Authorization window closed before the link completed",
            );
            break LinkOutcome::PopupClosed;
        }

        let checked = tokio::select! {
            biased;
            _ = &mut deadline => break LinkOutcome::TimedOut,
            result = probe.is_linked() => result,
        };

        match checked {
            Ok(true) => break LinkOutcome::Linked,
            Ok(false) => {
                logger::debug(
                    LogTag::Link,
                    &format!(
                        "Not linked yet (attempt {}, next check in {}ms)",
                        backoff.attempt(),
                        backoff.delay_for(backoff.attempt()).as_millis()
                    ),
                );
            }
            // Transient failures must not abort the wait; they are
            // indistinguishable from "not yet linked" until the deadline.
            Err(e) => {
                logger::debug(
                    LogTag::Link,
                    &format!("Linked-status check failed, treating as not linked: {}", e),
                );
            }
        }
    };

    match outcome {
        LinkOutcome::Linked => {
            logger::info(LogTag::Link, "Account link confirmed");
            if !popup.is_closed() {
                popup.close();
            }
        }
        LinkOutcome::TimedOut => {
            logger::warning(
                LogTag::Link,
                &format!(
                    "Account link not confirmed within {}s",
                    timing.deadline.as_secs()
                ),
            );
            if !popup.is_closed() {
                popup.close();
            }
        }
        LinkOutcome::PopupClosed => {}
    }

    let _ = state_tx.send(outcome.into_state());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ClientError, ClientResult};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedProbe {
        responses: Mutex<VecDeque<ClientResult<bool>>>,
        calls: Mutex<Vec<Duration>>,
        started: tokio::time::Instant,
    }

    impl ScriptedProbe {
        fn new(responses: Vec<ClientResult<bool>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
                started: tokio::time::Instant::now(),
            })
        }

        fn call_offsets_ms(&self) -> Vec<u64> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|d| d.as_millis() as u64)
                .collect()
        }
    }

    #[async_trait]
    impl LinkProbe for ScriptedProbe {
        async fn is_linked(&self) -> ClientResult<bool> {
            self.calls.lock().unwrap().push(self.started.elapsed());
            // Exhausted scripts keep answering "not yet"
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(false))
        }
    }

    #[derive(Default)]
    struct PopupState {
        closed: AtomicBool,
        checks: AtomicUsize,
        close_requests: AtomicUsize,
        close_after_checks: Option<usize>,
    }

    struct FakePopup {
        state: Arc<PopupState>,
    }

    impl FakePopup {
        fn pair() -> (Box<dyn PopupWindow>, Arc<PopupState>) {
            let state = Arc::new(PopupState::default());
            (Box::new(Self { state: state.clone() }), state)
        }

        fn closing_after(checks: usize) -> (Box<dyn PopupWindow>, Arc<PopupState>) {
            let state = Arc::new(PopupState {
                close_after_checks: Some(checks),
                ..PopupState::default()
            });
            (Box::new(Self { state: state.clone() }), state)
        }
    }

    impl PopupWindow for FakePopup {
        fn is_closed(&self) -> bool {
            let seen = self.state.checks.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(limit) = self.state.close_after_checks {
                if seen >= limit {
                    self.state.closed.store(true, Ordering::SeqCst);
                }
            }
            self.state.closed.load(Ordering::SeqCst)
        }

        fn close(&self) {
            self.state.close_requests.fetch_add(1, Ordering::SeqCst);
            self.state.closed.store(true, Ordering::SeqCst);
        }
    }

    fn default_timing() -> PollTiming {
        PollTiming::default()
    }

    #[tokio::test(start_paused = true)]
    async fn happy_path_checks_follow_backoff_schedule() {
        let probe = ScriptedProbe::new(vec![Ok(false), Ok(false), Ok(true)]);
        let (popup, popup_state) = FakePopup::pair();

        let mut session = LinkPoller::start(probe.clone(), popup, default_timing());
        assert_eq!(session.state(), LinkState::PopupOpened);

        let outcome = session.wait().await;
        assert_eq!(outcome, Some(LinkOutcome::Linked));

        // Checks at 2s, 6s (after 4s backoff), 14s (after 8s backoff)
        assert_eq!(probe.call_offsets_ms(), vec![2_000, 6_000, 14_000]);
        assert_eq!(probe.started.elapsed(), Duration::from_millis(14_000));

        // Popup close requested once, nothing further scheduled
        assert_eq!(popup_state.close_requests.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(probe.call_offsets_ms().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_probe_errors_continue_the_same_schedule() {
        let probe = ScriptedProbe::new(vec![
            Err(ClientError::Network("connection reset".to_string())),
            Err(ClientError::Network("dns failure".to_string())),
            Ok(true),
        ]);
        let (popup, _) = FakePopup::pair();

        let mut session = LinkPoller::start(probe.clone(), popup, default_timing());
        let outcome = session.wait().await;

        // Errors are treated exactly like "not linked": same backoff, no abort
        assert_eq!(outcome, Some(LinkOutcome::Linked));
        assert_eq!(probe.call_offsets_ms(), vec![2_000, 6_000, 14_000]);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_popup_ends_the_session_without_probing_again() {
        let probe = ScriptedProbe::new(vec![]);
        let (popup, popup_state) = FakePopup::closing_after(3);

        let mut session = LinkPoller::start(probe.clone(), popup, default_timing());
        let outcome = session.wait().await;

        assert_eq!(outcome, Some(LinkOutcome::PopupClosed));
        // Ticks 1 and 2 probed; tick 3 found the window closed first
        assert_eq!(probe.call_offsets_ms(), vec![2_000, 6_000]);
        // Closing an already-closed window is never requested
        assert_eq!(popup_state.close_requests.load(Ordering::SeqCst), 0);

        // No Linked/TimedOut ever fires afterward
        tokio::time::sleep(Duration::from_secs(700)).await;
        assert_eq!(session.state(), LinkState::PopupClosed);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fires_regardless_of_tick_timer() {
        let probe = ScriptedProbe::new(vec![]);
        let (popup, popup_state) = FakePopup::pair();

        let mut session = LinkPoller::start(probe.clone(), popup, default_timing());
        let outcome = session.wait().await;

        assert_eq!(outcome, Some(LinkOutcome::TimedOut));
        assert_eq!(probe.started.elapsed(), Duration::from_millis(600_000));
        assert_eq!(popup_state.close_requests.load(Ordering::SeqCst), 1);

        // All capped delays after the ramp-up: 2,4,8,16,30,30,... seconds
        let offsets = probe.call_offsets_ms();
        assert_eq!(offsets[..5].to_vec(), vec![2_000, 6_000, 14_000, 30_000, 60_000]);
        // The tick due exactly at the deadline loses to the watchdog
        assert_eq!(*offsets.last().unwrap(), 570_000);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_clears_pending_timers() {
        let probe = ScriptedProbe::new(vec![]);
        let (popup, _) = FakePopup::pair();

        let mut session = LinkPoller::start(probe.clone(), popup, default_timing());
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(probe.call_offsets_ms(), vec![2_000]);

        session.cancel();
        assert_eq!(session.wait().await, None);

        // No tick ever fires against the cancelled session
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(probe.call_offsets_ms(), vec![2_000]);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_state_is_idempotent() {
        let probe = ScriptedProbe::new(vec![Ok(true)]);
        let (popup, popup_state) = FakePopup::pair();

        let mut session = LinkPoller::start(probe.clone(), popup, default_timing());
        assert_eq!(session.wait().await, Some(LinkOutcome::Linked));

        // cancel() after a terminal state is a no-op
        session.cancel();
        session.cancel();
        assert_eq!(session.wait().await, Some(LinkOutcome::Linked));
        assert_eq!(session.state(), LinkState::Linked);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(probe.call_offsets_ms(), vec![2_000]);
        assert_eq!(popup_state.close_requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_session_cancels_it() {
        let probe = ScriptedProbe::new(vec![]);
        let (popup, _) = FakePopup::pair();

        let session = LinkPoller::start(probe.clone(), popup, default_timing());
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        drop(session);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(probe.call_offsets_ms(), vec![2_000]);
    }
}
