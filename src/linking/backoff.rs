//! Exponential backoff for the linked-status poll loop

use std::time::Duration;

/// Exponential backoff calculator
///
/// Delays grow as `base * 2^attempt`, capped at a maximum. No jitter: the
/// observed delay sequence is part of the polling contract.
#[derive(Debug, Clone)]
pub struct Backoff {
    base_delay: Duration,
    max_delay: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
            attempt: 0,
        }
    }

    /// Delay to wait before the next check, advancing the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.delay_for(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Delay for a specific attempt without advancing the counter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        // 2^attempt * base_delay, saturating well past the cap
        let multiplier = 2u64.saturating_pow(attempt.min(32));
        let delay_ms = (self.base_delay.as_millis() as u64).saturating_mul(multiplier);
        Duration::from_millis(delay_ms.min(self.max_delay.as_millis() as u64))
    }

    /// Attempts elapsed so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_until_the_cap() {
        let mut backoff = Backoff::new(Duration::from_millis(2_000), Duration::from_millis(30_000));

        let delays: Vec<u64> = (0..6).map(|_| backoff.next_delay().as_millis() as u64).collect();
        assert_eq!(delays, vec![2_000, 4_000, 8_000, 16_000, 30_000, 30_000]);
        assert_eq!(backoff.attempt(), 6);
    }

    #[test]
    fn delay_for_is_pure() {
        let backoff = Backoff::new(Duration::from_millis(2_000), Duration::from_millis(30_000));

        assert_eq!(backoff.delay_for(0), Duration::from_millis(2_000));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(16_000));
        assert_eq!(backoff.delay_for(10), Duration::from_millis(30_000));
        assert_eq!(backoff.attempt(), 0);
    }

    #[test]
    fn huge_attempt_counts_do_not_overflow() {
        let backoff = Backoff::new(Duration::from_millis(2_000), Duration::from_millis(30_000));
        assert_eq!(backoff.delay_for(u32::MAX), Duration::from_millis(30_000));
    }

    #[test]
    fn reset_restarts_the_schedule() {
        let mut backoff = Backoff::new(Duration::from_millis(2_000), Duration::from_millis(30_000));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(2_000));
    }
}
