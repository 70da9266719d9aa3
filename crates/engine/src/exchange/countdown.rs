//! Resend cooldown for verification codes.
//!
//! A one-second ticking task owned by the flow controller. Remaining time
//! is derived from a deadline on the tokio clock, so the value is the same
//! whether or not the ticker has run yet.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

pub struct Countdown {
    length: Duration,
    deadline: Arc<Mutex<Option<Instant>>>,
    seconds: Arc<watch::Sender<u32>>,
    cancel: Mutex<CancellationToken>,
}

impl Countdown {
    pub fn new(length: Duration) -> Self {
        let (seconds, _) = watch::channel(0);
        Self {
            length,
            deadline: Arc::new(Mutex::new(None)),
            seconds: Arc::new(seconds),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Start (or restart) the countdown from its full length.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let deadline = Instant::now() + self.length;
        if let Ok(mut slot) = self.deadline.lock() {
            *slot = Some(deadline);
        }

        let token = CancellationToken::new();
        if let Ok(mut current) = self.cancel.lock() {
            current.cancel();
            *current = token.clone();
        }

        self.seconds.send_replace(seconds_until(deadline));
        debug!("Code cooldown started: {}s", self.length.as_secs());

        tokio::spawn(tick(deadline, token, self.seconds.clone()));
    }

    /// Seconds left, rounded up; 0 when idle
    pub fn remaining(&self) -> u32 {
        self.deadline
            .lock()
            .ok()
            .and_then(|slot| *slot)
            .map(seconds_until)
            .unwrap_or(0)
    }

    pub fn is_active(&self) -> bool {
        self.remaining() > 0
    }

    /// Stop ticking and reset to 0
    pub fn cancel(&self) {
        if let Ok(current) = self.cancel.lock() {
            current.cancel();
        }
        if let Ok(mut slot) = self.deadline.lock() {
            *slot = None;
        }
        self.seconds.send_replace(0);
    }

    /// Per-second updates for display
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.seconds.subscribe()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Ok(current) = self.cancel.lock() {
            current.cancel();
        }
    }
}

async fn tick(deadline: Instant, cancel: CancellationToken, seconds: Arc<watch::Sender<u32>>) {
    let mut interval = interval_at(Instant::now() + TICK, TICK);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = interval.tick() => {
                let left = seconds_until(deadline);
                seconds.send_replace(left);
                if left == 0 {
                    debug!("Code cooldown finished");
                    return;
                }
            }
        }
    }
}

fn seconds_until(deadline: Instant) -> u32 {
    let left = deadline.saturating_duration_since(Instant::now());
    let whole = left.as_secs() + u64::from(left.subsec_nanos() > 0);
    u32::try_from(whole).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_to_zero() {
        let countdown = Countdown::new(Duration::from_secs(60));
        assert_eq!(countdown.remaining(), 0);

        countdown.start();
        assert_eq!(countdown.remaining(), 60);

        advance(Duration::from_secs(15)).await;
        assert_eq!(countdown.remaining(), 45);

        advance(Duration::from_millis(44_500)).await;
        assert_eq!(countdown.remaining(), 1);

        advance(Duration::from_millis(500)).await;
        assert_eq!(countdown.remaining(), 0);
        assert!(!countdown.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_publishes_updates() {
        let countdown = Countdown::new(Duration::from_secs(3));
        let mut rx = countdown.subscribe();

        countdown.start();
        assert_eq!(*rx.borrow_and_update(), 3);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 2);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_resets() {
        let countdown = Countdown::new(Duration::from_secs(60));
        countdown.start();
        advance(Duration::from_secs(10)).await;

        countdown.cancel();
        assert_eq!(countdown.remaining(), 0);
        assert_eq!(*countdown.subscribe().borrow(), 0);

        countdown.start();
        assert_eq!(countdown.remaining(), 60);
    }
}
