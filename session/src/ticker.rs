use std::future;

use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};

/// Cancellable periodic timer for the clock.
///
/// Armed while the game clock runs, released otherwise. A released ticker
/// never yields, so a `select!` branch on [`Ticker::next_tick`] stays
/// silent without needing a guard.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    interval: Option<Interval>,
    /// Point up to which elapsed time has been handed out.
    last: Instant,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
            last: Instant::now(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Start ticking from now. No-op when already armed.
    pub fn arm(&mut self) {
        if self.is_armed() {
            return;
        }
        let start = Instant::now();
        let mut interval = time::interval_at(start + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        self.last = start;
        tracing::debug!(period_ms = self.period.as_millis() as u64, "Ticker armed");
    }

    /// Stop ticking. Pending time is dropped.
    pub fn release(&mut self) {
        if self.interval.take().is_some() {
            tracing::debug!("Ticker released");
        }
    }

    /// Arm or release to match `should_run`.
    pub fn sync(&mut self, should_run: bool) {
        if should_run {
            self.arm();
        } else {
            self.release();
        }
    }

    /// Milliseconds since the last tick or flush, then restart the count.
    /// Zero when released.
    pub fn flush(&mut self) -> u64 {
        if !self.is_armed() {
            return 0;
        }
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed.as_millis() as u64
    }

    /// Wait for the next period and return the milliseconds elapsed since
    /// the previous tick or flush. Pending forever while released.
    pub async fn next_tick(&mut self) -> u64 {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
                self.flush()
            }
            None => future::pending().await,
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.release();
    }
}
