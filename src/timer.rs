//! One-second scheduler that drives [`crate::ExamSession::tick`].

use std::future;
use std::time::Duration;

use tokio::time::{self, Interval, MissedTickBehavior};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct Countdown {
    interval: Option<Interval>,
}

impl Countdown {
    /// Armed countdown whose first tick fires one period from now.
    pub fn start() -> Self {
        let mut interval = time::interval_at(time::Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval: Some(interval),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next period. Never resolves once cancelled, so it can
    /// sit in a `select!` arm for the whole run.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }

    /// Restart the period from now, discarding ticks that piled up while
    /// the exam screen was not showing.
    pub fn restart(&mut self) {
        if let Some(interval) = self.interval.as_mut() {
            interval.reset();
        }
    }

    /// Disarm the countdown. Returns true only for the call that disarmed it.
    pub fn cancel(&mut self) -> bool {
        self.interval.take().is_some()
    }
}

/// `MM:SS`; minutes keep counting past an hour.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
