use std::time::Duration;
use tokio::time::{interval, Instant, Interval};

/// Fixed-period ticker reporting the real time elapsed between ticks.
pub(crate) struct Timer {
    interval: Interval,
    last_tick: Instant,
    interval_dur: Duration,
}

impl Timer {
    pub async fn new(interval_dur: Duration) -> Self {
        let mut interval = interval(interval_dur);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // NOTE: First tick completes instantly
        let last_tick = interval.tick().await;
        Self {
            interval,
            last_tick,
            interval_dur,
        }
    }

    pub async fn tick(&mut self) -> Duration {
        let next = self.interval.tick().await;
        let elapsed = next - self.last_tick;
        self.last_tick = next;
        elapsed
    }

    /// Time since the last tick, for a final partial window.
    pub fn since_tick(&self) -> Duration {
        self.last_tick.elapsed()
    }
}

impl std::fmt::Display for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", humantime::format_duration(self.interval_dur))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_at_interval() {
        let mut timer = Timer::new(Duration::from_millis(250)).await;
        assert_eq!(timer.to_string(), "250ms");

        let elapsed = timer.tick().await;
        assert_eq!(elapsed, Duration::from_millis(250));
    }
}
