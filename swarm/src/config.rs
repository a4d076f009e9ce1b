use std::num::NonZeroU32;
use std::time::Duration;

/// The default interval between two logged measurements.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest accepted interval between two logged measurements.
pub const MIN_REPORT_INTERVAL: Duration = Duration::from_millis(1);

/// The default number of users spawned per second.
pub const DEFAULT_SPAWN_RATE: f64 = 1.;

#[derive(Clone, Debug)]
pub struct SwarmConfig {
    pub name: String,
    pub users: usize,
    /// Users started per second. A non-positive or non-finite rate starts everyone at once.
    pub spawn_rate: f64,
    /// Run until interrupted when unset.
    pub duration: Option<Duration>,
    /// Global transaction cap shared by all users.
    pub max_tps: Option<NonZeroU32>,
    pub report_interval: Duration,
}

impl SwarmConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            users: 1,
            spawn_rate: DEFAULT_SPAWN_RATE,
            duration: None,
            max_tps: None,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    /// Delay between two user spawns, `None` when every user starts immediately.
    ///
    /// Rates so high that the delay rounds down to zero also start everyone at once.
    pub fn spawn_interval(&self) -> Option<Duration> {
        if !(self.spawn_rate.is_finite() && self.spawn_rate > 0.) {
            return None;
        }
        Some(Duration::from_secs_f64(1. / self.spawn_rate)).filter(|dur| !dur.is_zero())
    }

    /// `report_interval`, raised to [`MIN_REPORT_INTERVAL`].
    pub fn effective_report_interval(&self) -> Duration {
        self.report_interval.max(MIN_REPORT_INTERVAL)
    }
}
