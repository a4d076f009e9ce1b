use rand::Rng;
use std::time::Duration;

/// Pause a user takes between two tasks, drawn uniformly from `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaitTime {
    min: Duration,
    max: Duration,
}

impl WaitTime {
    /// No pacing: the next task starts as soon as the previous one finished.
    pub const fn zero() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub const fn constant(wait: Duration) -> Self {
        Self {
            min: wait,
            max: wait,
        }
    }

    /// Bounds given in either order are accepted.
    pub fn between(a: Duration, b: Duration) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min == self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn zero_never_waits() {
        let mut rng = SmallRng::seed_from_u64(1);
        let wait = WaitTime::zero();
        assert!(wait.is_zero());
        assert_eq!(wait.sample(&mut rng), Duration::ZERO);
    }

    #[test]
    fn samples_within_bounds() {
        let mut rng = SmallRng::seed_from_u64(7);
        let wait = WaitTime::between(Duration::from_secs(3), Duration::from_secs(1));
        assert_eq!(wait.min(), Duration::from_secs(1));
        assert_eq!(wait.max(), Duration::from_secs(3));

        for _ in 0..1_000 {
            let sample = wait.sample(&mut rng);
            assert!(sample >= Duration::from_secs(1) && sample <= Duration::from_secs(3));
        }
    }

    #[test]
    fn constant_is_fixed() {
        let mut rng = SmallRng::seed_from_u64(3);
        let wait = WaitTime::constant(Duration::from_millis(40));
        assert!(!wait.is_zero());
        assert_eq!(wait.sample(&mut rng), Duration::from_millis(40));
    }
}
