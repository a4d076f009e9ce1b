use crate::transaction::LabelSample;
use pdatastructs::tdigest::{TDigest, K1};
use std::fmt;
use std::time::Duration;

const TDIGEST_BACKLOG_SIZE: usize = 100;

/// One reporting window of a swarm run.
#[derive(Debug, Clone)]
pub struct Measurement {
    pub success: u64,
    pub error: u64,
    pub tps: f64,
    pub error_rate: f64,
    pub elapsed: Duration,
    latency: TDigest<K1>,
}

impl Measurement {
    pub fn new(success: u64, error: u64, elapsed: Duration) -> Self {
        let total = success + error;
        let secs = elapsed.as_secs_f64();
        let tps = if secs > 0. { total as f64 / secs } else { 0. };
        let error_rate = if total > 0 {
            error as f64 / total as f64
        } else {
            0.
        };

        Self {
            success,
            error,
            tps,
            error_rate,
            elapsed,
            latency: default_tdigest(),
        }
    }

    pub(crate) fn from_samples(samples: &[LabelSample], elapsed: Duration) -> Self {
        let success = samples.iter().map(|s| s.success).sum();
        let error = samples.iter().map(|s| s.error).sum();
        let mut measurement = Self::new(success, error, elapsed);
        for sample in samples {
            measurement.populate_latencies(&sample.latencies);
        }
        measurement
    }

    pub fn populate_latencies(&mut self, dur: &[Duration]) {
        for latency in dur {
            self.latency.insert(latency.as_secs_f64());
        }
    }

    pub fn latency(&self, quantile: f64) -> Duration {
        quantile_of(&self.latency, quantile)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TPS={:.2}, ErrorRate={:.2}, p50={:?}, p90={:?}, p99={:?}",
            self.tps,
            self.error_rate,
            self.latency(0.5),
            self.latency(0.90),
            self.latency(0.99),
        )
    }
}

pub(crate) fn default_tdigest() -> TDigest<K1> {
    TDigest::new(K1::new(10.), TDIGEST_BACKLOG_SIZE)
}

pub(crate) fn quantile_of(digest: &TDigest<K1>, quantile: f64) -> Duration {
    let secs = digest.quantile(quantile);

    // An empty digest reports NaN.
    let secs = if secs.is_finite() && secs >= 0. {
        secs
    } else {
        0.
    };

    Duration::from_secs_f64(secs)
}
