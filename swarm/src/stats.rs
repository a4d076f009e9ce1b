use crate::measurement::{default_tdigest, quantile_of};
use crate::transaction::LabelSample;
use pdatastructs::tdigest::{TDigest, K1};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Run Statistics for a finished swarm.
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub name: String,
    pub users: usize,
    pub elapsed: Duration,
    pub success: u64,
    pub error: u64,
    pub actual_tps: f64,
    pub error_rate: f64,
    pub latency_p50: Duration,
    pub latency_p90: Duration,
    pub latency_p99: Duration,
    /// One entry per transaction label, sorted by label.
    pub transactions: Vec<TransactionStatistics>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionStatistics {
    pub name: &'static str,
    pub success: u64,
    pub error: u64,
    pub latency_p50: Duration,
    pub latency_p90: Duration,
    pub latency_p99: Duration,
}

impl RunStatistics {
    pub fn transaction(&self, name: &str) -> Option<&TransactionStatistics> {
        self.transactions.iter().find(|t| t.name == name)
    }

    pub fn total(&self) -> u64 {
        self.success + self.error
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: users={} elapsed={} requests={} failures={} TPS={:.2} ErrorRate={:.2} p50={:?} p90={:?} p99={:?}",
            self.name,
            self.users,
            humantime::format_duration(round_millis(self.elapsed)),
            self.total(),
            self.error,
            self.actual_tps,
            self.error_rate,
            self.latency_p50,
            self.latency_p90,
            self.latency_p99,
        )?;
        writeln!(
            f,
            "{:<32} {:>10} {:>10} {:>12} {:>12} {:>12}",
            "transaction", "success", "error", "p50", "p90", "p99"
        )?;
        for t in &self.transactions {
            writeln!(
                f,
                "{:<32} {:>10} {:>10} {:>12} {:>12} {:>12}",
                t.name,
                t.success,
                t.error,
                format!("{:?}", t.latency_p50),
                format!("{:?}", t.latency_p90),
                format!("{:?}", t.latency_p99),
            )?;
        }
        Ok(())
    }
}

fn round_millis(d: Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}

/// Running totals of a swarm, fed by each drained window.
pub(crate) struct Totals {
    all: Tally,
    labels: BTreeMap<&'static str, Tally>,
}

struct Tally {
    success: u64,
    error: u64,
    latency: TDigest<K1>,
}

impl Tally {
    fn new() -> Self {
        Self {
            success: 0,
            error: 0,
            latency: default_tdigest(),
        }
    }

    fn absorb(&mut self, sample: &LabelSample) {
        self.success += sample.success;
        self.error += sample.error;
        for latency in &sample.latencies {
            self.latency.insert(latency.as_secs_f64());
        }
    }
}

impl Totals {
    pub fn new() -> Self {
        Self {
            all: Tally::new(),
            labels: BTreeMap::new(),
        }
    }

    pub fn absorb(&mut self, samples: &[LabelSample]) {
        for sample in samples {
            if sample.success + sample.error == 0 {
                continue;
            }
            self.all.absorb(sample);
            self.labels
                .entry(sample.name)
                .or_insert_with(Tally::new)
                .absorb(sample);
        }
    }

    pub fn finish(self, name: &str, users: usize, elapsed: Duration) -> RunStatistics {
        let total = self.all.success + self.all.error;
        let secs = elapsed.as_secs_f64();

        let transactions = self
            .labels
            .iter()
            .map(|(name, tally)| TransactionStatistics {
                name: *name,
                success: tally.success,
                error: tally.error,
                latency_p50: quantile_of(&tally.latency, 0.5),
                latency_p90: quantile_of(&tally.latency, 0.9),
                latency_p99: quantile_of(&tally.latency, 0.99),
            })
            .collect();

        RunStatistics {
            name: name.to_string(),
            users,
            elapsed,
            success: self.all.success,
            error: self.all.error,
            actual_tps: if secs > 0. { total as f64 / secs } else { 0. },
            error_rate: if total > 0 {
                self.all.error as f64 / total as f64
            } else {
                0.
            },
            latency_p50: quantile_of(&self.all.latency, 0.5),
            latency_p90: quantile_of(&self.all.latency, 0.9),
            latency_p99: quantile_of(&self.all.latency, 0.99),
            transactions,
        }
    }
}
