use governor::DefaultDirectRateLimiter;
use metrics_util::AtomicBucket;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
};

/// Transaction hook used by the `#[transaction]` macro.
///
/// Inside a running [`Swarm`](crate::Swarm) the future waits on the swarm's TPS limiter (if
/// any), is timed, and its outcome is tallied under `label`. Outside of a swarm the future is
/// simply awaited.
pub async fn transaction_hook<T, R, E>(label: &'static str, func: T) -> T::Output
where
    T: Future<Output = Result<R, E>>,
{
    if let Ok(hook) = TRANSACTION_HOOK.try_with(|v| v.clone()) {
        if let Some(limiter) = &hook.limiter {
            limiter.until_ready().await;
        }

        let start = Instant::now();
        let res = func.await;
        let elapsed = start.elapsed();

        hook.registry.record(label, res.is_ok(), elapsed);

        #[cfg(feature = "metrics")]
        record_metrics(label, res.is_ok(), elapsed);

        res
    } else {
        tracing::debug!("No hook available for {label}.");
        func.await
    }
}

#[cfg(feature = "metrics")]
fn record_metrics(label: &'static str, success: bool, elapsed: Duration) {
    metrics::histogram!("swarm_transaction_latency_seconds", "transaction" => label)
        .record(elapsed.as_secs_f64());

    if success {
        metrics::counter!("swarm_transaction_success", "transaction" => label).increment(1);
    } else {
        metrics::counter!("swarm_transaction_error", "transaction" => label).increment(1);
    }
}

#[derive(Clone)]
pub(crate) struct TransactionData {
    pub limiter: Option<Arc<DefaultDirectRateLimiter>>,
    pub registry: Arc<TransactionRegistry>,
}

tokio::task_local! {
    pub(crate) static TRANSACTION_HOOK: TransactionData;
}

/// Per-label tallies shared between user tasks and the reporting loop.
#[derive(Default)]
pub(crate) struct TransactionRegistry {
    labels: RwLock<HashMap<&'static str, Arc<LabelAtomics>>>,
}

pub(crate) struct LabelAtomics {
    success: AtomicU64,
    error: AtomicU64,
    latency: AtomicBucket<Duration>,
}

impl LabelAtomics {
    fn new() -> Self {
        Self {
            success: AtomicU64::new(0),
            error: AtomicU64::new(0),
            latency: AtomicBucket::new(),
        }
    }
}

/// Everything recorded for one label since the previous drain.
#[derive(Debug)]
pub(crate) struct LabelSample {
    pub name: &'static str,
    pub success: u64,
    pub error: u64,
    pub latencies: Vec<Duration>,
}

impl TransactionRegistry {
    pub fn record(&self, label: &'static str, success: bool, elapsed: Duration) {
        let atomics = self.label(label);
        if success {
            atomics.success.fetch_add(1, Ordering::Relaxed);
        } else {
            atomics.error.fetch_add(1, Ordering::Relaxed);
        }
        atomics.latency.push(elapsed);
    }

    fn label(&self, label: &'static str) -> Arc<LabelAtomics> {
        // A poisoned lock only means another user task panicked mid-insert; the map is still
        // usable.
        {
            let labels = self.labels.read().unwrap_or_else(|e| e.into_inner());
            if let Some(atomics) = labels.get(label) {
                return atomics.clone();
            }
        }

        self.labels
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(label)
            .or_insert_with(|| Arc::new(LabelAtomics::new()))
            .clone()
    }

    pub fn drain(&self) -> Vec<LabelSample> {
        let labels = self.labels.read().unwrap_or_else(|e| e.into_inner());
        labels
            .iter()
            .map(|(name, atomics)| {
                let mut latencies = vec![];
                atomics
                    .latency
                    .clear_with(|dur| latencies.extend_from_slice(dur));
                LabelSample {
                    name: *name,
                    success: atomics.success.swap(0, Ordering::Relaxed),
                    error: atomics.error.swap(0, Ordering::Relaxed),
                    latencies,
                }
            })
            .collect()
    }
}
