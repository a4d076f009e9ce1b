//! Swarm runner
use crate::config::SwarmConfig;
use crate::measurement::Measurement;
use crate::stats::{RunStatistics, Totals};
use crate::timer::Timer;
use crate::transaction::{TransactionData, TransactionRegistry, TRANSACTION_HOOK};
use crate::user::{User, UserId};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::{
    future::Future,
    num::NonZeroU32,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Instant, Interval, MissedTickBehavior};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// A population of simulated users hitting a target for a while.
///
/// `factory` builds one [`User`] per spawned slot. Awaiting the swarm runs it to completion and
/// yields the [`RunStatistics`].
///
/// # Example
/// ```no_run
/// use swarm::prelude::*;
/// use std::time::Duration;
///
/// #[derive(Debug, Clone, Copy)]
/// struct Idle;
///
/// struct Sleeper;
///
/// impl User for Sleeper {
///     type Task = Idle;
///     fn tasks(&self) -> TaskSet<Idle> {
///         TaskSet::single(Idle)
///     }
///     fn wait_time(&self) -> WaitTime {
///         WaitTime::constant(Duration::from_secs(1))
///     }
///     async fn on_start(&mut self) {}
///     async fn run_task(&mut self, _task: Idle) {}
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let stats = Swarm::new("sleepers", |_| Sleeper)
///         .users(10)
///         .spawn_rate(2.)
///         .duration(Duration::from_secs(30))
///         .await;
///     println!("{stats}");
/// }
/// ```
#[pin_project::pin_project]
pub struct Swarm<F> {
    factory: F,
    runner_fut: Option<Pin<Box<dyn Future<Output = RunStatistics> + Send>>>,
    config: SwarmConfig,
    limit: Option<TpsLimit>,
}

impl<F> Swarm<F> {
    pub fn new(name: &str, factory: F) -> Self {
        Self {
            factory,
            runner_fut: None,
            config: SwarmConfig::new(name),
            limit: None,
        }
    }

    /// Number of users to run concurrently.
    pub fn users(mut self, users: usize) -> Self {
        self.config.users = users;
        self
    }

    /// Users started per second until all are running.
    pub fn spawn_rate(mut self, spawn_rate: f64) -> Self {
        self.config.spawn_rate = spawn_rate;
        self
    }

    /// Run the swarm for the given duration. Without one it runs until Ctrl-C.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = Some(duration);
        self
    }

    /// Cap the transactions per second across all users.
    pub fn tps(self, tps: NonZeroU32) -> Self {
        self.limit(TpsLimit::new(tps))
    }

    /// Share a transaction cap with every other swarm holding a clone of `limit`.
    pub fn limit(mut self, limit: TpsLimit) -> Self {
        self.config.max_tps = Some(limit.tps());
        self.limit = Some(limit);
        self
    }

    pub fn report_interval(mut self, report_interval: Duration) -> Self {
        self.config.report_interval = report_interval;
        self
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }
}

impl<F, U> Future for Swarm<F>
where
    F: Fn(UserId) -> U + Send + Sync + Clone + 'static,
    U: User + Send + 'static,
{
    type Output = RunStatistics;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.runner_fut.is_none() {
            let factory = self.factory.clone();
            let config = self.config.clone();
            let limit = self.limit.clone();
            self.runner_fut = Some(Box::pin(async move {
                run_swarm(factory, config, limit).await
            }));
        }

        if let Some(runner) = &mut self.runner_fut {
            runner.as_mut().poll(cx)
        } else {
            unreachable!()
        }
    }
}

#[instrument(name = "swarm", skip_all, fields(name = config.name))]
pub(crate) async fn run_swarm<F, U>(
    factory: F,
    config: SwarmConfig,
    limit: Option<TpsLimit>,
) -> RunStatistics
where
    F: Fn(UserId) -> U + Send + Sync + 'static,
    U: User + Send + 'static,
{
    info!("Running {} with config {:?}", config.name, &config);

    let start = Instant::now();
    let hook = TransactionData {
        limiter: limit.map(|limit| limit.limiter),
        registry: Arc::new(TransactionRegistry::default()),
    };
    let mut spawner = Spawner::new(
        factory,
        hook.clone(),
        config.users,
        config.spawn_interval(),
    );
    let mut timer = Timer::new(config.effective_report_interval()).await;
    let mut totals = Totals::new();

    let finished = deadline(config.duration);
    tokio::pin!(finished);
    let interrupt = interrupted();
    tokio::pin!(interrupt);

    debug!("Reporting every {timer}");
    loop {
        tokio::select! {
            _ = spawner.spawn_next(), if !spawner.is_complete() => {
                if spawner.is_complete() {
                    info!("All {} users spawned", spawner.spawned());
                }
            }
            elapsed = timer.tick() => {
                let samples = hook.registry.drain();
                let measurement = Measurement::from_samples(&samples, elapsed);
                totals.absorb(&samples);
                info!(users = spawner.spawned(), "{measurement}");
            }
            _ = &mut finished => break,
            _ = &mut interrupt => {
                warn!("Interrupted, stopping users.");
                break;
            }
        }
    }

    let users = spawner.spawned();
    spawner.shutdown().await;

    let samples = hook.registry.drain();
    let measurement = Measurement::from_samples(&samples, timer.since_tick());
    totals.absorb(&samples);
    debug!("Final window: {measurement}");

    info!("Swarm complete");
    totals.finish(&config.name, users, start.elapsed())
}

async fn deadline(duration: Option<Duration>) {
    match duration {
        Some(duration) => sleep(duration).await,
        None => std::future::pending().await,
    }
}

async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
}

struct Spawner<F> {
    factory: F,
    hook: TransactionData,
    target: usize,
    interval: Option<Interval>,
    tasks: Vec<JoinHandle<()>>,
}

impl<F, U> Spawner<F>
where
    F: Fn(UserId) -> U,
    U: User + Send + 'static,
{
    fn new(
        factory: F,
        hook: TransactionData,
        target: usize,
        spawn_interval: Option<Duration>,
    ) -> Self {
        let interval = spawn_interval.map(|dur| {
            let mut ticker = interval(dur);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            ticker
        });

        Self {
            factory,
            hook,
            target,
            interval,
            tasks: vec![],
        }
    }

    fn is_complete(&self) -> bool {
        self.tasks.len() >= self.target
    }

    fn spawned(&self) -> usize {
        self.tasks.len()
    }

    /// Spawn the next user once the spawn interval allows it, or every remaining user at once
    /// when there is no interval.
    async fn spawn_next(&mut self) {
        match &mut self.interval {
            Some(interval) => {
                interval.tick().await;
                self.spawn_user();
            }
            None => {
                while !self.is_complete() {
                    self.spawn_user();
                }
            }
        }
    }

    fn spawn_user(&mut self) {
        let id = UserId(self.tasks.len());
        let user = (self.factory)(id);
        self.tasks.push(tokio::spawn(TRANSACTION_HOOK.scope(
            self.hook.clone(),
            run_user(id, user).in_current_span(),
        )));
    }

    async fn shutdown(self) {
        for handle in &self.tasks {
            handle.abort();
        }
        for handle in self.tasks {
            // Cancelled is the expected outcome here.
            if let Err(err) = handle.await {
                if err.is_panic() {
                    error!("User task panicked: {err}");
                }
            }
        }
    }
}

async fn run_user<U: User>(id: UserId, mut user: U) {
    debug!("Starting {id}");
    user.on_start().await;

    let tasks = user.tasks();
    let mut rng = SmallRng::from_entropy();
    loop {
        let Some(task) = tasks.pick(&mut rng) else {
            warn!("{id} has no runnable tasks, stopping.");
            return;
        };

        trace!("{id} running {task:?}");
        user.run_task(task).await;

        let pause = user.wait_time().sample(&mut rng);
        if pause.is_zero() {
            // Zero-wait users must still yield to the scheduler.
            tokio::task::yield_now().await;
        } else {
            sleep(pause).await;
        }
    }
}

/// Transactions-per-second cap. Clones share one limiter.
#[derive(Clone)]
pub struct TpsLimit {
    tps: NonZeroU32,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl TpsLimit {
    pub fn new(tps: NonZeroU32) -> Self {
        Self {
            tps,
            limiter: Arc::new(RateLimiter::direct(
                Quota::per_second(tps).allow_burst(NonZeroU32::MIN),
            )),
        }
    }

    pub fn tps(&self) -> NonZeroU32 {
        self.tps
    }
}

impl std::fmt::Debug for TpsLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TpsLimit").field("tps", &self.tps).finish()
    }
}
