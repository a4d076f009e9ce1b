use crate::config::{LoadConfig, Profile, RunSettings};
use crate::users::{OptikormUser, SimpleReader};
use std::sync::Arc;
use swarm::{RunStatistics, Swarm, TpsLimit};
use tracing::info;

/// Run the configured profile(s) and return one [`RunStatistics`] per profile.
///
/// A `--tps` cap holds across every user, including both halves of a mixed run.
pub async fn run(settings: RunSettings, config: Arc<LoadConfig>) -> Vec<RunStatistics> {
    info!("Targeting {}", config.api_base());
    let limit = settings.tps.map(TpsLimit::new);

    match settings.profile {
        Profile::Optikorm => vec![optikorm(&settings, limit, config).await],
        Profile::SimpleReader => vec![simple_reader(&settings, limit, config).await],
        Profile::Mixed => {
            let (optikorm_settings, reader_settings) = settings.split();
            let (a, b) = tokio::join!(
                optikorm(&optikorm_settings, limit.clone(), config.clone()),
                simple_reader(&reader_settings, limit, config),
            );
            vec![a, b]
        }
    }
}

async fn optikorm(
    settings: &RunSettings,
    limit: Option<TpsLimit>,
    config: Arc<LoadConfig>,
) -> RunStatistics {
    configure(
        Swarm::new("optikorm", move |_| OptikormUser::new(config.clone())),
        settings,
        limit,
    )
    .await
}

async fn simple_reader(
    settings: &RunSettings,
    limit: Option<TpsLimit>,
    config: Arc<LoadConfig>,
) -> RunStatistics {
    configure(
        Swarm::new("simple_reader", move |_| SimpleReader::new(&config)),
        settings,
        limit,
    )
    .await
}

fn configure<F>(swarm: Swarm<F>, settings: &RunSettings, limit: Option<TpsLimit>) -> Swarm<F> {
    let mut swarm = swarm
        .users(settings.users)
        .spawn_rate(settings.spawn_rate)
        .report_interval(settings.report_interval);

    if let Some(run_time) = settings.run_time {
        swarm = swarm.duration(run_time);
    }
    if let Some(limit) = limit {
        swarm = swarm.limit(limit);
    }
    swarm
}
