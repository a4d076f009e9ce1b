mod utils;
use utils::*;

use mock_service::prelude::*;
use optikorm_load::{runner, Profile, RunSettings};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

fn settings(profile: Profile, users: usize) -> RunSettings {
    RunSettings {
        profile,
        users,
        spawn_rate: 0.,
        run_time: Some(Duration::from_secs(2)),
        tps: None,
        report_interval: Duration::from_millis(500),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn optikorm_profile_against_mock() {
    init();
    let (server, config) = mock(Behavior::default()).await;

    let stats = runner::run(settings(Profile::Optikorm, 2), Arc::new(config)).await;

    assert_eq!(stats.len(), 1);
    let stats = &stats[0];
    println!("{stats}");

    assert_eq!(stats.name, "optikorm");
    assert_eq!(stats.users, 2);

    let register = stats.transaction("POST api/auth/register/").unwrap();
    assert_eq!((register.success, register.error), (2, 0));
    assert!(stats.transaction("POST api/auth/login/").is_none());
    assert_eq!(stats.transaction("POST api/nutrients/").unwrap().success, 2);

    for label in [
        "GET api/nutrients/",
        "GET api/fish/",
        "GET api/feeds/",
        "POST api/calculate/",
        "GET api/",
    ] {
        let t = stats.transaction(label).unwrap();
        assert!(t.success > 0, "{label} never succeeded");
        assert_eq!(t.error, 0, "{label} failed");
    }

    assert_eq!(stats.error, 0);
    assert_eq!(server.state.count(&Method::POST, "/api/fish/"), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_profile_splits_users() {
    init();
    let (_server, config) = mock(Behavior::default()).await;

    let stats = runner::run(settings(Profile::Mixed, 3), Arc::new(config)).await;

    assert_eq!(stats.len(), 2);
    assert_eq!((stats[0].name.as_str(), stats[0].users), ("optikorm", 2));
    assert_eq!((stats[1].name.as_str(), stats[1].users), ("simple_reader", 1));

    let reader = &stats[1];
    assert_eq!(reader.transactions.len(), 1);
    assert!(reader.transaction("GET api/nutrients/").unwrap().success > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_backend_is_tallied() {
    init();
    let (_server, config) = mock(Behavior {
        register_conflict: true,
        reject_login: true,
        ..Behavior::default()
    })
    .await;

    let stats = runner::run(settings(Profile::Optikorm, 2), Arc::new(config)).await;
    let stats = &stats[0];

    assert_eq!(stats.transaction("POST api/auth/register/").unwrap().error, 2);
    assert_eq!(stats.transaction("POST api/auth/login/").unwrap().error, 2);
    assert!(stats.transaction("POST api/nutrients/").is_none());

    // Anonymous calculations are rejected, reads still pass.
    assert!(stats.transaction("POST api/calculate/").unwrap().error > 0);
    assert!(stats.transaction("GET api/").unwrap().success > 0);
    assert!(stats.error_rate > 0.);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tps_cap_limits_reader() {
    init();
    let (_server, config) = mock(Behavior::default()).await;

    let mut settings = settings(Profile::SimpleReader, 4);
    settings.tps = NonZeroU32::new(20);

    let stats = runner::run(settings, Arc::new(config)).await;

    assert!(stats[0].total() > 0);
    assert!(stats[0].total() <= 50, "{} requests", stats[0].total());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tps_cap_spans_mixed_profiles() {
    init();
    let (_server, config) = mock(Behavior::default()).await;

    let mut settings = settings(Profile::Mixed, 4);
    settings.tps = NonZeroU32::new(20);

    let stats = runner::run(settings, Arc::new(config)).await;

    let combined: u64 = stats.iter().map(|s| s.total()).sum();
    assert!(stats[1].total() > 0);
    assert!(combined <= 50, "{combined} requests");
}
