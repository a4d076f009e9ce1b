mod utils;
use utils::*;

use mock_service::prelude::*;
use optikorm_load::users::OptikormTask;
use optikorm_load::{requests, ApiClient, AuthOutcome, LoadConfig, OptikormUser, Session};
use std::sync::Arc;
use swarm::User;

async fn bootstrap(config: &LoadConfig, username: &str) -> Session {
    let mut session = Session::new(ApiClient::new(config));
    session.bootstrap(config, username).await;
    session
}

#[tokio::test]
async fn registration_seeds_resources() -> anyhow::Result<()> {
    let (server, config) = mock(Behavior::default()).await;

    let session = bootstrap(&config, "locust_admin_reg").await;

    assert!(session.auth.is_authenticated());
    assert!(session.ids.nutrient.is_some());
    assert!(session.ids.fish.is_some());
    assert!(session.ids.feed.is_some());

    assert!(server.state.has_account("locust_admin_reg"));
    assert_eq!(server.state.count(&Method::POST, "/api/auth/login/"), 0);
    assert_eq!(server.state.count(&Method::POST, "/api/nutrients/"), 1);
    assert_eq!(server.state.count(&Method::POST, "/api/fish/"), 1);
    assert_eq!(server.state.count(&Method::POST, "/api/feeds/"), 1);

    requests::list_nutrients(&session.client).await?;
    let last = server.state.requests().pop().unwrap();
    assert_eq!(last.path, "/api/nutrients/");
    assert!(last.authorization.unwrap().starts_with("Token "));

    Ok(())
}

#[tokio::test]
async fn conflict_falls_back_to_login() {
    let (server, config) = mock(Behavior {
        register_conflict: true,
        ..Behavior::default()
    })
    .await;

    let session = bootstrap(&config, "locust_admin_conflict").await;

    assert!(session.auth.is_authenticated());
    assert_eq!(server.state.count(&Method::POST, "/api/auth/register/"), 1);
    assert_eq!(server.state.count(&Method::POST, "/api/auth/login/"), 1);
    assert!(session.ids.fish.is_some());
}

#[tracing_test::traced_test]
#[tokio::test]
async fn no_token_runs_anonymous() {
    let (server, config) = mock(Behavior {
        register_conflict: true,
        reject_login: true,
        ..Behavior::default()
    })
    .await;

    let session = bootstrap(&config, "locust_admin_anon").await;

    assert_eq!(session.auth, AuthOutcome::Anonymous);
    assert!(!session.client.is_authorized());
    assert_eq!(session.ids, Default::default());
    assert!(logs_contain("No token obtained for user locust_admin_anon"));

    assert_eq!(server.state.count(&Method::POST, "/api/auth/login/"), 1);
    assert_eq!(server.state.count(&Method::POST, "/api/nutrients/"), 0);
    assert_eq!(server.state.count(&Method::POST, "/api/fish/"), 0);
    assert_eq!(server.state.count(&Method::POST, "/api/feeds/"), 0);

    requests::list_fish(&session.client).await.unwrap();
    let last = server.state.requests().pop().unwrap();
    assert_eq!(last.path, "/api/fish/");
    assert_eq!(last.authorization, None);
}

#[tracing_test::traced_test]
#[tokio::test]
async fn garbled_registration_falls_back_to_login() {
    let (server, config) = mock(Behavior {
        garbled_register: true,
        ..Behavior::default()
    })
    .await;

    let session = bootstrap(&config, "locust_admin_garbled").await;

    assert!(session.auth.is_authenticated());
    assert_eq!(server.state.count(&Method::POST, "/api/auth/login/"), 1);
    assert!(logs_contain("Failed to parse register response"));
}

#[tokio::test]
async fn seeding_disabled() {
    let (server, mut config) = mock(Behavior::default()).await;
    config.create_resources = false;

    let session = bootstrap(&config, "locust_admin_noseed").await;

    assert!(session.auth.is_authenticated());
    assert_eq!(session.ids, Default::default());
    assert_eq!(server.state.count(&Method::POST, "/api/nutrients/"), 0);
    assert_eq!(server.state.count(&Method::POST, "/api/fish/"), 0);
    assert_eq!(server.state.count(&Method::POST, "/api/feeds/"), 0);
}

#[tokio::test]
async fn failed_nutrient_skips_fish_and_feed() {
    let (server, config) = mock(Behavior {
        reject_nutrients: true,
        ..Behavior::default()
    })
    .await;

    let mut user = OptikormUser::new(Arc::new(config));
    user.on_start().await;

    assert!(user.session().auth.is_authenticated());
    assert_eq!(user.session().ids, Default::default());
    assert_eq!(server.state.count(&Method::POST, "/api/nutrients/"), 1);
    assert_eq!(server.state.count(&Method::POST, "/api/fish/"), 0);
    assert_eq!(server.state.count(&Method::POST, "/api/feeds/"), 0);

    // Still probes the calculation endpoint, with nothing selected.
    user.run_task(OptikormTask::Calculate).await;
    let calculations = server.state.calculations();
    assert_eq!(calculations.len(), 1);
    assert!(calculations[0].fish_selections.is_empty());
}

#[tokio::test]
async fn rejected_fish_still_creates_feed() {
    let (server, config) = mock(Behavior {
        reject_fish: true,
        ..Behavior::default()
    })
    .await;

    let session = bootstrap(&config, "locust_admin_nofish").await;

    assert!(session.ids.nutrient.is_some());
    assert_eq!(session.ids.fish, None);
    assert!(session.ids.feed.is_some());
    assert_eq!(server.state.count(&Method::POST, "/api/feeds/"), 1);
}

#[tokio::test]
async fn calculation_uses_seeded_fish() {
    let (server, config) = mock(Behavior::default()).await;

    let mut user = OptikormUser::new(Arc::new(config));
    user.on_start().await;
    let fish = user.session().ids.fish.unwrap();

    user.run_task(OptikormTask::Calculate).await;

    let calculations = server.state.calculations();
    assert_eq!(calculations.len(), 1);
    assert_eq!(calculations[0].fish_selections.len(), 1);
    assert_eq!(calculations[0].fish_selections[0].fish_id, fish);
    assert_eq!(calculations[0].fish_selections[0].weight, 100.0);
}

#[tokio::test]
async fn list_task_reads_every_resource() {
    let (server, config) = mock(Behavior::default()).await;

    let mut user = OptikormUser::new(Arc::new(config));
    user.on_start().await;
    user.run_task(OptikormTask::ListResources).await;
    user.run_task(OptikormTask::PingRoot).await;

    assert_eq!(server.state.count(&Method::GET, "/api/nutrients/"), 1);
    assert_eq!(server.state.count(&Method::GET, "/api/fish/"), 1);
    assert_eq!(server.state.count(&Method::GET, "/api/feeds/"), 1);
    assert_eq!(server.state.count(&Method::GET, "/api/"), 1);
}
