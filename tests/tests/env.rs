mod utils;
use utils::*;

use clap::Parser;
use mock_service::prelude::*;
use optikorm_load::{ApiClient, Cli, Session};
use std::time::Duration;

// Only test in this binary: it owns the process environment.
#[tokio::test]
async fn environment_configures_the_run() {
    init();
    let server = spawn(Behavior::default()).await.unwrap();

    std::env::set_var("LOCUST_HOST", server.url());
    std::env::set_var("CREATE_RESOURCES", "0");
    std::env::set_var("LOCUST_USERNAME_PREFIX", "env_admin");
    std::env::set_var("LOCUST_WAIT_MIN", "2");
    std::env::set_var("LOCUST_WAIT_MAX", "1");
    std::env::set_var("LOCUST_RUN_TIME", "90s");

    let cli = Cli::try_parse_from(["optikorm-load"]).unwrap();
    let config = cli.load_config();

    assert_eq!(config.host, server.url());
    assert!(!config.create_resources);
    assert_eq!(config.username_prefix, "env_admin");
    assert_eq!(config.wait.min(), Duration::from_secs(1));
    assert_eq!(config.wait.max(), Duration::from_secs(2));
    assert_eq!(cli.run_settings().run_time, Some(Duration::from_secs(90)));

    let mut session = Session::new(ApiClient::new(&config));
    session.bootstrap(&config, "env_admin_1").await;

    assert!(session.auth.is_authenticated());
    assert_eq!(server.state.count(&Method::POST, "/api/nutrients/"), 0);
    assert_eq!(server.state.count(&Method::POST, "/api/fish/"), 0);
    assert_eq!(server.state.count(&Method::POST, "/api/feeds/"), 0);
}
