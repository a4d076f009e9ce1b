use mock_service::{Behavior, MockServer};
use optikorm_load::LoadConfig;
use std::sync::OnceLock;
use swarm::WaitTime;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        let _ = FmtSubscriber::builder()
            .with_env_filter("swarm=debug,optikorm_load=debug,mock_service=info")
            .with_test_writer()
            .try_init();
    });
}

/// Fresh mock plus a config pointed at it.
#[allow(unused)]
pub async fn mock(behavior: Behavior) -> (MockServer, LoadConfig) {
    let server = mock_service::spawn(behavior)
        .await
        .expect("mock service binds");
    let config = LoadConfig {
        host: server.url(),
        wait: WaitTime::zero(),
        ..LoadConfig::default()
    };
    (server, config)
}
