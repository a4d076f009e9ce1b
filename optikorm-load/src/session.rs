use crate::auth::{self, AuthOutcome};
use crate::client::ApiClient;
use crate::config::LoadConfig;
use crate::seed::{self, ResourceIds};
use tracing::debug;

/// State of one simulated user: its client, how it authenticated, and what it created.
///
/// Only mutated during [`Session::bootstrap`].
#[derive(Debug, Clone)]
pub struct Session {
    pub client: ApiClient,
    pub auth: AuthOutcome,
    pub ids: ResourceIds,
}

impl Session {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            auth: AuthOutcome::Anonymous,
            ids: ResourceIds::default(),
        }
    }

    /// Authenticate `username`, then seed resources when enabled and a token was obtained.
    pub async fn bootstrap(&mut self, config: &LoadConfig, username: &str) {
        self.auth = auth::resolve(&self.client, username, &config.password).await;
        self.client.authorize(&self.auth);

        if !self.auth.is_authenticated() {
            return;
        }

        if config.create_resources {
            self.ids = seed::seed(&self.client).await;
            debug!("Seeded {:?} for {username}", self.ids);
        }
    }
}
