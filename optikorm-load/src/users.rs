//! Simulated user profiles
use crate::api::CalculateRequest;
use crate::auth::random_username;
use crate::client::ApiClient;
use crate::config::LoadConfig;
use crate::requests;
use crate::session::Session;
use std::sync::Arc;
use swarm::{TaskSet, User, WaitTime};
#[allow(unused)]
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptikormTask {
    /// List nutrients, fish and feeds.
    ListResources,
    /// Calculate for the seeded fish, or with an empty selection when there is none.
    Calculate,
    /// Liveness ping on the API root.
    PingRoot,
}

impl OptikormTask {
    pub const WEIGHTS: [(OptikormTask, u32); 3] = [
        (OptikormTask::ListResources, 3),
        (OptikormTask::Calculate, 2),
        (OptikormTask::PingRoot, 1),
    ];
}

/// Registers an admin account, seeds one resource graph, then exercises the read and
/// calculation endpoints.
pub struct OptikormUser {
    config: Arc<LoadConfig>,
    username: String,
    session: Session,
}

impl OptikormUser {
    pub fn new(config: Arc<LoadConfig>) -> Self {
        let client = ApiClient::new(&config);
        let username = random_username(&config.username_prefix);
        Self {
            config,
            username,
            session: Session::new(client),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl User for OptikormUser {
    type Task = OptikormTask;

    fn tasks(&self) -> TaskSet<OptikormTask> {
        TaskSet::new(OptikormTask::WEIGHTS)
    }

    fn wait_time(&self) -> WaitTime {
        self.config.wait
    }

    async fn on_start(&mut self) {
        self.session.bootstrap(&self.config, &self.username).await;
    }

    async fn run_task(&mut self, task: OptikormTask) {
        let client = &self.session.client;
        // Failures are already tallied by the transaction hook.
        match task {
            OptikormTask::ListResources => {
                let _ = requests::list_nutrients(client).await;
                let _ = requests::list_fish(client).await;
                let _ = requests::list_feeds(client).await;
            }
            OptikormTask::Calculate => {
                let request = CalculateRequest::for_fish(self.session.ids.fish);
                if request.fish_selections.is_empty() {
                    trace!("{} has no fish, probing the error path", self.username);
                }
                let _ = requests::calculate(client, &request).await;
            }
            OptikormTask::PingRoot => {
                let _ = requests::api_root(client).await;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderTask {
    ReadBasic,
}

/// Anonymous user hammering the nutrient list with no pacing, to saturate the load generator.
pub struct SimpleReader {
    client: ApiClient,
}

impl SimpleReader {
    pub fn new(config: &LoadConfig) -> Self {
        Self {
            client: ApiClient::new(config),
        }
    }
}

impl User for SimpleReader {
    type Task = ReaderTask;

    fn tasks(&self) -> TaskSet<ReaderTask> {
        TaskSet::single(ReaderTask::ReadBasic)
    }

    fn wait_time(&self) -> WaitTime {
        WaitTime::zero()
    }

    async fn on_start(&mut self) {}

    async fn run_task(&mut self, task: ReaderTask) {
        match task {
            ReaderTask::ReadBasic => {
                let _ = requests::list_nutrients(&self.client).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optikorm_weights() {
        let user = OptikormUser::new(Arc::new(LoadConfig::default()));
        assert_eq!(user.tasks().total_weight(), 6);
        assert!(user.username().starts_with("locust_admin_"));
        assert!(!user.session().auth.is_authenticated());
    }

    #[test]
    fn reader_never_waits() {
        let reader = SimpleReader::new(&LoadConfig::default());
        assert!(reader.wait_time().is_zero());
        assert_eq!(reader.tasks().total_weight(), 1);
    }
}
