//! A small user-based load generation harness.
//!
//! A [`Swarm`] spawns simulated [`User`]s as tokio tasks. Every user runs its `on_start` once,
//! then keeps picking weighted tasks from its [`TaskSet`] and pausing for a [`WaitTime`] sample
//! in between. HTTP calls (or any fallible async work) wrapped in `#[transaction]` are timed and
//! tallied per label; the swarm logs a [`Measurement`] every report interval and returns
//! [`RunStatistics`] when it ends.

pub mod config;
pub mod measurement;
pub mod runner;
pub mod stats;
pub mod task_set;
#[doc(hidden)]
pub mod transaction;
pub mod user;
pub mod wait;

mod timer;

pub use config::SwarmConfig;
pub use measurement::Measurement;
pub use runner::{Swarm, TpsLimit};
pub use stats::{RunStatistics, TransactionStatistics};
pub use swarm_macros::transaction;
pub use task_set::TaskSet;
pub use user::{LocalUser, User, UserId};
pub use wait::WaitTime;

pub mod prelude {
    pub use crate::runner::Swarm;
    pub use crate::stats::RunStatistics;
    pub use crate::task_set::TaskSet;
    pub use crate::user::{User, UserId};
    pub use crate::wait::WaitTime;
    pub use swarm_macros::transaction;
}
