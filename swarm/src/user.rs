//! Simulated users
use crate::task_set::TaskSet;
use crate::wait::WaitTime;
use std::fmt;

/// Index of a spawned user within its swarm, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub usize);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user-{}", self.0)
    }
}

/// One simulated user.
///
/// A swarm calls [`on_start`](User::on_start) once, then repeatedly picks a task from
/// [`tasks`](User::tasks), runs it, and sleeps for a [`wait_time`](User::wait_time) sample,
/// until the swarm ends. Implement [`User`]; `LocalUser` is the variant without `Send` bounds.
///
/// # Example
/// ```no_run
/// use swarm::prelude::*;
///
/// #[derive(Debug, Clone, Copy)]
/// enum Task {
///     Browse,
///     Buy,
/// }
///
/// struct Shopper;
///
/// impl User for Shopper {
///     type Task = Task;
///
///     fn tasks(&self) -> TaskSet<Task> {
///         TaskSet::new([(Task::Browse, 9), (Task::Buy, 1)])
///     }
///
///     fn wait_time(&self) -> WaitTime {
///         WaitTime::zero()
///     }
///
///     async fn on_start(&mut self) {}
///
///     async fn run_task(&mut self, task: Task) {
///         match task {
///             Task::Browse => {}
///             Task::Buy => {}
///         }
///     }
/// }
/// ```
#[trait_variant::make(User: Send)]
pub trait LocalUser {
    type Task: Copy + fmt::Debug + Send + Sync + 'static;

    fn tasks(&self) -> TaskSet<Self::Task>;

    fn wait_time(&self) -> WaitTime;

    async fn on_start(&mut self);

    async fn run_task(&mut self, task: Self::Task);
}
