use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Weighted set of tasks a user picks from between waits.
///
/// Weights are relative: a task with weight 3 is picked three times as often as a task with
/// weight 1. Zero-weight entries are never picked.
#[derive(Debug, Clone)]
pub struct TaskSet<T> {
    tasks: Vec<T>,
    total: u64,
    // `None` when no task has a positive weight.
    index: Option<WeightedIndex<u32>>,
}

impl<T: Copy> TaskSet<T> {
    pub fn new(tasks: impl IntoIterator<Item = (T, u32)>) -> Self {
        let (tasks, weights): (Vec<T>, Vec<u32>) =
            tasks.into_iter().filter(|(_, w)| *w > 0).unzip();

        Self {
            total: weights.iter().map(|w| u64::from(*w)).sum(),
            index: WeightedIndex::new(&weights).ok(),
            tasks,
        }
    }

    pub fn single(task: T) -> Self {
        Self::new([(task, 1)])
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.total
    }

    /// Pick a task with probability proportional to its weight, `None` if nothing is runnable.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        let index = self.index.as_ref()?;
        self.tasks.get(index.sample(rng)).copied()
    }
}
