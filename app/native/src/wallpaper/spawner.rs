//! Detached background tasks.

use std::future::Future;
use std::pin::Pin;

use parking_lot::Mutex;
use tokio::task::JoinSet;

/// A boxed future with no output, ready to be detached.
pub type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Runs tasks in the background with no return channel.
///
/// Whatever a task wants to report it must log itself; the spawner never
/// surfaces errors or results to the code that spawned it.
pub trait TaskSpawner: Send + Sync {
    /// Starts `task` without waiting for it. `name` is used in logs only.
    fn spawn(&self, name: &'static str, task: BoxedTask);
}

/// Spawns tasks onto the current tokio runtime.
///
/// Tasks are tracked only so the process can call [`TokioSpawner::wait_idle`]
/// before shutting the runtime down; nothing else ever observes them.
/// Dropping the spawner aborts whatever is still running.
#[derive(Default)]
pub struct TokioSpawner {
    tasks: Mutex<JoinSet<()>>,
}

impl TokioSpawner {
    /// Creates a spawner with no tasks.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Number of tasks spawned and not yet reaped by `wait_idle`.
    #[must_use]
    pub fn pending(&self) -> usize { self.tasks.lock().len() }

    /// Waits until every spawned task, including ones spawned while
    /// waiting, has finished.
    pub async fn wait_idle(&self) {
        loop {
            let mut set = std::mem::take(&mut *self.tasks.lock());
            if set.is_empty() {
                break;
            }

            while let Some(result) = set.join_next().await {
                if let Err(err) = result {
                    tracing::warn!(error = %err, "spawner: background task panicked");
                }
            }
        }
    }
}

impl TaskSpawner for TokioSpawner {
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    fn spawn(&self, name: &'static str, task: BoxedTask) {
        self.tasks.lock().spawn(async move {
            tracing::trace!(task = name, "spawner: task started");
            task.await;
            tracing::trace!(task = name, "spawner: task finished");
        });
    }
}
