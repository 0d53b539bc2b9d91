use std::time::Duration;

use futures::executor::ThreadPool;

use super::{wall_clock, Scheduler, SchedulerConfig, Task, TaskHandle};
use crate::error::RxError;

/// Runs tasks on a `futures` thread pool; delays are `futures-time` sleeps
/// so no worker is blocked while a task waits.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

impl ThreadPoolScheduler {
  pub fn new(config: SchedulerConfig) -> Result<Self, RxError> {
    let mut builder = ThreadPool::builder();
    builder.name_prefix(config.thread_name_prefix);
    if let Some(size) = config.pool_size {
      if size == 0 {
        return Err(RxError::out_of_range("pool_size", "must be greater than zero"));
      }
      builder.pool_size(size);
    }
    let pool = builder.create().map_err(|err| RxError::ThreadPool(err.to_string()))?;
    Ok(Self { pool })
  }
}

impl Scheduler for ThreadPoolScheduler {
  #[inline]
  fn now(&self) -> Duration { wall_clock() }

  fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle {
    let handle = TaskHandle::new();
    let c_handle = handle.clone();
    self.pool.spawn_ok(async move {
      if !delay.is_zero() && !c_handle.is_cancelled() {
        futures_time::task::sleep(delay.into()).await;
      }
      c_handle.run(task);
    });
    handle
  }
}

impl std::fmt::Debug for ThreadPoolScheduler {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ThreadPoolScheduler").finish_non_exhaustive()
  }
}
