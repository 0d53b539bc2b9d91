use std::time::Duration;

use tokio::runtime::Handle;

use super::{wall_clock, Scheduler, Task, TaskHandle};

/// Spawns tasks onto a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
  handle: Handle,
}

impl TokioScheduler {
  pub fn new(handle: Handle) -> Self { Self { handle } }

  /// Uses the runtime of the calling context, if any.
  pub fn current() -> Option<Self> { Handle::try_current().ok().map(Self::new) }
}

impl Scheduler for TokioScheduler {
  #[inline]
  fn now(&self) -> Duration { wall_clock() }

  fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle {
    let handle = TaskHandle::new();
    let c_handle = handle.clone();
    self.handle.spawn(async move {
      if !delay.is_zero() && !c_handle.is_cancelled() {
        tokio::time::sleep(delay).await;
      }
      c_handle.run(task);
    });
    handle
  }
}

#[cfg(test)]
mod tests {
  use tokio::sync::oneshot;

  use super::*;

  #[rxcore_macro::test(shared)]
  async fn runs_on_runtime() {
    let scheduler = TokioScheduler::current().unwrap();
    let (tx, rx) = oneshot::channel();
    scheduler.schedule_after(
      Duration::from_millis(5),
      Box::new(move || {
        let _ = tx.send(7);
      }),
    );
    assert_eq!(rx.await.unwrap(), 7);
  }
}
