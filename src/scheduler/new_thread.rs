use std::{thread, time::Duration};

use super::{wall_clock, Scheduler, SchedulerConfig, Task, TaskHandle};

/// Runs every task on a freshly spawned OS thread.
#[derive(Debug, Clone, Default)]
pub struct NewThreadScheduler {
  config: SchedulerConfig,
}

impl NewThreadScheduler {
  pub fn new(config: SchedulerConfig) -> Self { Self { config } }
}

impl Scheduler for NewThreadScheduler {
  #[inline]
  fn now(&self) -> Duration { wall_clock() }

  fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle {
    let handle = TaskHandle::new();
    let c_handle = handle.clone();
    let spawned = thread::Builder::new()
      .name(format!("{}thread", self.config.thread_name_prefix))
      .spawn(move || {
        if !delay.is_zero() {
          thread::sleep(delay);
        }
        c_handle.run(task);
      });
    if let Err(err) = spawned {
      // The task was moved into the failed closure and is gone.
      tracing::warn!(%err, "failed to spawn scheduler thread");
      handle.mark_finished();
    }
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::sync::mpsc;

  use super::*;
  use crate::subscription::SubscriptionLike;

  #[rxcore_macro::test]
  fn runs_off_the_caller_thread() {
    let (tx, rx) = mpsc::channel();
    let caller = thread::current().id();
    NewThreadScheduler::default().schedule_now(Box::new(move || {
      tx.send(thread::current().id()).unwrap();
    }));
    let worker = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_ne!(worker, caller);
  }

  #[rxcore_macro::test]
  fn cancel_before_due() {
    let (tx, rx) = mpsc::channel::<()>();
    let mut handle = NewThreadScheduler::default().schedule_after(
      Duration::from_millis(50),
      Box::new(move || {
        let _ = tx.send(());
      }),
    );
    handle.unsubscribe();
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
  }
}
