use std::{thread, time::Duration};

use super::{wall_clock, Scheduler, Task, TaskHandle};

/// Runs every task inline on the calling thread.
///
/// A delayed task blocks the caller for the delay before it runs, so this is
/// only suitable where blocking is acceptable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  #[inline]
  fn now(&self) -> Duration { wall_clock() }

  fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle {
    if !delay.is_zero() {
      thread::sleep(delay);
    }
    let handle = TaskHandle::new();
    handle.run(task);
    handle
  }
}
