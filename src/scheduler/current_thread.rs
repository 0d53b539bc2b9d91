use std::{cell::RefCell, cmp::Ordering, collections::BinaryHeap, thread, time::Duration};

use super::{wall_clock, Scheduler, Task, TaskHandle};

/// Runs work on the calling thread through a trampoline.
///
/// The first schedule call on a thread drains the queue before returning.
/// Work scheduled while the queue drains (from inside a task) is queued
/// rather than run recursively, ordered by due time and FIFO among equal due
/// times.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentThreadScheduler;

struct QueuedTask {
  due: Duration,
  seq: usize,
  task: Task,
  handle: TaskHandle,
}

impl PartialEq for QueuedTask {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for QueuedTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier due first, then FIFO by seq
    other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
  }
}

#[derive(Default)]
struct Trampoline {
  queue: BinaryHeap<QueuedTask>,
  next_seq: usize,
  running: bool,
}

thread_local! {
  static TRAMPOLINE: RefCell<Trampoline> = RefCell::new(Trampoline::default());
}

struct RunningGuard;

impl Drop for RunningGuard {
  fn drop(&mut self) {
    // Whatever a panicking task left behind is dropped with the drain.
    let leftover = TRAMPOLINE.with(|t| {
      let mut t = t.borrow_mut();
      t.running = false;
      std::mem::take(&mut t.queue)
    });
    drop(leftover);
  }
}

impl CurrentThreadScheduler {
  /// Returns `true` while this thread is draining the trampoline.
  pub fn is_running() -> bool { TRAMPOLINE.with(|t| t.borrow().running) }

  fn drain() {
    let _guard = RunningGuard;
    loop {
      let Some(item) = TRAMPOLINE.with(|t| t.borrow_mut().queue.pop()) else {
        break;
      };
      if item.handle.is_cancelled() {
        item.handle.mark_finished();
        continue;
      }
      let now = wall_clock();
      if item.due > now {
        thread::sleep(item.due - now);
      }
      tracing::trace!(seq = item.seq, "current-thread task");
      item.handle.run(item.task);
    }
  }
}

impl Scheduler for CurrentThreadScheduler {
  #[inline]
  fn now(&self) -> Duration { wall_clock() }

  fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle {
    let handle = TaskHandle::new();
    let start_drain = TRAMPOLINE.with(|t| {
      let mut t = t.borrow_mut();
      let seq = t.next_seq;
      t.next_seq += 1;
      t.queue.push(QueuedTask { due: wall_clock() + delay, seq, task, handle: handle.clone() });
      if t.running {
        false
      } else {
        t.running = true;
        true
      }
    });
    if start_drain {
      Self::drain();
    }
    handle
  }
}
