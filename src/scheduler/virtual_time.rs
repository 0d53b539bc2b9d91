//! A manually advanced clock with a queue of scheduled actions.
//!
//! Nothing runs until the clock is moved with [`advance_to`], [`advance_by`]
//! or [`start`], so the same sequence of schedule calls always executes in the
//! same order and at the same virtual instants:
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use rxcore::scheduler::VirtualTimeScheduler;
//!
//! let scheduler = VirtualTimeScheduler::new();
//! let log = Arc::new(Mutex::new(vec![]));
//! for t in [300, 100, 200] {
//!   let log = log.clone();
//!   scheduler.schedule_absolute(t, move || log.lock().unwrap().push(t));
//! }
//! scheduler.advance_to(300).unwrap();
//! assert_eq!(*log.lock().unwrap(), vec![100, 200, 300]);
//! ```
//!
//! [`advance_to`]: VirtualTimeScheduler::advance_to
//! [`advance_by`]: VirtualTimeScheduler::advance_by
//! [`start`]: VirtualTimeScheduler::start

use std::{cmp::Ordering, collections::BinaryHeap, fmt, sync::Arc, time::Duration};

use parking_lot::Mutex;

use super::{Scheduler, Task, TaskHandle};
use crate::error::RxError;

/// Virtual clock value in ticks.
pub type VirtualTime = u64;

struct ScheduledItem {
  due: VirtualTime,
  seq: usize,
  action: Task,
  handle: TaskHandle,
}

impl PartialEq for ScheduledItem {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl Eq for ScheduledItem {}

impl PartialOrd for ScheduledItem {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledItem {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by seq
    other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
  }
}

#[derive(Default)]
struct State {
  clock: VirtualTime,
  queue: BinaryHeap<ScheduledItem>,
  next_seq: usize,
  enabled: bool,
}

/// Deterministic scheduler driven by a virtual clock.
///
/// Clones share the same clock and queue. Used through the [`Scheduler`]
/// trait, one tick is one millisecond and sub-millisecond delays round up to
/// the next tick.
///
/// # Scheduling in the past
///
/// An action scheduled at a time earlier than the clock is clamped to the
/// current clock: it runs at the next drain step, and the clock never moves
/// backwards to honour it.
#[derive(Clone, Default)]
pub struct VirtualTimeScheduler(Arc<Mutex<State>>);

/// Resets the enabled flag when a drain ends, including when an action panics.
struct DrainGuard<'a>(&'a VirtualTimeScheduler);

impl Drop for DrainGuard<'_> {
  fn drop(&mut self) { self.0 .0.lock().enabled = false; }
}

impl VirtualTimeScheduler {
  pub fn new() -> Self { Self::default() }

  /// Starts the clock at `initial` instead of zero.
  pub fn with_clock(initial: VirtualTime) -> Self {
    Self(Arc::new(Mutex::new(State { clock: initial, ..State::default() })))
  }

  #[inline]
  pub fn clock(&self) -> VirtualTime { self.0.lock().clock }

  /// Returns `true` while the scheduler is draining its queue.
  pub fn is_enabled(&self) -> bool { self.0.lock().enabled }

  /// Number of queued actions that were not cancelled.
  pub fn pending_count(&self) -> usize {
    self.0.lock().queue.iter().filter(|item| !item.handle.is_cancelled()).count()
  }

  /// Schedules `action` at the absolute virtual time `due`, clamped to the
  /// current clock.
  pub fn schedule_absolute(
    &self, due: VirtualTime, action: impl FnOnce() + Send + 'static,
  ) -> TaskHandle {
    self.enqueue(Some(due), 0, Box::new(action))
  }

  /// Schedules `action` `delay` ticks after the current clock.
  pub fn schedule_relative(
    &self, delay: VirtualTime, action: impl FnOnce() + Send + 'static,
  ) -> TaskHandle {
    self.enqueue(None, delay, Box::new(action))
  }

  fn enqueue(&self, due: Option<VirtualTime>, delay: VirtualTime, action: Task) -> TaskHandle {
    let handle = TaskHandle::new();
    let mut state = self.0.lock();
    let due = match due {
      Some(due) => due.max(state.clock),
      None => state.clock.saturating_add(delay),
    };
    let seq = state.next_seq;
    state.next_seq += 1;
    tracing::trace!(due, seq, "virtual task scheduled");
    state.queue.push(ScheduledItem { due, seq, action, handle: handle.clone() });
    handle
  }

  /// Runs every action due at or before `target` in time order, then sets the
  /// clock to `target`.
  ///
  /// Actions scheduled while draining join the same drain if they are due by
  /// `target`. Returns `RxError::ClockRewind` if `target` is before the clock
  /// and `RxError::SchedulerRunning` if called from inside a running action.
  pub fn advance_to(&self, target: VirtualTime) -> Result<(), RxError> {
    {
      let state = self.0.lock();
      if state.enabled {
        return Err(RxError::SchedulerRunning);
      }
      if target < state.clock {
        return Err(RxError::ClockRewind { now: state.clock, target });
      }
    }
    self.drain(target)?;
    self.0.lock().clock = target;
    Ok(())
  }

  pub fn advance_by(&self, ticks: VirtualTime) -> Result<(), RxError> {
    let target = self.clock().saturating_add(ticks);
    self.advance_to(target)
  }

  /// Runs queued actions until the queue is empty or [`stop`](Self::stop) is
  /// called from inside an action. The clock stays at the last action's time.
  pub fn start(&self) -> Result<(), RxError> { self.drain(VirtualTime::MAX) }

  /// Ends the current drain after the running action returns.
  pub fn stop(&self) { self.0.lock().enabled = false; }

  /// Moves the clock forward without running anything.
  pub fn sleep(&self, ticks: VirtualTime) {
    let mut state = self.0.lock();
    state.clock = state.clock.saturating_add(ticks);
  }

  fn drain(&self, limit: VirtualTime) -> Result<(), RxError> {
    {
      let mut state = self.0.lock();
      if state.enabled {
        return Err(RxError::SchedulerRunning);
      }
      state.enabled = true;
    }
    let _guard = DrainGuard(self);
    while let Some(item) = self.next_due(limit) {
      tracing::trace!(due = item.due, seq = item.seq, "virtual task run");
      item.handle.run(item.action);
    }
    Ok(())
  }

  /// Pops the next live action due by `limit` and moves the clock to it.
  /// Cancelled entries are discarded without touching the clock.
  fn next_due(&self, limit: VirtualTime) -> Option<ScheduledItem> {
    let mut state = self.0.lock();
    loop {
      if !state.enabled {
        return None;
      }
      match state.queue.peek() {
        Some(item) if item.due <= limit => {}
        _ => return None,
      }
      let item = state.queue.pop()?;
      if item.handle.is_cancelled() {
        item.handle.mark_finished();
        continue;
      }
      state.clock = state.clock.max(item.due);
      return Some(item);
    }
  }
}

/// Ticks for `d`, rounding sub-millisecond remainders up.
fn to_ticks(d: Duration) -> VirtualTime {
  VirtualTime::try_from(d.as_nanos().div_ceil(1_000_000)).unwrap_or(VirtualTime::MAX)
}

impl Scheduler for VirtualTimeScheduler {
  fn now(&self) -> Duration { Duration::from_millis(self.clock()) }

  fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle {
    self.enqueue(None, to_ticks(delay), task)
  }

  fn schedule_at(&self, due: Duration, task: Task) -> TaskHandle {
    self.enqueue(Some(to_ticks(due)), 0, task)
  }
}

impl fmt::Debug for VirtualTimeScheduler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.0.lock();
    f.debug_struct("VirtualTimeScheduler")
      .field("clock", &state.clock)
      .field("pending", &state.queue.len())
      .field("enabled", &state.enabled)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::panic::{self, AssertUnwindSafe};

  use super::*;
  use crate::subscription::SubscriptionLike;

  type Log = Arc<Mutex<Vec<(VirtualTime, &'static str)>>>;

  fn record(
    scheduler: &VirtualTimeScheduler, log: &Log, name: &'static str,
  ) -> impl FnOnce() + Send + 'static {
    let scheduler = scheduler.clone();
    let log = log.clone();
    move || log.lock().push((scheduler.clock(), name))
  }

  #[rxcore_macro::test]
  fn runs_in_time_order_and_clamps_to_target() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Log::default();
    scheduler.schedule_absolute(300, record(&scheduler, &log, "c"));
    scheduler.schedule_absolute(100, record(&scheduler, &log, "a"));
    scheduler.schedule_absolute(200, record(&scheduler, &log, "b"));

    scheduler.advance_to(250).unwrap();
    assert_eq!(*log.lock(), vec![(100, "a"), (200, "b")]);
    assert_eq!(scheduler.clock(), 250);

    scheduler.advance_to(300).unwrap();
    assert_eq!(log.lock().last(), Some(&(300, "c")));
  }

  #[rxcore_macro::test]
  fn equal_due_times_are_fifo() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Log::default();
    for name in ["first", "second", "third"] {
      scheduler.schedule_absolute(10, record(&scheduler, &log, name));
    }
    scheduler.start().unwrap();
    assert_eq!(*log.lock(), vec![(10, "first"), (10, "second"), (10, "third")]);
  }

  #[rxcore_macro::test]
  fn past_due_is_clamped_to_now() {
    let scheduler = VirtualTimeScheduler::new();
    scheduler.advance_to(500).unwrap();
    let log = Log::default();
    scheduler.schedule_absolute(100, record(&scheduler, &log, "late"));
    assert_eq!(scheduler.pending_count(), 1);

    scheduler.advance_to(500).unwrap();
    assert_eq!(*log.lock(), vec![(500, "late")]);
  }

  #[rxcore_macro::test]
  fn scheduled_during_drain_joins_same_drain() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Log::default();
    let (c_scheduler, c_log) = (scheduler.clone(), log.clone());
    scheduler.schedule_absolute(100, move || {
      c_scheduler.schedule_relative(50, record(&c_scheduler, &c_log, "inner"));
      c_scheduler.schedule_absolute(400, record(&c_scheduler, &c_log, "later"));
    });
    scheduler.advance_to(200).unwrap();
    assert_eq!(*log.lock(), vec![(150, "inner")]);
    assert_eq!(scheduler.pending_count(), 1);
  }

  #[rxcore_macro::test]
  fn rewind_is_rejected() {
    let scheduler = VirtualTimeScheduler::with_clock(300);
    assert_eq!(scheduler.advance_to(100), Err(RxError::ClockRewind { now: 300, target: 100 }));
    assert_eq!(scheduler.clock(), 300);
  }

  #[rxcore_macro::test]
  fn reentrant_advance_is_rejected() {
    let scheduler = VirtualTimeScheduler::new();
    let result = Arc::new(Mutex::new(None));
    let (c_scheduler, c_result) = (scheduler.clone(), result.clone());
    scheduler.schedule_absolute(10, move || {
      *c_result.lock() = Some(c_scheduler.advance_to(20));
    });
    scheduler.advance_to(10).unwrap();
    assert_eq!(*result.lock(), Some(Err(RxError::SchedulerRunning)));
  }

  #[rxcore_macro::test]
  fn stop_halts_start() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Log::default();
    let c_scheduler = scheduler.clone();
    scheduler.schedule_absolute(10, record(&scheduler, &log, "a"));
    scheduler.schedule_absolute(20, move || c_scheduler.stop());
    scheduler.schedule_absolute(30, record(&scheduler, &log, "b"));

    scheduler.start().unwrap();
    assert_eq!(*log.lock(), vec![(10, "a")]);
    assert_eq!(scheduler.clock(), 20);
    assert!(!scheduler.is_enabled());

    scheduler.start().unwrap();
    assert_eq!(log.lock().last(), Some(&(30, "b")));
  }

  #[rxcore_macro::test]
  fn cancelled_entries_do_not_move_clock() {
    let scheduler = VirtualTimeScheduler::new();
    let mut handle = scheduler.schedule_absolute(700, || unreachable!());
    handle.unsubscribe();
    assert_eq!(scheduler.pending_count(), 0);
    scheduler.start().unwrap();
    assert_eq!(scheduler.clock(), 0);
    assert!(handle.is_closed());
  }

  #[rxcore_macro::test]
  fn panicking_action_leaves_scheduler_usable() {
    let scheduler = VirtualTimeScheduler::new();
    scheduler.schedule_absolute(10, || panic!("action failed"));
    let log = Log::default();
    scheduler.schedule_absolute(20, record(&scheduler, &log, "after"));

    let c_scheduler = scheduler.clone();
    let result = panic::catch_unwind(AssertUnwindSafe(move || c_scheduler.advance_to(30)));
    assert!(result.is_err());
    assert!(!scheduler.is_enabled());
    assert_eq!(scheduler.clock(), 10);

    scheduler.advance_to(30).unwrap();
    assert_eq!(*log.lock(), vec![(20, "after")]);
  }

  #[rxcore_macro::test]
  fn sleep_moves_clock_only() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Log::default();
    scheduler.schedule_absolute(50, record(&scheduler, &log, "due"));
    scheduler.sleep(100);
    assert_eq!(scheduler.clock(), 100);
    assert!(log.lock().is_empty());
    scheduler.advance_by(0).unwrap();
    assert_eq!(*log.lock(), vec![(100, "due")]);
  }

  #[rxcore_macro::test]
  fn trait_delays_round_up_to_ticks() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Log::default();
    let task = record(&scheduler, &log, "rounded");
    scheduler.schedule_after(Duration::from_micros(1_500), Box::new(task));
    scheduler.advance_to(1).unwrap();
    assert!(log.lock().is_empty());
    scheduler.advance_to(2).unwrap();
    assert_eq!(*log.lock(), vec![(2, "rounded")]);
    assert_eq!(Scheduler::now(&scheduler), Duration::from_millis(2));
  }

  #[rxcore_macro::test]
  fn identical_schedules_replay_identically() {
    fn run() -> Vec<(VirtualTime, &'static str)> {
      let scheduler = VirtualTimeScheduler::new();
      let log = Log::default();
      for (t, name) in [(30, "x"), (10, "y"), (30, "z"), (20, "w"), (10, "v")] {
        scheduler.schedule_absolute(t, record(&scheduler, &log, name));
      }
      scheduler.start().unwrap();
      let out = log.lock().clone();
      out
    }
    assert_eq!(run(), run());
    assert_eq!(run(), vec![(10, "y"), (10, "v"), (20, "w"), (30, "x"), (30, "z")]);
  }
}
