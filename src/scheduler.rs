//! Schedulers decide when and where a unit of work runs.
//!
//! Every scheduler implements the object-safe [`Scheduler`] trait, so
//! operators can take any of them, boxed or not:
//!
//! | Scheduler | Runs work |
//! |-----------|-----------|
//! | [`ImmediateScheduler`] | inline, sleeping the caller for delays |
//! | [`CurrentThreadScheduler`] | on the calling thread, trampolined |
//! | [`NewThreadScheduler`] | on a dedicated thread per item |
//! | `ThreadPoolScheduler` | on a `futures` thread pool (`futures-scheduler`) |
//! | `TokioScheduler` | on a tokio runtime (`tokio-scheduler`) |
//! | [`VirtualTimeScheduler`] | when the virtual clock is advanced |
//!
//! There is no implicitly used global scheduler. [`default_scheduler`] resolves a
//! process-wide default exactly once for callers that want one, and
//! [`init_default`] lets the application pick it explicitly at startup.

use std::{
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  time::{Duration, Instant},
};

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;

use crate::{
  error::RxError,
  subscription::{SerialSubscription, SubscriptionLike},
};

mod config;
mod current_thread;
mod immediate;
mod new_thread;
mod test_scheduler;
#[cfg(feature = "futures-scheduler")]
mod thread_pool;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;
mod virtual_time;

pub use config::SchedulerConfig;
pub use current_thread::CurrentThreadScheduler;
pub use immediate::ImmediateScheduler;
pub use new_thread::NewThreadScheduler;
pub use test_scheduler::{TestScheduler, CREATED, DISPOSED, SUBSCRIBED};
#[cfg(feature = "futures-scheduler")]
pub use thread_pool::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;
pub use virtual_time::{VirtualTime, VirtualTimeScheduler};

/// A unit of work handed to a scheduler.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A Scheduler is an object to order task and schedule their execution.
///
/// Times are `Duration`s measured from the scheduler's epoch (see
/// [`Scheduler::now`]). Every schedule call returns a [`TaskHandle`]; calling
/// `unsubscribe` on it before the task started cancels it.
pub trait Scheduler: Send + Sync {
  /// Current time of this scheduler's clock.
  fn now(&self) -> Duration;

  fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle;

  fn schedule_now(&self, task: Task) -> TaskHandle { self.schedule_after(Duration::ZERO, task) }

  /// Schedules `task` at the absolute time `due`. A `due` in the past runs as
  /// soon as possible.
  fn schedule_at(&self, due: Duration, task: Task) -> TaskHandle {
    let delay = due.saturating_sub(self.now());
    self.schedule_after(delay, task)
  }
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
  #[inline]
  fn now(&self) -> Duration { (**self).now() }
  #[inline]
  fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle {
    (**self).schedule_after(delay, task)
  }
  #[inline]
  fn schedule_now(&self, task: Task) -> TaskHandle { (**self).schedule_now(task) }
  #[inline]
  fn schedule_at(&self, due: Duration, task: Task) -> TaskHandle { (**self).schedule_at(due, task) }
}

/// Shared scheduler handle.
pub type SchedulerRef = Arc<dyn Scheduler>;

// ==================== TaskHandle ====================

/// Handle to one scheduled task.
///
/// `unsubscribe` cancels the task if it has not started yet. `is_closed`
/// reports whether the task was cancelled or has finished.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle(Arc<TaskState>);

#[derive(Debug, Default)]
struct TaskState {
  cancelled: AtomicBool,
  finished: AtomicBool,
}

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.0.cancelled.load(Ordering::Acquire) }

  #[inline]
  pub fn is_finished(&self) -> bool { self.0.finished.load(Ordering::Acquire) }

  #[inline]
  pub(crate) fn mark_finished(&self) { self.0.finished.store(true, Ordering::Release) }

  /// Runs `task` unless the handle was cancelled, then marks it finished.
  pub(crate) fn run(&self, task: Task) {
    if !self.is_cancelled() {
      task();
    }
    self.mark_finished();
  }
}

impl SubscriptionLike for TaskHandle {
  #[inline]
  fn unsubscribe(&mut self) { self.0.cancelled.store(true, Ordering::Release) }

  #[inline]
  fn is_closed(&self) -> bool { self.is_cancelled() || self.is_finished() }
}

// ==================== Recurring work ====================

/// Runs `task` every `period`, first at `now + period`, passing the zero-based
/// tick index. Returns the handle that stops the recurrence.
///
/// Each tick is scheduled at an absolute due time, so periods do not drift
/// with the time the task itself takes.
pub fn schedule_periodic<S, F>(scheduler: S, period: Duration, task: F) -> SerialSubscription
where
  S: Scheduler + Clone + 'static,
  F: FnMut(usize) + Send + 'static,
{
  let serial = SerialSubscription::default();
  let due = scheduler.now() + period;
  schedule_tick(scheduler, period, due, 0, Arc::new(Mutex::new(task)), serial.clone());
  serial
}

fn schedule_tick<S, F>(
  scheduler: S, period: Duration, due: Duration, index: usize, task: Arc<Mutex<F>>,
  serial: SerialSubscription,
) where
  S: Scheduler + Clone + 'static,
  F: FnMut(usize) + Send + 'static,
{
  let c_scheduler = scheduler.clone();
  let c_serial = serial.clone();
  let handle = scheduler.schedule_at(
    due,
    Box::new(move || {
      if c_serial.is_closed() {
        return;
      }
      (&mut *task.lock())(index);
      schedule_tick(c_scheduler, period, due + period, index + 1, task, c_serial);
    }),
  );
  serial.set(handle);
}

// ==================== Clock & default ====================

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Time elapsed since the process-wide epoch shared by the real schedulers.
#[inline]
pub(crate) fn wall_clock() -> Duration { EPOCH.elapsed() }

static DEFAULT_SCHEDULER: OnceCell<SchedulerRef> = OnceCell::new();

/// Installs the process-wide default scheduler.
///
/// Must run before the first call to [`default_scheduler`]; afterwards the
/// default is fixed and this returns `RxError::DefaultSchedulerInitialized`.
pub fn init_default(scheduler: SchedulerRef) -> Result<(), RxError> {
  DEFAULT_SCHEDULER.set(scheduler).map_err(|_| RxError::DefaultSchedulerInitialized)
}

/// The process-wide default scheduler, resolved once.
///
/// Unless [`init_default`] ran first, this is a thread pool built from
/// [`SchedulerConfig::from_env`], falling back to [`NewThreadScheduler`] when
/// the pool cannot be built or the `futures-scheduler` feature is off.
pub fn default_scheduler() -> SchedulerRef {
  DEFAULT_SCHEDULER.get_or_init(resolve_default).clone()
}

fn resolve_default() -> SchedulerRef {
  #[cfg(feature = "futures-scheduler")]
  {
    match SchedulerConfig::from_env().and_then(ThreadPoolScheduler::new) {
      Ok(pool) => {
        tracing::info!("default scheduler resolved to thread pool");
        return Arc::new(pool);
      }
      Err(err) => tracing::warn!(%err, "falling back to new-thread default scheduler"),
    }
  }
  tracing::info!("default scheduler resolved to new thread");
  Arc::new(NewThreadScheduler::default())
}
