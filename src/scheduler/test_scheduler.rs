use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use super::{Scheduler, Task, TaskHandle, VirtualTime, VirtualTimeScheduler};
use crate::{
  error::RxError,
  notification::Notification,
  observable::Observable,
  subscription::{CompositeSubscription, SubscriptionLike, SubscriptionWrapper},
  testing::{ColdObservable, HotObservable, MockObserver, Recorded},
};

/// Time at which [`TestScheduler::start`] creates the observable under test.
pub const CREATED: VirtualTime = 100;
/// Time at which [`TestScheduler::start`] subscribes to it.
pub const SUBSCRIBED: VirtualTime = 200;
/// Time at which [`TestScheduler::start`] disposes the subscription.
pub const DISPOSED: VirtualTime = 1000;

/// A [`VirtualTimeScheduler`] with factories for recorded test sources and
/// observers.
#[derive(Clone, Debug, Default)]
pub struct TestScheduler {
  clock: VirtualTimeScheduler,
}

impl From<VirtualTimeScheduler> for TestScheduler {
  fn from(clock: VirtualTimeScheduler) -> Self { Self { clock } }
}

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// The underlying virtual clock, shared with this scheduler.
  pub fn virtual_time(&self) -> &VirtualTimeScheduler { &self.clock }

  #[inline]
  pub fn clock(&self) -> VirtualTime { self.clock.clock() }

  pub fn pending_count(&self) -> usize { self.clock.pending_count() }

  pub fn schedule_absolute(
    &self, due: VirtualTime, action: impl FnOnce() + Send + 'static,
  ) -> TaskHandle {
    self.clock.schedule_absolute(due, action)
  }

  pub fn advance_to(&self, target: VirtualTime) -> Result<(), RxError> {
    self.clock.advance_to(target)
  }

  pub fn advance_by(&self, ticks: VirtualTime) -> Result<(), RxError> {
    self.clock.advance_by(ticks)
  }

  /// Runs every queued action.
  ///
  /// # Panics
  ///
  /// Panics if called from inside an action of this scheduler.
  pub fn run(&self) {
    if let Err(err) = self.clock.start() {
      panic!("test scheduler could not run: {err}");
    }
  }

  pub fn stop(&self) { self.clock.stop() }

  /// A source that emits `messages` at their absolute times, whether or not
  /// anyone is subscribed.
  pub fn create_hot_observable<Item, Err>(
    &self, messages: Vec<Recorded<Notification<Item, Err>>>,
  ) -> HotObservable<Item, Err>
  where
    Item: Clone + Send + 'static,
    Err: Clone + Send + 'static,
  {
    HotObservable::new(self.clock.clone(), messages)
  }

  /// A source that replays `messages` to each subscriber, offset by the time
  /// it subscribed.
  pub fn create_cold_observable<Item, Err>(
    &self, messages: Vec<Recorded<Notification<Item, Err>>>,
  ) -> ColdObservable<Item, Err>
  where
    Item: Clone + Send + 'static,
    Err: Clone + Send + 'static,
  {
    ColdObservable::new(self.clock.clone(), messages)
  }

  pub fn create_observer<Item, Err>(&self) -> MockObserver<Item, Err> {
    MockObserver::new(self.clock.clone())
  }

  /// Creates the observable at [`CREATED`], subscribes at [`SUBSCRIBED`],
  /// disposes at [`DISPOSED`] and runs the scheduler to completion.
  pub fn start<S, F>(&self, create: F) -> MockObserver<S::Item, S::Err>
  where
    S: Observable + Send + 'static,
    F: FnOnce() -> S + Send + 'static,
  {
    self.start_with_timing(create, CREATED, SUBSCRIBED, DISPOSED)
  }

  pub fn start_with_dispose<S, F>(
    &self, create: F, disposed: VirtualTime,
  ) -> MockObserver<S::Item, S::Err>
  where
    S: Observable + Send + 'static,
    F: FnOnce() -> S + Send + 'static,
  {
    self.start_with_timing(create, CREATED, SUBSCRIBED, disposed)
  }

  pub fn start_with_timing<S, F>(
    &self, create: F, created: VirtualTime, subscribed: VirtualTime, disposed: VirtualTime,
  ) -> MockObserver<S::Item, S::Err>
  where
    S: Observable + Send + 'static,
    F: FnOnce() -> S + Send + 'static,
  {
    let observer = self.create_observer();
    let source: Arc<Mutex<Option<S>>> = Arc::default();
    let subscription: Arc<Mutex<Option<SubscriptionWrapper<CompositeSubscription>>>> =
      Arc::default();

    let c_source = source.clone();
    self.clock.schedule_absolute(created, move || {
      *c_source.lock() = Some(create());
    });

    let (c_subscription, c_observer) = (subscription.clone(), observer.clone());
    self.clock.schedule_absolute(subscribed, move || {
      let source = source.lock().take();
      if let Some(source) = source {
        let handle = source.subscribe_with(c_observer);
        *c_subscription.lock() = Some(handle);
      }
    });

    self.clock.schedule_absolute(disposed, move || {
      let handle = subscription.lock().take();
      if let Some(mut handle) = handle {
        handle.unsubscribe();
      }
    });

    self.run();
    observer
  }
}

impl Scheduler for TestScheduler {
  fn now(&self) -> Duration { self.clock.now() }

  fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle {
    self.clock.schedule_after(delay, task)
  }

  fn schedule_at(&self, due: Duration, task: Task) -> TaskHandle {
    self.clock.schedule_at(due, task)
  }
}
