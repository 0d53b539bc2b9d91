use std::{
  collections::VecDeque,
  fmt,
  sync::{Arc, Weak},
  time::Duration,
};

use parking_lot::Mutex;

use super::{
  broadcast_complete, broadcast_error, broadcast_value, SharedSubscriber, Subscribers, Terminal,
};
use crate::{
  error::RxError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{Scheduler, SchedulerRef},
  subscriber::Subscriber,
  subscription::ActionSubscription,
};

/// Which values a [`ReplaySubject`] keeps for late subscribers.
#[derive(Clone, Default)]
pub struct ReplayConfig {
  buffer_size: Option<usize>,
  window: Option<(Duration, SchedulerRef)>,
}

impl ReplayConfig {
  /// Keeps every value.
  pub fn unbounded() -> Self { Self::default() }

  /// Keeps at most the `size` most recent values.
  pub fn with_buffer_size(mut self, size: usize) -> Result<Self, RxError> {
    if size == 0 {
      return Err(RxError::out_of_range("buffer_size", "must be greater than zero"));
    }
    self.buffer_size = Some(size);
    Ok(self)
  }

  /// Keeps only values emitted within the last `window`, measured on
  /// `scheduler`.
  pub fn with_window(mut self, window: Duration, scheduler: SchedulerRef) -> Self {
    self.window = Some((window, scheduler));
    self
  }
}

impl fmt::Debug for ReplayConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ReplayConfig")
      .field("buffer_size", &self.buffer_size)
      .field("window", &self.window.as_ref().map(|(w, _)| *w))
      .finish()
  }
}

struct ReplayState<Item, Err> {
  config: ReplayConfig,
  buffer: VecDeque<(Duration, Item)>,
  observers: Subscribers<SharedSubscriber<Item, Err>>,
  terminal: Option<Terminal<Err>>,
}

impl<Item, Err> ReplayState<Item, Err> {
  fn now(&self) -> Duration {
    self.config.window.as_ref().map_or(Duration::ZERO, |(_, scheduler)| scheduler.now())
  }

  fn trim(&mut self) {
    if let Some(size) = self.config.buffer_size {
      while self.buffer.len() > size {
        self.buffer.pop_front();
      }
    }
    if let Some((window, scheduler)) = &self.config.window {
      let now = scheduler.now();
      while self.buffer.front().is_some_and(|(stamp, _)| now.saturating_sub(*stamp) > *window) {
        self.buffer.pop_front();
      }
    }
  }
}

/// A subject that records values and replays them to every new subscriber
/// before any live value reaches it.
///
/// The terminal notification is replayed too, after the buffered values.
pub struct ReplaySubject<Item, Err> {
  inner: Arc<Mutex<ReplayState<Item, Err>>>,
}

impl<Item, Err> Clone for ReplaySubject<Item, Err> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<Item, Err> Default for ReplaySubject<Item, Err> {
  fn default() -> Self { Self::new(ReplayConfig::unbounded()) }
}

impl<Item, Err> ReplaySubject<Item, Err> {
  pub fn new(config: ReplayConfig) -> Self {
    Self {
      inner: Arc::new(Mutex::new(ReplayState {
        config,
        buffer: VecDeque::new(),
        observers: Subscribers::default(),
        terminal: None,
      })),
    }
  }

  pub fn unbounded() -> Self { Self::new(ReplayConfig::unbounded()) }

  pub fn with_buffer_size(size: usize) -> Result<Self, RxError> {
    Ok(Self::new(ReplayConfig::unbounded().with_buffer_size(size)?))
  }

  pub fn with_window(window: Duration, scheduler: SchedulerRef) -> Self {
    Self::new(ReplayConfig::unbounded().with_window(window, scheduler))
  }

  /// Number of values currently buffered for replay.
  pub fn buffered_len(&self) -> usize {
    let mut state = self.inner.lock();
    state.trim();
    state.buffer.len()
  }

  pub fn subscribed_size(&self) -> usize { self.inner.lock().observers.len() }
}

impl<Item, Err> Observer<Item, Err> for ReplaySubject<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) {
    let observers = {
      let mut state = self.inner.lock();
      if state.terminal.is_some() {
        return;
      }
      let stamp = state.now();
      state.buffer.push_back((stamp, value.clone()));
      state.trim();
      state.observers.snapshot()
    };
    broadcast_value(observers, value);
  }

  fn error(&mut self, err: Err) {
    let observers = {
      let mut state = self.inner.lock();
      if state.terminal.is_some() {
        return;
      }
      state.terminal = Some(Terminal::Error(err.clone()));
      state.observers.take_all()
    };
    tracing::debug!(observers = observers.len(), "replay subject terminated with error");
    broadcast_error(observers, err);
  }

  fn complete(&mut self) {
    let observers = {
      let mut state = self.inner.lock();
      if state.terminal.is_some() {
        return;
      }
      state.terminal = Some(Terminal::Completed);
      state.observers.take_all()
    };
    tracing::debug!(observers = observers.len(), "replay subject completed");
    broadcast_complete(observers);
  }

  fn is_closed(&self) -> bool { self.inner.lock().terminal.is_some() }
}

impl<Item, Err> Observable for ReplaySubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    let mut state = self.inner.lock();
    state.trim();
    let history: Vec<Item> = state.buffer.iter().map(|(_, v)| v.clone()).collect();
    let terminal = state.terminal.clone();
    let subscription = subscriber.subscription().clone();
    let observer = MutArc::own(subscriber);
    let id = terminal.is_none().then(|| state.observers.add(observer.clone()));

    // The observer is locked before the state is released: a live value
    // emitted concurrently waits until the history was delivered.
    observer.rc_deref_mut(move |subscriber| {
      drop(state);
      for value in history {
        subscriber.next(value);
      }
      if let Some(terminal) = terminal {
        terminal.deliver(subscriber);
      }
    });

    if let Some(id) = id {
      let state: Weak<_> = Arc::downgrade(&self.inner);
      subscription.add(ActionSubscription::new(move || {
        if let Some(state) = state.upgrade() {
          let removed = state.lock().observers.remove(id);
          drop(removed);
        }
      }));
    }
  }
}
