use std::sync::Arc;

use parking_lot::Mutex;

use super::ref_count::RefCount;
use crate::{
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
  subscription::{ActionSubscription, CompositeSubscription, SubscriptionLike},
};

type SubjectFactory<Sub> = Arc<dyn Fn() -> Sub + Send + Sync>;

/// A source shared through a subject, subscribed to once per `connect`.
///
/// Subscribing to a `ConnectableObservable` subscribes to the current
/// subject only; values start flowing when [`connect`](Self::connect)
/// subscribes the subject to the source.
pub struct ConnectableObservable<S, Sub> {
  source: S,
  factory: SubjectFactory<Sub>,
  state: Arc<Mutex<ConnectState<Sub>>>,
}

struct ConnectState<Sub> {
  subject: Sub,
  connection: Option<Connection>,
  generation: usize,
}

impl<S: Clone, Sub> Clone for ConnectableObservable<S, Sub> {
  fn clone(&self) -> Self {
    Self { source: self.source.clone(), factory: self.factory.clone(), state: self.state.clone() }
  }
}

impl<S, Sub> ConnectableObservable<S, Sub> {
  pub fn new<F>(source: S, factory: F) -> Self
  where
    F: Fn() -> Sub + Send + Sync + 'static,
  {
    let subject = factory();
    Self {
      source,
      factory: Arc::new(factory),
      state: Arc::new(Mutex::new(ConnectState { subject, connection: None, generation: 0 })),
    }
  }

  /// The subject subscribers currently attach to.
  pub fn fork(&self) -> Sub
  where
    Sub: Clone,
  {
    self.state.lock().subject.clone()
  }

  /// Connects when the first subscriber arrives and disconnects when the last
  /// one leaves.
  pub fn ref_count(self) -> RefCount<S, Sub> { RefCount::new(self) }
}

impl<S, Sub> ConnectableObservable<S, Sub>
where
  S: Observable + Clone,
  Sub: Observer<S::Item, S::Err> + Clone + Send + 'static,
{
  /// Subscribes the subject to the source.
  ///
  /// While a connection is active, the same connection is returned again.
  /// Disposing it tears down the source subscription and replaces the
  /// subject with a fresh one, so later subscribers only see values of the
  /// next connection.
  pub fn connect(&self) -> Connection {
    let mut state = self.state.lock();
    if let Some(connection) = &state.connection {
      if !connection.is_closed() {
        return connection.clone();
      }
    }
    state.generation += 1;
    let upstream = CompositeSubscription::default();
    let connection = Connection { upstream: upstream.clone(), reset: self.reset(state.generation) };
    state.connection = Some(connection.clone());
    let subject = state.subject.clone();
    drop(state);

    tracing::debug!("connectable observable connected");
    self.source.clone().actual_subscribe(Subscriber::new(subject, upstream));
    connection
  }

  fn reset(&self, generation: usize) -> ActionSubscription {
    let state = Arc::downgrade(&self.state);
    let factory = self.factory.clone();
    ActionSubscription::new(move || {
      let Some(state) = state.upgrade() else { return };
      let fresh = factory();
      let stale = {
        let mut state = state.lock();
        if state.generation != generation {
          return;
        }
        state.connection = None;
        std::mem::replace(&mut state.subject, fresh)
      };
      drop(stale);
      tracing::debug!("connectable observable disconnected");
    })
  }
}

impl<S, Sub> Observable for ConnectableObservable<S, Sub>
where
  S: Observable,
  Sub: Observable<Item = S::Item, Err = S::Err> + Clone,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let subject = self.state.lock().subject.clone();
    subject.actual_subscribe(subscriber)
  }
}

/// Handle to one connection of a [`ConnectableObservable`].
#[derive(Clone, Debug)]
pub struct Connection {
  upstream: CompositeSubscription,
  reset: ActionSubscription,
}

impl SubscriptionLike for Connection {
  fn unsubscribe(&mut self) {
    self.upstream.unsubscribe();
    self.reset.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.upstream.is_closed() }
}
