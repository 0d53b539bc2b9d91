//! The `Observable` trait and the source factories.
//!
//! Every source and operator implements [`Observable`]. Subscribing hands the
//! source a [`Subscriber`], the auto-detach wrapper around the caller's
//! observer, and returns the [`CompositeSubscription`] the whole chain shares:
//! operators forward the same subscription upstream, so disposing it (or a
//! terminal notification reaching the end of the chain) tears down every
//! stage at once.

use std::time::Duration;

use crate::{
  notification::Notification,
  observer::{Observer, ObserverAll, ObserverComp, ObserverErr, ObserverN},
  ops::{
    blocking,
    connectable::ConnectableObservable,
    delay::{DelayOp, ObserveOnOp},
    filter::{FilterOp, TryFilterOp},
    map::{MapOp, TryMapOp},
    materialize::{DematerializeOp, MaterializeOp},
    merge::MergeOp,
    subscribe_on::SubscribeOnOp,
    take::TakeOp,
  },
  scheduler::Scheduler,
  subject::{ReplayConfig, ReplaySubject, Subject},
  subscriber::Subscriber,
  subscription::{CompositeSubscription, SubscriptionWrapper},
};

mod boxed;
mod create;
mod of;
mod timer;
mod trivial;

pub use boxed::BoxObservable;
pub use create::{create, try_create, ObservableFn, TryObservableFn};
pub use of::{from_iter, of, FromIterObservable, OfObservable};
pub use timer::{interval, timer, IntervalObservable, TimerObservable};
pub use trivial::{empty, never, throw, EmptyObservable, NeverObservable, ThrowObservable};

pub use crate::ops::merge::{merge_all, MergeAllOp};

pub trait Observable: Sized {
  type Item: Send + 'static;
  type Err: Send + 'static;

  /// Starts the source for `subscriber`.
  ///
  /// Implementations register their teardown on `subscriber.subscription()`
  /// and deliver through `subscriber`; they never have to check the
  /// notification grammar themselves.
  fn actual_subscribe(self, subscriber: Subscriber<Self::Item, Self::Err>);

  /// Subscribes `observer` and returns the subscription of the whole chain.
  ///
  /// The subscription is returned even if the source is synchronous and
  /// already terminated by the time this returns.
  fn subscribe_with<O>(self, observer: O) -> SubscriptionWrapper<CompositeSubscription>
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let subscription = CompositeSubscription::default();
    self.actual_subscribe(Subscriber::new(observer, subscription.clone()));
    SubscriptionWrapper(subscription)
  }

  fn subscribe<N>(self, next: N) -> SubscriptionWrapper<CompositeSubscription>
  where
    N: FnMut(Self::Item) + Send + 'static,
  {
    self.subscribe_with(ObserverN(next))
  }

  fn subscribe_err<N, E>(self, next: N, error: E) -> SubscriptionWrapper<CompositeSubscription>
  where
    N: FnMut(Self::Item) + Send + 'static,
    E: FnMut(Self::Err) + Send + 'static,
  {
    self.subscribe_with(ObserverErr { next, error })
  }

  fn subscribe_complete<N, C>(
    self, next: N, complete: C,
  ) -> SubscriptionWrapper<CompositeSubscription>
  where
    N: FnMut(Self::Item) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    self.subscribe_with(ObserverComp { next, complete })
  }

  fn subscribe_all<N, E, C>(
    self, next: N, error: E, complete: C,
  ) -> SubscriptionWrapper<CompositeSubscription>
  where
    N: FnMut(Self::Item) + Send + 'static,
    E: FnMut(Self::Err) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    self.subscribe_with(ObserverAll { next, error, complete })
  }

  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  ///
  /// A panic in `f` detaches the subscription and unwinds to whoever
  /// delivered the value; it never becomes an `error` notification. Use
  /// [`try_map`](Observable::try_map) to turn a failing selector into
  /// `error`.
  #[inline]
  fn map<B, F>(self, f: F) -> MapOp<Self, F>
  where
    F: FnMut(Self::Item) -> B,
  {
    MapOp { source: self, func: f }
  }

  /// Like `map`, but an `Err` returned by `f` terminates the stream with that
  /// error; `f` is never called again afterwards.
  #[inline]
  fn try_map<B, F>(self, f: F) -> TryMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> Result<B, Self::Err>,
  {
    TryMapOp { source: self, func: f }
  }

  /// Emit only those items from an Observable that pass a predicate test
  ///
  /// As with `map`, a panicking predicate detaches and unwinds to the
  /// caller. [`try_filter`](Observable::try_filter) routes failures to
  /// `error` instead.
  #[inline]
  fn filter<F>(self, filter: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    FilterOp { source: self, filter }
  }

  /// Like `filter`, with a fallible predicate.
  #[inline]
  fn try_filter<F>(self, filter: F) -> TryFilterOp<Self, F>
  where
    F: FnMut(&Self::Item) -> Result<bool, Self::Err>,
  {
    TryFilterOp { source: self, filter }
  }

  /// Emits only the first `count` values emitted by the source Observable,
  /// then completes and unsubscribes from the source.
  ///
  /// `take(0)` completes on subscribe without subscribing to the source.
  #[inline]
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp { source: self, count } }

  /// Combine two observables into one by merging their emissions.
  ///
  /// The merged stream completes once both sources completed. The first
  /// error from either source terminates it; later errors are dropped.
  #[inline]
  fn merge<S>(self, other: S) -> MergeOp<Self, S>
  where
    S: Observable<Item = Self::Item, Err = Self::Err>,
  {
    MergeOp { source1: self, source2: other }
  }

  /// Turns every notification, terminal ones included, into a
  /// [`Notification`] value, followed by a plain completion.
  #[inline]
  fn materialize(self) -> MaterializeOp<Self> { MaterializeOp { source: self } }

  /// The inverse of [`materialize`](Observable::materialize).
  #[inline]
  fn dematerialize<Item, Err>(self) -> DematerializeOp<Self>
  where
    Self: Observable<Item = Notification<Item, Err>, Err = Err>,
  {
    DematerializeOp { source: self }
  }

  /// Delays each value and the completion by `delay` on `scheduler`,
  /// preserving order. Errors are forwarded immediately.
  #[inline]
  fn delay<SD>(self, delay: Duration, scheduler: SD) -> DelayOp<Self, SD>
  where
    SD: Scheduler + Clone + 'static,
  {
    DelayOp { source: self, delay, scheduler }
  }

  /// Re-emits every notification, terminal ones included, from `scheduler`,
  /// preserving order.
  #[inline]
  fn observe_on<SD>(self, scheduler: SD) -> ObserveOnOp<Self, SD>
  where
    SD: Scheduler + Clone + 'static,
  {
    ObserveOnOp { source: self, scheduler }
  }

  /// Subscribes to the source from a task on `scheduler`.
  #[inline]
  fn subscribe_on<SD>(self, scheduler: SD) -> SubscribeOnOp<Self, SD>
  where
    SD: Scheduler + 'static,
  {
    SubscribeOnOp { source: self, scheduler }
  }

  /// Erases the concrete type of this observable.
  #[inline]
  fn box_it(self) -> BoxObservable<Self::Item, Self::Err>
  where
    Self: Send + 'static,
  {
    BoxObservable::new(self)
  }

  /// Shares one subscription to this source among all subscribers of a
  /// [`Subject`], established by `connect`.
  #[inline]
  fn publish(self) -> ConnectableObservable<Self, Subject<Self::Item, Self::Err>>
  where
    Self::Item: Clone,
    Self::Err: Clone,
  {
    ConnectableObservable::new(self, Subject::default)
  }

  /// Like `publish`, but every subscriber first receives what the
  /// [`ReplaySubject`] buffered according to `config`.
  #[inline]
  fn replay(
    self, config: ReplayConfig,
  ) -> ConnectableObservable<Self, ReplaySubject<Self::Item, Self::Err>>
  where
    Self::Item: Clone,
    Self::Err: Clone,
  {
    ConnectableObservable::new(self, move || ReplaySubject::new(config.clone()))
  }

  /// Multicasts through subjects created by `factory`, one per connection.
  #[inline]
  fn multicast<Sub, F>(self, factory: F) -> ConnectableObservable<Self, Sub>
  where
    F: Fn() -> Sub + Send + Sync + 'static,
  {
    ConnectableObservable::new(self, factory)
  }

  /// Blocks until the first value, returning `None` if the source completed
  /// without one.
  fn block_first(self) -> Result<Option<Self::Item>, Self::Err> { blocking::first(self) }

  /// Blocks until the source terminates, returning its last value.
  fn block_last(self) -> Result<Option<Self::Item>, Self::Err> { blocking::last(self) }

  /// Blocks until the source terminates, returning every value.
  fn block_collect(self) -> Result<Vec<Self::Item>, Self::Err> { blocking::collect(self) }
}
