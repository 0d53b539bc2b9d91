use crate::{
  observer::{BoxObserver, Observer},
  subscription::{CompositeSubscription, SubscriptionLike},
};

/// Implements the Observer trait around the user's observer and its
/// subscription. While the Observer is the public API for consuming the values
/// of an Observable, all Observers get converted to a Subscriber, in order to
/// enforce the notification grammar at the contract boundary:
///
/// - calls after a terminal notification, or after the subscription was
///   disposed, are dropped;
/// - a terminal notification disposes the subscription once it was delivered;
/// - a panic raised by the wrapped observer disposes the subscription and
///   keeps unwinding to whoever delivered the notification.
///
/// The closed check runs immediately before each forwarded call. A dispose
/// racing on another thread can still let one in-flight call through that
/// already passed the check; no call starts after `unsubscribe` returned on
/// the delivering thread.
pub struct Subscriber<Item, Err> {
  observer: BoxObserver<Item, Err>,
  subscription: CompositeSubscription,
  stopped: bool,
}

impl<Item, Err> Subscriber<Item, Err> {
  pub fn new<O>(observer: O, subscription: CompositeSubscription) -> Self
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    Subscriber { observer: Box::new(observer), subscription, stopped: false }
  }

  /// The subscription this subscriber detaches on termination. Sources add
  /// their own teardown here.
  #[inline]
  pub fn subscription(&self) -> &CompositeSubscription { &self.subscription }
}

/// Disposes the subscription when dropped unless disarmed.
struct DetachGuard<'a> {
  subscription: &'a CompositeSubscription,
  armed: bool,
}

impl Drop for DetachGuard<'_> {
  fn drop(&mut self) {
    if self.armed {
      self.subscription.dispose();
    }
  }
}

impl<Item, Err> Observer<Item, Err> for Subscriber<Item, Err> {
  fn next(&mut self, value: Item) {
    if self.is_closed() {
      return;
    }
    let mut guard = DetachGuard { subscription: &self.subscription, armed: true };
    self.observer.next(value);
    guard.armed = false;
  }

  fn error(&mut self, err: Err) {
    if self.is_closed() {
      return;
    }
    self.stopped = true;
    let _guard = DetachGuard { subscription: &self.subscription, armed: true };
    self.observer.error(err);
  }

  fn complete(&mut self) {
    if self.is_closed() {
      return;
    }
    self.stopped = true;
    let _guard = DetachGuard { subscription: &self.subscription, armed: true };
    self.observer.complete();
  }

  #[inline]
  fn is_closed(&self) -> bool { self.stopped || self.subscription.is_closed() }
}
