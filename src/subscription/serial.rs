use std::{
  fmt::{Debug, Formatter},
  sync::Arc,
};

use parking_lot::Mutex;

use super::{BoxSubscription, SubscriptionLike};

/// Holds at most one current subscription.
///
/// Setting a new one disposes the previous one. Once the serial itself is
/// disposed, anything passed to `set` is disposed immediately.
#[derive(Clone, Default)]
pub struct SerialSubscription(Arc<Mutex<Inner>>);

#[derive(Default)]
struct Inner {
  closed: bool,
  current: Option<BoxSubscription>,
}

impl SerialSubscription {
  pub fn set<S: SubscriptionLike + Send + Sync + 'static>(&self, subscription: S) {
    let mut inner = self.0.lock();
    if inner.closed {
      drop(inner);
      let mut subscription = subscription;
      subscription.unsubscribe();
      return;
    }
    let previous = inner.current.replace(Box::new(subscription));
    drop(inner);
    if let Some(mut previous) = previous {
      previous.unsubscribe();
    }
  }
}

impl SubscriptionLike for SerialSubscription {
  fn unsubscribe(&mut self) {
    let current = {
      let mut inner = self.0.lock();
      if inner.closed {
        return;
      }
      inner.closed = true;
      inner.current.take()
    };
    if let Some(mut current) = current {
      current.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.lock().closed }
}

impl Debug for SerialSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SerialSubscription").field("is_closed", &self.is_closed()).finish()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::subscription::ActionSubscription;

  fn counting() -> (ActionSubscription, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let c_hits = hits.clone();
    (
      ActionSubscription::new(move || {
        c_hits.fetch_add(1, Ordering::SeqCst);
      }),
      hits,
    )
  }

  #[rxcore_macro::test]
  fn replacing_disposes_previous() {
    let serial = SerialSubscription::default();
    let (first, h1) = counting();
    let (second, h2) = counting();
    serial.set(first);
    assert_eq!(h1.load(Ordering::SeqCst), 0);
    serial.set(second);
    assert_eq!(h1.load(Ordering::SeqCst), 1);
    assert_eq!(h2.load(Ordering::SeqCst), 0);

    serial.clone().unsubscribe();
    serial.clone().unsubscribe();
    assert_eq!(h2.load(Ordering::SeqCst), 1);
  }

  #[rxcore_macro::test]
  fn set_after_dispose_disposes_new_value() {
    let mut serial = SerialSubscription::default();
    serial.unsubscribe();
    let (late, hits) = counting();
    serial.set(late);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(serial.is_closed());
  }
}
