use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use parking_lot::Mutex;

use super::SubscriptionLike;

type Action = Box<dyn FnOnce() + Send>;

/// Subscription wrapping a single release action.
///
/// The first `unsubscribe` claims the action with a compare-and-set on the
/// closed flag, so concurrent callers on any clone run it exactly once.
/// `ActionSubscription::default()` carries no action and only tracks the flag.
#[derive(Clone, Default)]
pub struct ActionSubscription(Arc<Inner>);

#[derive(Default)]
struct Inner {
  closed: AtomicBool,
  action: Mutex<Option<Action>>,
}

impl ActionSubscription {
  pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
    Self(Arc::new(Inner {
      closed: AtomicBool::new(false),
      action: Mutex::new(Some(Box::new(action))),
    }))
  }
}

impl SubscriptionLike for ActionSubscription {
  fn unsubscribe(&mut self) {
    if self.0.closed.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
      let action = self.0.action.lock().take();
      if let Some(action) = action {
        action();
      }
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.closed.load(Ordering::Acquire) }
}

impl Debug for ActionSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ActionSubscription").field("is_closed", &self.is_closed()).finish()
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::{atomic::AtomicUsize, Barrier},
    thread,
  };

  use super::*;

  #[rxcore_macro::test]
  fn runs_once_on_repeat() {
    let hits = Arc::new(AtomicUsize::new(0));
    let c_hits = hits.clone();
    let mut sub = ActionSubscription::new(move || {
      c_hits.fetch_add(1, Ordering::SeqCst);
    });
    sub.unsubscribe();
    sub.unsubscribe();
    sub.clone().unsubscribe();
    assert!(sub.is_closed());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[rxcore_macro::test]
  fn concurrent_unsubscribe_runs_once() {
    for _ in 0..50 {
      let hits = Arc::new(AtomicUsize::new(0));
      let c_hits = hits.clone();
      let sub = ActionSubscription::new(move || {
        c_hits.fetch_add(1, Ordering::SeqCst);
      });
      let barrier = Arc::new(Barrier::new(8));
      let handles: Vec<_> = (0..8)
        .map(|_| {
          let mut sub = sub.clone();
          let barrier = barrier.clone();
          thread::spawn(move || {
            barrier.wait();
            sub.unsubscribe();
          })
        })
        .collect();
      for h in handles {
        h.join().unwrap();
      }
      assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
  }
}
