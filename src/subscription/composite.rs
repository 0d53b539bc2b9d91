use std::{
  any::Any,
  fmt::{Debug, Formatter},
  mem,
  panic::{self, AssertUnwindSafe},
  sync::Arc,
  thread,
};

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::{BoxSubscription, SubscriptionLike};

/// Identifies a child added to a [`CompositeSubscription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionKey(usize);

/// A group of subscriptions released together.
///
/// - Children can be added and removed while the group is live.
/// - Disposing the group disposes every child exactly once.
/// - A child added after disposal is disposed on the spot instead of stored.
///
/// Children are always disposed outside the internal lock, so a child's
/// release action may freely touch this composite again.
#[derive(Clone, Default)]
pub struct CompositeSubscription(Arc<Mutex<Inner>>);

#[derive(Default)]
struct Inner {
  closed: bool,
  next_key: usize,
  teardown: SmallVec<[(usize, BoxSubscription); 1]>,
}

impl CompositeSubscription {
  /// Adds `subscription` to the group.
  ///
  /// Returns `None` when the group was already disposed; `subscription` has
  /// been disposed in that case.
  pub fn add<S: SubscriptionLike + Send + Sync + 'static>(
    &self, subscription: S,
  ) -> Option<SubscriptionKey> {
    if self.is_same(&subscription) {
      return None;
    }
    let mut inner = self.0.lock();
    if inner.closed {
      drop(inner);
      let mut subscription = subscription;
      subscription.unsubscribe();
      return None;
    }
    inner.teardown.retain(|(_, s)| !s.is_closed());
    let key = inner.next_key;
    inner.next_key += 1;
    inner.teardown.push((key, Box::new(subscription)));
    Some(SubscriptionKey(key))
  }

  /// Removes the child identified by `key` and disposes it.
  ///
  /// Returns `false` if no such child is held (already removed, already
  /// pruned after closing itself, or the group is disposed).
  pub fn remove(&self, key: SubscriptionKey) -> bool {
    let removed = {
      let mut inner = self.0.lock();
      let pos = inner.teardown.iter().position(|(k, _)| *k == key.0);
      pos.map(|pos| inner.teardown.remove(pos).1)
    };
    match removed {
      Some(mut subscription) => {
        subscription.unsubscribe();
        true
      }
      None => false,
    }
  }

  /// Number of children currently held.
  pub fn teardown_size(&self) -> usize { self.0.lock().teardown.len() }

  fn is_same(&self, other: &dyn Any) -> bool {
    if let Some(other) = other.downcast_ref::<Self>() {
      Arc::ptr_eq(&self.0, &other.0)
    } else {
      false
    }
  }

  /// Disposes the group. Every child is disposed even if an earlier one
  /// panics; the first panic is resumed once all children were visited,
  /// unless the thread is already panicking.
  pub(crate) fn dispose(&self) {
    let children = {
      let mut inner = self.0.lock();
      if inner.closed {
        return;
      }
      inner.closed = true;
      mem::take(&mut inner.teardown)
    };
    if !children.is_empty() {
      tracing::trace!(children = children.len(), "disposing composite subscription");
    }

    let mut first_panic = None;
    for (_, mut child) in children {
      if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| child.unsubscribe())) {
        tracing::warn!("a child subscription panicked while being disposed");
        first_panic.get_or_insert(payload);
      }
    }
    if let Some(payload) = first_panic {
      // Resuming while already unwinding (a panicking observer detaching)
      // would abort the process.
      if thread::panicking() {
        tracing::warn!("dropping a teardown panic raised while unwinding");
      } else {
        panic::resume_unwind(payload);
      }
    }
  }
}

impl SubscriptionLike for CompositeSubscription {
  #[inline]
  fn unsubscribe(&mut self) { self.dispose() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.lock().closed }
}

impl Debug for CompositeSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.lock();
    f.debug_struct("CompositeSubscription")
      .field("closed", &inner.closed)
      .field("teardown_count", &inner.teardown.len())
      .finish()
  }
}
