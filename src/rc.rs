use std::{cell::RefCell, sync::Arc};

use parking_lot::ReentrantMutex;

use crate::observer::Observer;

/// Shared, thread-safe, mutable cell used wherever one observer is driven by
/// several producers (hot sources, merged inners, scheduled tasks).
///
/// The lock is re-entrant per thread while the inner `RefCell` is not: a
/// second thread blocks until the current delivery finishes, but the same
/// thread re-entering a delivery in progress panics instead of deadlocking.
pub struct MutArc<T>(Arc<ReentrantMutex<RefCell<T>>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(ReentrantMutex::new(RefCell::new(t)))) }

  /// Runs `f` with exclusive access to the inner value.
  ///
  /// # Panics
  ///
  /// Panics if the current thread is already inside `rc_deref_mut` for this
  /// cell (re-entrant emission).
  pub fn rc_deref_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
    let guard = self.0.lock();
    let mut inner = guard
      .try_borrow_mut()
      .unwrap_or_else(|_| panic!("re-entrant emission into an observer that is still delivering"));
    f(&mut inner)
  }

  /// Runs `f` with shared access, or returns `None` while the same thread is
  /// mutating the value.
  pub fn try_rc_deref<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
    let guard = self.0.lock();
    let inner = guard.try_borrow().ok()?;
    Some(f(&inner))
  }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: Default> Default for MutArc<T> {
  fn default() -> Self { Self::own(T::default()) }
}

impl<Item, Err, O> Observer<Item, Err> for MutArc<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) { self.rc_deref_mut(|o| o.next(value)) }

  fn error(&mut self, err: Err) { self.rc_deref_mut(|o| o.error(err)) }

  fn complete(&mut self) { self.rc_deref_mut(|o| o.complete()) }

  fn is_closed(&self) -> bool { self.try_rc_deref(|o| o.is_closed()).unwrap_or(false) }
}

#[cfg(test)]
mod tests {
  use std::thread;

  use super::*;

  #[rxcore_macro::test]
  fn shared_across_threads() {
    let counter = MutArc::own(0);
    let handles: Vec<_> = (0..4)
      .map(|_| {
        let c = counter.clone();
        thread::spawn(move || {
          for _ in 0..100 {
            c.rc_deref_mut(|v| *v += 1);
          }
        })
      })
      .collect();
    for h in handles {
      h.join().unwrap();
    }
    assert_eq!(counter.rc_deref_mut(|v| *v), 400);
  }

  #[rxcore_macro::test]
  #[should_panic(expected = "re-entrant emission")]
  fn reentrant_access_panics() {
    let cell = MutArc::own(0);
    let c = cell.clone();
    cell.rc_deref_mut(|_| c.rc_deref_mut(|v| *v += 1));
  }
}
