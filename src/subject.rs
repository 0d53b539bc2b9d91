//! Subjects: hot hubs that are both an observer and an observable.
//!
//! Emission uses snapshot-then-deliver: the observer list is copied under
//! the lock and delivered to outside of it, so observers may subscribe to or
//! unsubscribe from the subject while it is emitting. Emitting into the
//! subject from inside one of its own observers, on the same thread, while
//! that observer is still being delivered to, panics.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscriber::Subscriber,
  subscription::ActionSubscription,
};

mod replay_subject;
mod subscribers;

pub use replay_subject::{ReplayConfig, ReplaySubject};
pub(crate) use subscribers::Subscribers;
use subscribers::{broadcast_complete, broadcast_error, broadcast_value};

type SharedSubscriber<Item, Err> = MutArc<Subscriber<Item, Err>>;

/// How a subject terminated.
#[derive(Clone)]
enum Terminal<Err> {
  Error(Err),
  Completed,
}

impl<Err: Clone> Terminal<Err> {
  fn deliver<Item>(&self, subscriber: &mut Subscriber<Item, Err>) {
    match self {
      Terminal::Error(err) => subscriber.error(err.clone()),
      Terminal::Completed => subscriber.complete(),
    }
  }
}

struct SubjectState<Item, Err> {
  observers: Subscribers<SharedSubscriber<Item, Err>>,
  terminal: Option<Terminal<Err>>,
}

/// Broadcasts every notification to the observers subscribed at that moment.
///
/// A subject terminates at most once. Observers subscribing after that
/// receive the terminal notification immediately and nothing else.
pub struct Subject<Item, Err> {
  inner: Arc<Mutex<SubjectState<Item, Err>>>,
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self {
    Self {
      inner: Arc::new(Mutex::new(SubjectState {
        observers: Subscribers::default(),
        terminal: None,
      })),
    }
  }
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Self::default() }

  /// Number of observers currently subscribed.
  pub fn subscribed_size(&self) -> usize { self.inner.lock().observers.len() }

  /// Returns `true` once the subject received `error` or `complete`.
  pub fn is_stopped(&self) -> bool { self.inner.lock().terminal.is_some() }
}

/// Teardown removing observer `id`; holds the state weakly so an idle
/// subscription does not keep the subject alive.
fn removal<Item, Err>(state: &Arc<Mutex<SubjectState<Item, Err>>>, id: usize) -> ActionSubscription
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  let state: Weak<Mutex<SubjectState<Item, Err>>> = Arc::downgrade(state);
  ActionSubscription::new(move || {
    if let Some(state) = state.upgrade() {
      // Drop the removed observer after releasing the lock.
      let removed = state.lock().observers.remove(id);
      drop(removed);
    }
  })
}

impl<Item, Err> Observer<Item, Err> for Subject<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) {
    let observers = {
      let state = self.inner.lock();
      if state.terminal.is_some() {
        return;
      }
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
    tracing::debug!(observers = observers.len(), "subject terminated with error");
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
    tracing::debug!(observers = observers.len(), "subject completed");
    broadcast_complete(observers);
  }

  fn is_closed(&self) -> bool { self.inner.lock().terminal.is_some() }
}

impl<Item, Err> Observable for Subject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, mut subscriber: Subscriber<Item, Err>) {
    let mut state = self.inner.lock();
    if let Some(terminal) = state.terminal.clone() {
      drop(state);
      terminal.deliver(&mut subscriber);
      return;
    }
    let subscription = subscriber.subscription().clone();
    let id = state.observers.add(MutArc::own(subscriber));
    drop(state);
    subscription.add(removal(&self.inner, id));
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::{
      atomic::{AtomicUsize, Ordering},
      Barrier,
    },
    thread,
  };

  use super::*;
  use crate::prelude::*;

  #[rxcore_macro::test]
  fn broadcast_to_current_observers() {
    let mut subject = Subject::<i32, ()>::new();
    let a = Arc::new(Mutex::new(vec![]));
    let b = Arc::new(Mutex::new(vec![]));

    let c_a = a.clone();
    subject.clone().subscribe(move |v| c_a.lock().push(v));
    subject.next(1);

    let c_b = b.clone();
    let mut sub_b = subject.clone().subscribe(move |v| c_b.lock().push(v));
    subject.next(2);
    sub_b.unsubscribe();
    subject.next(3);

    assert_eq!(*a.lock(), vec![1, 2, 3]);
    assert_eq!(*b.lock(), vec![2]);
    assert_eq!(subject.subscribed_size(), 1);
  }

  #[rxcore_macro::test]
  fn terminates_once_and_replays_terminal_to_late_subscribers() {
    let mut subject = Subject::<i32, &str>::new();
    let log = Arc::new(Mutex::new(vec![]));
    let (l1, l2) = (log.clone(), log.clone());
    subject.clone().subscribe_err(|_| {}, move |e| l1.lock().push(format!("early {e}")));

    subject.error("first");
    subject.error("second");
    subject.complete();
    subject.next(9);
    assert!(subject.is_stopped());
    assert_eq!(subject.subscribed_size(), 0);

    let late = subject.clone().subscribe_err(|_| {}, move |e| l2.lock().push(format!("late {e}")));
    assert!(late.is_closed());
    assert_eq!(*log.lock(), vec!["early first", "late first"]);
  }

  #[rxcore_macro::test]
  fn unsubscribe_during_emit() {
    let mut subject = Subject::<i32, ()>::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<SubscriptionWrapper<CompositeSubscription>>>> = Arc::default();

    let (c_hits, c_slot) = (hits.clone(), slot.clone());
    let subscription = subject.clone().subscribe(move |_| {
      c_hits.fetch_add(1, Ordering::SeqCst);
      if let Some(mut s) = c_slot.lock().take() {
        s.unsubscribe();
      }
    });
    *slot.lock() = Some(subscription);

    subject.next(1);
    subject.next(2);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(subject.subscribed_size(), 0);
  }

  #[rxcore_macro::test]
  #[should_panic(expected = "re-entrant emission")]
  fn reentrant_emit_panics() {
    let subject = Subject::<i32, ()>::new();
    let mut inner = subject.clone();
    subject.clone().subscribe(move |v| {
      if v == 0 {
        inner.next(1);
      }
    });
    subject.clone().next(0);
  }

  #[rxcore_macro::test]
  fn concurrent_subscribe_unsubscribe_and_emit() {
    let subject = Subject::<usize, ()>::new();
    let received = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(5));

    let emitters: Vec<_> = (0..2)
      .map(|_| {
        let mut subject = subject.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
          barrier.wait();
          for i in 0..500 {
            subject.next(i);
          }
        })
      })
      .collect();
    let churners: Vec<_> = (0..3)
      .map(|_| {
        let subject = subject.clone();
        let barrier = barrier.clone();
        let received = received.clone();
        thread::spawn(move || {
          barrier.wait();
          for _ in 0..200 {
            let received = received.clone();
            let mut s = subject.clone().subscribe(move |_| {
              received.fetch_add(1, Ordering::Relaxed);
            });
            s.unsubscribe();
          }
        })
      })
      .collect();
    for h in emitters.into_iter().chain(churners) {
      h.join().unwrap();
    }
    assert_eq!(subject.subscribed_size(), 0);

    let count = Arc::new(AtomicUsize::new(0));
    let c_count = count.clone();
    subject.clone().subscribe(move |_| {
      c_count.fetch_add(1, Ordering::SeqCst);
    });
    subject.clone().next(0);
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }
}
