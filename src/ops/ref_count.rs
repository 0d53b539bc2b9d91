use std::{cell::RefCell, sync::Arc};

use parking_lot::ReentrantMutex;

use super::connectable::{ConnectableObservable, Connection};
use crate::{
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
  subscription::{ActionSubscription, SubscriptionLike},
};

/// Makes a [`ConnectableObservable`] behave like an ordinary observable: it
/// connects when the first subscriber arrives and disconnects when the last
/// one unsubscribes.
///
/// The 0 to 1 and 1 to 0 transitions hold the state lock across the connect
/// and the disconnect, so a subscriber arriving while the last one leaves
/// always lands on a live connection. The lock is re-entrant: callbacks that
/// run during a connect may subscribe or unsubscribe on the same thread.
pub struct RefCount<S, Sub> {
  connectable: ConnectableObservable<S, Sub>,
  state: Arc<ReentrantMutex<RefCell<RefState>>>,
}

#[derive(Default)]
struct RefState {
  count: usize,
  connection: Option<Connection>,
}

impl<S, Sub> RefCount<S, Sub> {
  pub(crate) fn new(connectable: ConnectableObservable<S, Sub>) -> Self {
    Self { connectable, state: Arc::new(ReentrantMutex::new(RefCell::default())) }
  }

  /// Number of subscribers currently attached.
  pub fn ref_count(&self) -> usize { self.state.lock().borrow().count }
}

impl<S: Clone, Sub> Clone for RefCount<S, Sub> {
  fn clone(&self) -> Self {
    Self { connectable: self.connectable.clone(), state: self.state.clone() }
  }
}

impl<S, Sub> Observable for RefCount<S, Sub>
where
  S: Observable + Clone,
  Sub: Observable<Item = S::Item, Err = S::Err>
    + Observer<S::Item, S::Err>
    + Clone
    + Send
    + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let subscription = subscriber.subscription().clone();
    {
      let guard = self.state.lock();
      self.connectable.fork().actual_subscribe(subscriber);
      let first = {
        let mut state = guard.borrow_mut();
        state.count += 1;
        state.count == 1
      };
      if first {
        let connection = self.connectable.connect();
        guard.borrow_mut().connection = Some(connection);
      }
    }

    let state = self.state.clone();
    subscription.add(ActionSubscription::new(move || {
      let guard = state.lock();
      let connection = {
        let mut state = guard.borrow_mut();
        state.count -= 1;
        if state.count == 0 {
          state.connection.take()
        } else {
          None
        }
      };
      if let Some(mut connection) = connection {
        connection.unsubscribe();
      }
    }));
  }
}
