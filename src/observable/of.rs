use std::marker::PhantomData;

use super::Observable;
use crate::{observer::Observer, subscriber::Subscriber};

/// Creates an observable producing a single value.
///
/// Completes immediately after emitting the value given. Never emits an error.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::of::<_, ()>(123).subscribe(|v| println!("{v}"));
/// ```
pub fn of<Item, Err>(v: Item) -> OfObservable<Item, Err> { OfObservable(v, PhantomData) }

pub struct OfObservable<Item, Err>(Item, PhantomData<fn() -> Err>);

impl<Item: Clone, Err> Clone for OfObservable<Item, Err> {
  fn clone(&self) -> Self { OfObservable(self.0.clone(), PhantomData) }
}

impl<Item, Err> Observable for OfObservable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, mut subscriber: Subscriber<Item, Err>) {
    subscriber.next(self.0);
    subscriber.complete();
  }
}

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error.
/// Emission stops early once the subscriber is closed, so an unbounded
/// iterator is fine behind `take`.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_iter::<_, ()>(0..10).take(3).subscribe(|v| println!("{v}"));
/// ```
pub fn from_iter<Iter, Err>(iter: Iter) -> FromIterObservable<Iter, Err>
where
  Iter: IntoIterator,
{
  FromIterObservable(iter, PhantomData)
}

pub struct FromIterObservable<Iter, Err>(Iter, PhantomData<fn() -> Err>);

impl<Iter: Clone, Err> Clone for FromIterObservable<Iter, Err> {
  fn clone(&self) -> Self { FromIterObservable(self.0.clone(), PhantomData) }
}

impl<Iter, Err> Observable for FromIterObservable<Iter, Err>
where
  Iter: IntoIterator,
  Iter::Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Iter::Item;
  type Err = Err;

  fn actual_subscribe(self, mut subscriber: Subscriber<Iter::Item, Err>) {
    for v in self.0 {
      if subscriber.is_closed() {
        return;
      }
      subscriber.next(v);
    }
    subscriber.complete();
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxcore_macro::test]
  fn of_emits_then_completes() {
    let log = Arc::new(Mutex::new(vec![]));
    let (c_log, c_done) = (log.clone(), log.clone());
    observable::of::<_, ()>(7)
      .subscribe_complete(move |v| c_log.lock().push(v), move || c_done.lock().push(-1));
    assert_eq!(*log.lock(), vec![7, -1]);
  }

  #[rxcore_macro::test]
  fn from_iter_stops_when_closed() {
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    observable::from_iter::<_, ()>(0..).take(4).subscribe(move |v| c_values.lock().push(v));
    assert_eq!(*values.lock(), vec![0, 1, 2, 3]);
  }

  #[rxcore_macro::test]
  fn cold_source_restarts_per_subscribe() {
    let source = observable::from_iter::<_, ()>(vec![1, 2]);
    let total = Arc::new(Mutex::new(0));
    for _ in 0..3 {
      let total = total.clone();
      source.clone().subscribe(move |v| *total.lock() += v);
    }
    assert_eq!(*total.lock(), 9);
  }
}
