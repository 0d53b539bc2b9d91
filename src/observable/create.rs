use std::marker::PhantomData;

use super::Observable;
use crate::{observer::Observer, subscriber::Subscriber};

/// Creates an observable from a function that drives the subscriber.
///
/// The function runs once per subscription. It may emit synchronously, or
/// move the subscriber into a thread or a scheduled task; resources it
/// acquires are released by adding a teardown to
/// `subscriber.subscription()`.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::create(|mut subscriber: Subscriber<i32, ()>| {
///   subscriber.next(1);
///   subscriber.next(2);
///   subscriber.complete();
/// })
/// .subscribe(|v| println!("{v}"));
/// ```
pub fn create<F, Item, Err>(subscribe: F) -> ObservableFn<F, Item, Err>
where
  F: FnOnce(Subscriber<Item, Err>),
{
  ObservableFn { func: subscribe, _marker: PhantomData }
}

/// Like [`create`], but an `Err` returned by the producer is delivered to
/// the subscriber's `error`.
pub fn try_create<F, Item, Err>(subscribe: F) -> TryObservableFn<F, Item, Err>
where
  F: FnOnce(&mut Subscriber<Item, Err>) -> Result<(), Err>,
{
  TryObservableFn { func: subscribe, _marker: PhantomData }
}

pub struct ObservableFn<F, Item, Err> {
  func: F,
  _marker: PhantomData<fn() -> (Item, Err)>,
}

impl<F: Clone, Item, Err> Clone for ObservableFn<F, Item, Err> {
  fn clone(&self) -> Self { ObservableFn { func: self.func.clone(), _marker: PhantomData } }
}

impl<F, Item, Err> Observable for ObservableFn<F, Item, Err>
where
  F: FnOnce(Subscriber<Item, Err>),
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  #[inline]
  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) { (self.func)(subscriber) }
}

pub struct TryObservableFn<F, Item, Err> {
  func: F,
  _marker: PhantomData<fn() -> (Item, Err)>,
}

impl<F: Clone, Item, Err> Clone for TryObservableFn<F, Item, Err> {
  fn clone(&self) -> Self { TryObservableFn { func: self.func.clone(), _marker: PhantomData } }
}

impl<F, Item, Err> Observable for TryObservableFn<F, Item, Err>
where
  F: FnOnce(&mut Subscriber<Item, Err>) -> Result<(), Err>,
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, mut subscriber: Subscriber<Item, Err>) {
    if let Err(err) = (self.func)(&mut subscriber) {
      subscriber.error(err);
    }
  }
}
