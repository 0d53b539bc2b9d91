use std::marker::PhantomData;

use super::Observable;
use crate::{observer::Observer, subscriber::Subscriber};

/// Creates an observable that emits no items, just terminates with an error.
pub fn throw<Item, Err>(e: Err) -> ThrowObservable<Item, Err> { ThrowObservable(e, PhantomData) }

pub struct ThrowObservable<Item, Err>(Err, PhantomData<fn() -> Item>);

impl<Item, Err: Clone> Clone for ThrowObservable<Item, Err> {
  fn clone(&self) -> Self { ThrowObservable(self.0.clone(), PhantomData) }
}

impl<Item, Err> Observable for ThrowObservable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, mut subscriber: Subscriber<Item, Err>) { subscriber.error(self.0) }
}

/// Creates an observable that produces no values.
///
/// Completes immediately. Never emits an error.
pub fn empty<Item, Err>() -> EmptyObservable<Item, Err> { EmptyObservable(PhantomData) }

pub struct EmptyObservable<Item, Err>(PhantomData<fn() -> (Item, Err)>);

impl<Item, Err> Clone for EmptyObservable<Item, Err> {
  fn clone(&self) -> Self { EmptyObservable(PhantomData) }
}

impl<Item, Err> Observable for EmptyObservable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, mut subscriber: Subscriber<Item, Err>) { subscriber.complete() }
}

/// Creates an observable that never emits anything.
///
/// Neither emits a value, nor completes, nor emits an error.
pub fn never<Item, Err>() -> NeverObservable<Item, Err> { NeverObservable(PhantomData) }

pub struct NeverObservable<Item, Err>(PhantomData<fn() -> (Item, Err)>);

impl<Item, Err> Clone for NeverObservable<Item, Err> {
  fn clone(&self) -> Self { NeverObservable(PhantomData) }
}

impl<Item, Err> Observable for NeverObservable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  #[inline]
  fn actual_subscribe(self, _subscriber: Subscriber<Item, Err>) {}
}
