use std::marker::PhantomData;

use crate::{
  notification::Notification, observable::Observable, observer::Observer, subscriber::Subscriber,
};

#[derive(Clone)]
pub struct MaterializeOp<S> {
  pub(crate) source: S,
}

impl<S: Observable> Observable for MaterializeOp<S> {
  type Item = Notification<S::Item, S::Err>;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<Self::Item, S::Err>) {
    let subscription = subscriber.subscription().clone();
    self.source.actual_subscribe(Subscriber::new(MaterializeObserver(subscriber), subscription))
  }
}

struct MaterializeObserver<O>(O);

impl<Item, Err, O> Observer<Item, Err> for MaterializeObserver<O>
where
  O: Observer<Notification<Item, Err>, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.0.next(Notification::Next(value)) }

  fn error(&mut self, err: Err) {
    self.0.next(Notification::Error(err));
    self.0.complete();
  }

  fn complete(&mut self) {
    self.0.next(Notification::Completed);
    self.0.complete();
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

#[derive(Clone)]
pub struct DematerializeOp<S> {
  pub(crate) source: S,
}

impl<S, Item, Err> Observable for DematerializeOp<S>
where
  S: Observable<Item = Notification<Item, Err>, Err = Err>,
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    let subscription = subscriber.subscription().clone();
    let observer = DematerializeObserver { observer: subscriber, _marker: PhantomData };
    self.source.actual_subscribe(Subscriber::new(observer, subscription))
  }
}

struct DematerializeObserver<O, Item> {
  observer: O,
  _marker: PhantomData<fn(Item)>,
}

impl<Item, Err, O> Observer<Notification<Item, Err>, Err> for DematerializeObserver<O, Item>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Notification<Item, Err>) { value.accept(&mut self.observer) }

  #[inline]
  fn error(&mut self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
