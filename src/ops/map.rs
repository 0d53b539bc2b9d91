use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

#[derive(Clone)]
pub struct MapOp<S, M> {
  pub(crate) source: S,
  pub(crate) func: M,
}

impl<Item, S, M> Observable for MapOp<S, M>
where
  S: Observable,
  M: FnMut(S::Item) -> Item + Send + 'static,
  Item: Send + 'static,
{
  type Item = Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, S::Err>) {
    let subscription = subscriber.subscription().clone();
    let map = MapObserver { observer: subscriber, map: self.func };
    self.source.actual_subscribe(Subscriber::new(map, subscription))
  }
}

struct MapObserver<O, M> {
  observer: O,
  map: M,
}

impl<Item, Err, O, M, B> Observer<Item, Err> for MapObserver<O, M>
where
  O: Observer<B, Err>,
  M: FnMut(Item) -> B,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next((self.map)(value)) }

  #[inline]
  fn error(&mut self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[derive(Clone)]
pub struct TryMapOp<S, M> {
  pub(crate) source: S,
  pub(crate) func: M,
}

impl<Item, S, M> Observable for TryMapOp<S, M>
where
  S: Observable,
  M: FnMut(S::Item) -> Result<Item, S::Err> + Send + 'static,
  Item: Send + 'static,
{
  type Item = Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, S::Err>) {
    let subscription = subscriber.subscription().clone();
    let map = TryMapObserver { observer: subscriber, map: self.func };
    self.source.actual_subscribe(Subscriber::new(map, subscription))
  }
}

struct TryMapObserver<O, M> {
  observer: O,
  map: M,
}

impl<Item, Err, O, M, B> Observer<Item, Err> for TryMapObserver<O, M>
where
  O: Observer<B, Err>,
  M: FnMut(Item) -> Result<B, Err>,
{
  fn next(&mut self, value: Item) {
    match (self.map)(value) {
      Ok(v) => self.observer.next(v),
      // Terminal on the downstream subscriber: the shared subscription is
      // disposed, and the wrapper in front of us drops further calls.
      Err(err) => self.observer.error(err),
    }
  }

  #[inline]
  fn error(&mut self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
