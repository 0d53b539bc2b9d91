//! Type-erased observables, for storing heterogeneous sources or returning
//! a pipeline without naming its type.

use std::fmt;

use super::Observable;
use crate::subscriber::Subscriber;

/// Object-safe observable trait for type erasure.
trait DynObservable<Item, Err>: Send {
  fn box_subscribe(self: Box<Self>, subscriber: Subscriber<Item, Err>);
}

impl<S> DynObservable<S::Item, S::Err> for S
where
  S: Observable + Send,
{
  fn box_subscribe(self: Box<Self>, subscriber: Subscriber<S::Item, S::Err>) {
    (*self).actual_subscribe(subscriber)
  }
}

pub struct BoxObservable<Item, Err>(Box<dyn DynObservable<Item, Err>>);

impl<Item, Err> BoxObservable<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: Observable<Item = Item, Err = Err> + Send + 'static,
  {
    BoxObservable(Box::new(source))
  }
}

impl<Item, Err> Observable for BoxObservable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) { self.0.box_subscribe(subscriber) }
}

impl<Item, Err> fmt::Debug for BoxObservable<Item, Err> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("BoxObservable") }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxcore_macro::test]
  fn heterogeneous_sources_in_one_vec() {
    let sources: Vec<BoxObservable<i32, ()>> = vec![
      observable::of(1).box_it(),
      observable::from_iter(vec![2, 3]).map(|v| v * 10).box_it(),
      observable::empty().box_it(),
    ];
    let values = Arc::new(Mutex::new(vec![]));
    for source in sources {
      let values = values.clone();
      source.subscribe(move |v| values.lock().push(v));
    }
    assert_eq!(*values.lock(), vec![1, 20, 30]);
  }
}
