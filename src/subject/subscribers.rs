use smallvec::SmallVec;

use crate::observer::Observer;

/// Observers subscribed to a subject, keyed by id.
///
/// Emission never iterates this container while its lock is held: callers
/// take a [`snapshot`](Subscribers::snapshot) and deliver to that, so an
/// observer added or removed during an emit does not disturb the loop.
pub(crate) struct Subscribers<Ob> {
  next_id: usize,
  entries: SmallVec<[(usize, Ob); 2]>,
}

impl<Ob> Default for Subscribers<Ob> {
  fn default() -> Self { Self { next_id: 0, entries: SmallVec::new() } }
}

impl<Ob> Subscribers<Ob> {
  /// Add an observer and return its unique ID.
  pub fn add(&mut self, observer: Ob) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.entries.push((id, observer));
    id
  }

  /// Remove an observer by ID.
  pub fn remove(&mut self, id: usize) -> Option<Ob> {
    let pos = self.entries.iter().position(|(k, _)| *k == id)?;
    Some(self.entries.remove(pos).1)
  }

  #[inline]
  pub fn len(&self) -> usize { self.entries.len() }

  /// Removes and returns every observer.
  pub fn take_all(&mut self) -> Vec<Ob> { self.entries.drain(..).map(|(_, ob)| ob).collect() }
}

impl<Ob: Clone> Subscribers<Ob> {
  pub fn snapshot(&self) -> Vec<Ob> { self.entries.iter().map(|(_, ob)| ob.clone()).collect() }
}

/// Delivers `value` to every observer; the value is cloned for all but the
/// last one, which receives the moved value.
pub(crate) fn broadcast_value<Ob, Item, Err>(observers: Vec<Ob>, value: Item)
where
  Ob: Observer<Item, Err>,
  Item: Clone,
{
  let mut iter = observers.into_iter().peekable();
  while let Some(mut observer) = iter.next() {
    if iter.peek().is_some() {
      observer.next(value.clone());
    } else {
      observer.next(value);
      break;
    }
  }
}

pub(crate) fn broadcast_error<Ob, Item, Err>(observers: Vec<Ob>, err: Err)
where
  Ob: Observer<Item, Err>,
  Err: Clone,
{
  let mut iter = observers.into_iter().peekable();
  while let Some(mut observer) = iter.next() {
    if iter.peek().is_some() {
      observer.error(err.clone());
    } else {
      observer.error(err);
      break;
    }
  }
}

pub(crate) fn broadcast_complete<Ob, Item, Err>(observers: Vec<Ob>)
where
  Ob: Observer<Item, Err>,
{
  for mut observer in observers {
    observer.complete();
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use super::*;
  use crate::{observer::ObserverN, rc::MutArc};

  #[rxcore_macro::test]
  fn add_remove_by_id() {
    let mut subscribers = Subscribers::default();
    let a = subscribers.add("a");
    let b = subscribers.add("b");
    assert_eq!(subscribers.remove(a), Some("a"));
    assert_eq!(subscribers.remove(a), None);
    assert_eq!(subscribers.snapshot(), vec!["b"]);
    assert_eq!(subscribers.remove(b), Some("b"));
    assert_eq!(subscribers.len(), 0);
  }

  #[rxcore_macro::test]
  fn broadcast_reaches_every_observer() {
    let log = Arc::new(Mutex::new(vec![]));
    let observers: Vec<_> = (0..3)
      .map(|i| {
        let log = log.clone();
        MutArc::own(ObserverN(move |v: String| log.lock().push(format!("{i}:{v}"))))
      })
      .collect();
    broadcast_value::<_, _, ()>(observers, "x".to_string());
    assert_eq!(*log.lock(), vec!["0:x", "1:x", "2:x"]);
  }
}
