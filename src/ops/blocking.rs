//! Terminal consumers that block the calling thread until the source
//! terminates.

use futures::{channel::mpsc, executor::block_on_stream};

use crate::{
  notification::Notification,
  observable::Observable,
  observer::Observer,
  subscription::SubscriptionLike,
};

struct ChannelObserver<Item, Err>(mpsc::UnboundedSender<Notification<Item, Err>>);

impl<Item, Err> Observer<Item, Err> for ChannelObserver<Item, Err> {
  fn next(&mut self, value: Item) { let _ = self.0.unbounded_send(Notification::Next(value)); }

  fn error(&mut self, err: Err) {
    let _ = self.0.unbounded_send(Notification::Error(err));
    self.0.close_channel();
  }

  fn complete(&mut self) {
    let _ = self.0.unbounded_send(Notification::Completed);
    self.0.close_channel();
  }

  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// Drives `source` and feeds every notification to `step` until it returns
/// `false` or the source terminates. The subscription is disposed on return.
fn consume<S, F>(source: S, mut step: F) -> Result<(), S::Err>
where
  S: Observable,
  F: FnMut(S::Item) -> bool,
{
  let (tx, rx) = mpsc::unbounded();
  let mut subscription = source.subscribe_with(ChannelObserver(tx));
  let mut result = Ok(());
  for notification in block_on_stream(rx) {
    match notification {
      Notification::Next(v) => {
        if !step(v) {
          break;
        }
      }
      Notification::Error(err) => {
        result = Err(err);
        break;
      }
      Notification::Completed => break,
    }
  }
  subscription.unsubscribe();
  result
}

pub(crate) fn first<S: Observable>(source: S) -> Result<Option<S::Item>, S::Err> {
  let mut first = None;
  consume(source, |v| {
    first = Some(v);
    false
  })?;
  Ok(first)
}

pub(crate) fn last<S: Observable>(source: S) -> Result<Option<S::Item>, S::Err> {
  let mut last = None;
  consume(source, |v| {
    last = Some(v);
    true
  })?;
  Ok(last)
}

pub(crate) fn collect<S: Observable>(source: S) -> Result<Vec<S::Item>, S::Err> {
  let mut values = vec![];
  consume(source, |v| {
    values.push(v);
    true
  })?;
  Ok(values)
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use crate::prelude::*;

  #[rxcore_macro::test]
  fn first_and_last() {
    let source = observable::from_iter::<_, ()>(vec![3, 4, 5]);
    assert_eq!(source.clone().block_first(), Ok(Some(3)));
    assert_eq!(source.block_last(), Ok(Some(5)));
    assert_eq!(observable::empty::<i32, ()>().block_last(), Ok(None));
  }

  #[rxcore_macro::test]
  fn first_disposes_an_endless_source() {
    let scheduler = NewThreadScheduler::default();
    let first =
      observable::interval::<(), _>(Duration::from_millis(5), scheduler).block_first().unwrap();
    assert_eq!(first, Some(0));
  }

  #[rxcore_macro::test]
  fn error_is_returned() {
    let result = observable::from_iter(vec![1, 2])
      .merge(observable::throw("closed"))
      .block_collect();
    assert_eq!(result, Err("closed"));
  }
}
