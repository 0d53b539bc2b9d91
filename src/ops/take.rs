use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

#[derive(Clone)]
pub struct TakeOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

impl<S: Observable> Observable for TakeOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, mut subscriber: Subscriber<S::Item, S::Err>) {
    if self.count == 0 {
      subscriber.complete();
      return;
    }
    let subscription = subscriber.subscription().clone();
    let take = TakeObserver { observer: subscriber, remaining: self.count };
    self.source.actual_subscribe(Subscriber::new(take, subscription))
  }
}

struct TakeObserver<O> {
  observer: O,
  remaining: usize,
}

impl<Item, Err, O> Observer<Item, Err> for TakeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.remaining > 0 {
      self.remaining -= 1;
      self.observer.next(value);
      if self.remaining == 0 {
        self.observer.complete();
      }
    }
  }

  #[inline]
  fn error(&mut self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.remaining == 0 || self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use crate::{prelude::*, testing::*};

  #[rxcore_macro::test]
  fn base_function() {
    let completed = Arc::new(AtomicUsize::new(0));
    let next_count = Arc::new(AtomicUsize::new(0));
    let (c_completed, c_next) = (completed.clone(), next_count.clone());

    observable::from_iter::<_, ()>(0..100).take(5).subscribe_complete(
      move |_| {
        c_next.fetch_add(1, Ordering::SeqCst);
      },
      move || {
        c_completed.fetch_add(1, Ordering::SeqCst);
      },
    );

    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert_eq!(next_count.load(Ordering::SeqCst), 5);
  }

  #[rxcore_macro::test]
  fn take_more_than_available() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_cold_observable::<i32, ()>(vec![
      on_next(10, 1),
      on_next(20, 2),
      on_completed(30),
    ]);
    let c_xs = xs.clone();
    let observer = scheduler.start(move || c_xs.take(10));
    assert_eq!(observer.messages(), vec![on_next(210, 1), on_next(220, 2), on_completed(230)]);
    assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 230)]);
  }

  #[rxcore_macro::test]
  fn upstream_error_passes_through() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable(vec![on_next(210, 1), on_error(220, "oops")]);
    let c_xs = xs.clone();
    let observer = scheduler.start(move || c_xs.take(3));
    assert_eq!(observer.messages(), vec![on_next(210, 1), on_error(220, "oops")]);
  }
}
