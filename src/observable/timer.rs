use std::{marker::PhantomData, time::Duration};

use super::Observable;
use crate::{
  observer::Observer,
  scheduler::{schedule_periodic, Scheduler},
  subscriber::Subscriber,
};

/// Emits `0` after `delay` on `scheduler`, then completes.
pub fn timer<Err, SD>(delay: Duration, scheduler: SD) -> TimerObservable<Err, SD>
where
  SD: Scheduler,
{
  TimerObservable { delay, scheduler, _marker: PhantomData }
}

/// Emits `0, 1, 2, ...` every `period` on `scheduler`, first after one period.
/// Never completes.
pub fn interval<Err, SD>(period: Duration, scheduler: SD) -> IntervalObservable<Err, SD>
where
  SD: Scheduler + Clone,
{
  IntervalObservable { period, scheduler, _marker: PhantomData }
}

pub struct TimerObservable<Err, SD> {
  delay: Duration,
  scheduler: SD,
  _marker: PhantomData<fn() -> Err>,
}

impl<Err, SD: Clone> Clone for TimerObservable<Err, SD> {
  fn clone(&self) -> Self {
    TimerObservable { delay: self.delay, scheduler: self.scheduler.clone(), _marker: PhantomData }
  }
}

impl<Err, SD> Observable for TimerObservable<Err, SD>
where
  Err: Send + 'static,
  SD: Scheduler,
{
  type Item = usize;
  type Err = Err;

  fn actual_subscribe(self, mut subscriber: Subscriber<usize, Err>) {
    let subscription = subscriber.subscription().clone();
    let handle = self.scheduler.schedule_after(
      self.delay,
      Box::new(move || {
        subscriber.next(0);
        subscriber.complete();
      }),
    );
    subscription.add(handle);
  }
}

pub struct IntervalObservable<Err, SD> {
  period: Duration,
  scheduler: SD,
  _marker: PhantomData<fn() -> Err>,
}

impl<Err, SD: Clone> Clone for IntervalObservable<Err, SD> {
  fn clone(&self) -> Self {
    IntervalObservable {
      period: self.period,
      scheduler: self.scheduler.clone(),
      _marker: PhantomData,
    }
  }
}

impl<Err, SD> Observable for IntervalObservable<Err, SD>
where
  Err: Send + 'static,
  SD: Scheduler + Clone + 'static,
{
  type Item = usize;
  type Err = Err;

  fn actual_subscribe(self, mut subscriber: Subscriber<usize, Err>) {
    let subscription = subscriber.subscription().clone();
    let ticks = schedule_periodic(self.scheduler, self.period, move |i| subscriber.next(i));
    subscription.add(ticks);
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use crate::{prelude::*, testing::*};

  #[rxcore_macro::test]
  fn timer_fires_once() {
    let scheduler = TestScheduler::new();
    let c_scheduler = scheduler.clone();
    let observer = scheduler.start(move || {
      observable::timer::<(), _>(Duration::from_millis(50), c_scheduler)
    });
    assert_eq!(observer.messages(), vec![on_next(250, 0), on_completed(250)]);
  }

  #[rxcore_macro::test]
  fn interval_until_disposed() {
    let scheduler = TestScheduler::new();
    let c_scheduler = scheduler.clone();
    let observer = scheduler.start_with_dispose(
      move || observable::interval::<(), _>(Duration::from_millis(100), c_scheduler),
      550,
    );
    assert_eq!(
      observer.messages(),
      vec![on_next(300, 0), on_next(400, 1), on_next(500, 2)]
    );
    assert_eq!(scheduler.pending_count(), 0);
  }
}
