use std::sync::Arc;

use parking_lot::Mutex;

use super::Recorded;
use crate::{notification::Notification, observer::Observer, scheduler::VirtualTimeScheduler};

/// Records every notification it receives together with the virtual time
/// it arrived at. Clones share the same log.
pub struct MockObserver<Item, Err> {
  scheduler: VirtualTimeScheduler,
  messages: Arc<Mutex<Vec<Recorded<Notification<Item, Err>>>>>,
}

impl<Item, Err> Clone for MockObserver<Item, Err> {
  fn clone(&self) -> Self {
    Self { scheduler: self.scheduler.clone(), messages: self.messages.clone() }
  }
}

impl<Item, Err> MockObserver<Item, Err> {
  pub(crate) fn new(scheduler: VirtualTimeScheduler) -> Self {
    Self { scheduler, messages: Arc::default() }
  }

  fn record(&self, notification: Notification<Item, Err>) {
    let time = self.scheduler.clock();
    self.messages.lock().push(Recorded::new(time, notification));
  }
}

impl<Item: Clone, Err: Clone> MockObserver<Item, Err> {
  pub fn messages(&self) -> Vec<Recorded<Notification<Item, Err>>> { self.messages.lock().clone() }
}

impl<Item, Err> Observer<Item, Err> for MockObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.record(Notification::Next(value)); }

  fn error(&mut self, err: Err) { self.record(Notification::Error(err)); }

  fn complete(&mut self) { self.record(Notification::Completed); }

  fn is_closed(&self) -> bool { false }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::*};

  #[rxcore_macro::test]
  fn records_raw_calls() {
    let scheduler = TestScheduler::new();
    let mut observer = scheduler.create_observer::<i32, &str>();
    let mut c_observer = observer.clone();
    scheduler.schedule_absolute(10, move || c_observer.next(1));
    scheduler.advance_to(20).unwrap();
    observer.error("late");
    // Unlike a subscriber, the mock does not police the grammar.
    observer.complete();
    assert_eq!(observer.messages(), vec![on_next(10, 1), on_error(20, "late"), on_completed(20)]);
    assert!(!is_well_formed(&observer.messages()));
  }
}
