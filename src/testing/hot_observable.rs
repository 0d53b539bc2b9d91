use std::sync::Arc;

use parking_lot::Mutex;

use super::{Recorded, SubscriptionLog};
use crate::{
  notification::Notification,
  observable::Observable,
  rc::MutArc,
  scheduler::VirtualTimeScheduler,
  subject::Subscribers,
  subscriber::Subscriber,
  subscription::ActionSubscription,
};

type SharedSubscriber<Item, Err> = MutArc<Subscriber<Item, Err>>;

struct HotState<Item, Err> {
  observers: Subscribers<SharedSubscriber<Item, Err>>,
  subscriptions: Vec<SubscriptionLog>,
}

/// A test source that emits its messages at fixed virtual times to whoever is
/// subscribed at that moment.
pub struct HotObservable<Item, Err> {
  scheduler: VirtualTimeScheduler,
  state: Arc<Mutex<HotState<Item, Err>>>,
}

impl<Item, Err> Clone for HotObservable<Item, Err> {
  fn clone(&self) -> Self { Self { scheduler: self.scheduler.clone(), state: self.state.clone() } }
}

impl<Item, Err> HotObservable<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  pub(crate) fn new(
    scheduler: VirtualTimeScheduler, messages: Vec<Recorded<Notification<Item, Err>>>,
  ) -> Self {
    let state = Arc::new(Mutex::new(HotState {
      observers: Subscribers::default(),
      subscriptions: vec![],
    }));
    for Recorded { time, value } in messages {
      let state = state.clone();
      scheduler.schedule_absolute(time, move || {
        let observers = state.lock().observers.snapshot();
        for mut observer in observers {
          value.clone().accept(&mut observer);
        }
      });
    }
    Self { scheduler, state }
  }
}

impl<Item, Err> HotObservable<Item, Err> {
  /// Subscribe/unsubscribe times of every observer so far, in subscription
  /// order.
  pub fn subscriptions(&self) -> Vec<SubscriptionLog> { self.state.lock().subscriptions.clone() }
}

impl<Item, Err> Observable for HotObservable<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    let subscription = subscriber.subscription().clone();
    let (id, index) = {
      let mut state = self.state.lock();
      let id = state.observers.add(MutArc::own(subscriber));
      state.subscriptions.push(SubscriptionLog::open(self.scheduler.clock()));
      (id, state.subscriptions.len() - 1)
    };

    let (state, scheduler) = (self.state, self.scheduler);
    subscription.add(ActionSubscription::new(move || {
      let removed = {
        let mut state = state.lock();
        state.subscriptions[index].unsubscribe = scheduler.clock();
        state.observers.remove(id)
      };
      drop(removed);
    }));
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::*};

  #[rxcore_macro::test]
  fn late_subscriber_misses_earlier_values() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, ()>(vec![
      on_next(150, 1),
      on_next(250, 2),
      on_completed(300),
    ]);
    let c_xs = xs.clone();
    let observer = scheduler.start(move || c_xs);
    assert_eq!(observer.messages(), vec![on_next(250, 2), on_completed(300)]);
    assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 300)]);
  }

  #[rxcore_macro::test]
  fn each_subscription_is_logged() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, ()>(vec![on_next(500, 1)]);
    let (c_xs, c_scheduler) = (xs.clone(), scheduler.clone());
    scheduler.schedule_absolute(300, move || {
      let mut first = c_xs.clone().subscribe(|_| {});
      let c_xs = c_xs.clone();
      c_scheduler.schedule_absolute(400, move || {
        first.unsubscribe();
        c_xs.subscribe(|_| {});
      });
    });
    scheduler.run();
    assert_eq!(
      xs.subscriptions(),
      vec![SubscriptionLog::new(300, 400), SubscriptionLog::open(400)]
    );
  }
}
