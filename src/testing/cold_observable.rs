use std::sync::Arc;

use parking_lot::Mutex;

use super::{Recorded, SubscriptionLog};
use crate::{
  notification::Notification,
  observable::Observable,
  rc::MutArc,
  scheduler::{TaskHandle, VirtualTimeScheduler},
  subscriber::Subscriber,
  subscription::{ActionSubscription, SubscriptionLike},
};

/// A test source that plays its messages to each subscriber separately,
/// with times relative to the moment that subscriber subscribed.
pub struct ColdObservable<Item, Err> {
  scheduler: VirtualTimeScheduler,
  messages: Vec<Recorded<Notification<Item, Err>>>,
  subscriptions: Arc<Mutex<Vec<SubscriptionLog>>>,
}

impl<Item: Clone, Err: Clone> Clone for ColdObservable<Item, Err> {
  fn clone(&self) -> Self {
    Self {
      scheduler: self.scheduler.clone(),
      messages: self.messages.clone(),
      subscriptions: self.subscriptions.clone(),
    }
  }
}

impl<Item, Err> ColdObservable<Item, Err> {
  pub(crate) fn new(
    scheduler: VirtualTimeScheduler, messages: Vec<Recorded<Notification<Item, Err>>>,
  ) -> Self {
    Self { scheduler, messages, subscriptions: Arc::default() }
  }

  pub fn subscriptions(&self) -> Vec<SubscriptionLog> { self.subscriptions.lock().clone() }
}

impl<Item, Err> Observable for ColdObservable<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    let subscription = subscriber.subscription().clone();
    let index = {
      let mut logs = self.subscriptions.lock();
      logs.push(SubscriptionLog::open(self.scheduler.clock()));
      logs.len() - 1
    };

    let observer = MutArc::own(subscriber);
    let handles: Vec<TaskHandle> = self
      .messages
      .into_iter()
      .map(|Recorded { time, value }| {
        let mut observer = observer.clone();
        self.scheduler.schedule_relative(time, move || value.accept(&mut observer))
      })
      .collect();

    let (logs, scheduler) = (self.subscriptions, self.scheduler);
    subscription.add(ActionSubscription::new(move || {
      logs.lock()[index].unsubscribe = scheduler.clock();
      for mut handle in handles {
        handle.unsubscribe();
      }
    }));
  }
}
