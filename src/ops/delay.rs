use std::{collections::VecDeque, sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{
  notification::Notification,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::Scheduler,
  subscriber::Subscriber,
  subscription::{CompositeSubscription, SerialSubscription},
};

#[derive(Clone)]
pub struct DelayOp<S, SD> {
  pub(crate) source: S,
  pub(crate) delay: Duration,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for DelayOp<S, SD>
where
  S: Observable,
  SD: Scheduler + Clone + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let observer = DelayObserver::new(subscriber, self.scheduler, self.delay, false);
    observer.subscribe_source(self.source)
  }
}

#[derive(Clone)]
pub struct ObserveOnOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for ObserveOnOp<S, SD>
where
  S: Observable,
  SD: Scheduler + Clone + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let observer = DelayObserver::new(subscriber, self.scheduler, Duration::ZERO, true);
    observer.subscribe_source(self.source)
  }
}

/// Queues notifications with their due time and drains them in order from
/// at most one scheduled task at a time.
struct DelayShared<Item, Err, SD> {
  scheduler: SD,
  delay: Duration,
  delay_error: bool,
  observer: MutArc<Subscriber<Item, Err>>,
  queue: Mutex<DelayQueue<Item, Err>>,
  pending: SerialSubscription,
}

struct DelayQueue<Item, Err> {
  items: VecDeque<(Duration, Notification<Item, Err>)>,
  running: bool,
}

struct DelayObserver<Item, Err, SD>(Arc<DelayShared<Item, Err, SD>>);

impl<Item, Err, SD> DelayObserver<Item, Err, SD>
where
  Item: Send + 'static,
  Err: Send + 'static,
  SD: Scheduler + 'static,
{
  fn new(
    subscriber: Subscriber<Item, Err>, scheduler: SD, delay: Duration, delay_error: bool,
  ) -> Self {
    let pending = SerialSubscription::default();
    subscriber.subscription().add(pending.clone());
    DelayObserver(Arc::new(DelayShared {
      scheduler,
      delay,
      delay_error,
      observer: MutArc::own(subscriber),
      queue: Mutex::new(DelayQueue { items: VecDeque::new(), running: false }),
      pending,
    }))
  }

  /// The source gets a child subscription: its terminal releases the source
  /// only, while queued notifications still reach the downstream.
  fn subscribe_source<S>(self, source: S)
  where
    S: Observable<Item = Item, Err = Err>,
  {
    let parent = self.0.observer.rc_deref_mut(|subscriber| subscriber.subscription().clone());
    let upstream = CompositeSubscription::default();
    parent.add(upstream.clone());
    source.actual_subscribe(Subscriber::new(self, upstream))
  }

  fn enqueue(&self, notification: Notification<Item, Err>) {
    let due = self.0.scheduler.now() + self.0.delay;
    {
      let mut queue = self.0.queue.lock();
      queue.items.push_back((due, notification));
      if queue.running {
        return;
      }
      queue.running = true;
    }
    schedule_drain(self.0.clone(), due);
  }
}

fn schedule_drain<Item, Err, SD>(shared: Arc<DelayShared<Item, Err, SD>>, due: Duration)
where
  Item: Send + 'static,
  Err: Send + 'static,
  SD: Scheduler + 'static,
{
  let c_shared = shared.clone();
  let handle = shared.scheduler.schedule_at(due, Box::new(move || drain(c_shared)));
  shared.pending.set(handle);
}

fn drain<Item, Err, SD>(shared: Arc<DelayShared<Item, Err, SD>>)
where
  Item: Send + 'static,
  Err: Send + 'static,
  SD: Scheduler + 'static,
{
  loop {
    let notification = {
      let mut queue = shared.queue.lock();
      match queue.items.front() {
        Some((due, _)) if *due <= shared.scheduler.now() => queue.items.pop_front().map(|(_, n)| n),
        Some((due, _)) => {
          let due = *due;
          drop(queue);
          schedule_drain(shared, due);
          return;
        }
        None => {
          queue.running = false;
          return;
        }
      }
    };
    if let Some(notification) = notification {
      shared.observer.rc_deref_mut(|observer| notification.accept(observer));
    }
  }
}

impl<Item, Err, SD> Observer<Item, Err> for DelayObserver<Item, Err, SD>
where
  Item: Send + 'static,
  Err: Send + 'static,
  SD: Scheduler + 'static,
{
  fn next(&mut self, value: Item) { self.enqueue(Notification::Next(value)) }

  fn error(&mut self, err: Err) {
    if self.0.delay_error {
      self.enqueue(Notification::Error(err));
    } else {
      self.0.queue.lock().items.clear();
      self.0.observer.rc_deref_mut(|observer| observer.error(err));
    }
  }

  fn complete(&mut self) { self.enqueue(Notification::Completed) }

  fn is_closed(&self) -> bool {
    self.0.observer.try_rc_deref(|observer| observer.is_closed()).unwrap_or(false)
  }
}
