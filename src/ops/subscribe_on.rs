use crate::{observable::Observable, scheduler::Scheduler, subscriber::Subscriber};

#[derive(Clone)]
pub struct SubscribeOnOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for SubscribeOnOp<S, SD>
where
  S: Observable + Send + 'static,
  SD: Scheduler + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let subscription = subscriber.subscription().clone();
    let source = self.source;
    let handle = self.scheduler.schedule_now(Box::new(move || source.actual_subscribe(subscriber)));
    subscription.add(handle);
  }
}
