use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscriber::Subscriber,
  subscription::{CompositeSubscription, SubscriptionLike},
};

#[derive(Clone)]
pub struct MergeOp<S1, S2> {
  pub(crate) source1: S1,
  pub(crate) source2: S2,
}

impl<S1, S2> Observable for MergeOp<S1, S2>
where
  S1: Observable,
  S2: Observable<Item = S1::Item, Err = S1::Err>,
{
  type Item = S1::Item;
  type Err = S1::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S1::Item, S1::Err>) {
    let parent = subscriber.subscription().clone();
    let state = MutArc::own(MergeState { observer: subscriber, active: 2 });
    subscribe_inner(self.source1, &state, &parent);
    subscribe_inner(self.source2, &state, &parent);
  }
}

/// Merges every observable of `sources` into one stream.
///
/// Completes once all sources completed, immediately if there are none. The
/// first error from any source terminates the merged stream and disposes
/// the others.
pub fn merge_all<I>(sources: I) -> MergeAllOp<I::Item>
where
  I: IntoIterator,
  I::Item: Observable,
{
  MergeAllOp { sources: sources.into_iter().collect() }
}

#[derive(Clone)]
pub struct MergeAllOp<S> {
  sources: Vec<S>,
}

impl<S: Observable> Observable for MergeAllOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, mut subscriber: Subscriber<S::Item, S::Err>) {
    if self.sources.is_empty() {
      subscriber.complete();
      return;
    }
    let parent = subscriber.subscription().clone();
    let state = MutArc::own(MergeState { observer: subscriber, active: self.sources.len() });
    for source in self.sources {
      subscribe_inner(source, &state, &parent);
    }
  }
}

struct MergeState<Item, Err> {
  observer: Subscriber<Item, Err>,
  active: usize,
}

/// Each inner source gets its own child subscription, so completing one
/// releases only that source.
fn subscribe_inner<S: Observable>(
  source: S, state: &MutArc<MergeState<S::Item, S::Err>>, parent: &CompositeSubscription,
) {
  if parent.is_closed() {
    return;
  }
  let child = CompositeSubscription::default();
  parent.add(child.clone());
  source.actual_subscribe(Subscriber::new(MergeInnerObserver(state.clone()), child));
}

struct MergeInnerObserver<Item, Err>(MutArc<MergeState<Item, Err>>);

impl<Item, Err> Observer<Item, Err> for MergeInnerObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.0.rc_deref_mut(|s| s.observer.next(value)) }

  fn error(&mut self, err: Err) { self.0.rc_deref_mut(|s| s.observer.error(err)) }

  fn complete(&mut self) {
    self.0.rc_deref_mut(|s| {
      s.active -= 1;
      if s.active == 0 {
        s.observer.complete()
      }
    })
  }

  fn is_closed(&self) -> bool { self.0.try_rc_deref(|s| s.observer.is_closed()).unwrap_or(false) }
}
