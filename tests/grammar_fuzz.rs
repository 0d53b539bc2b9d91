//! Random, possibly ill-formed notification scripts pushed through operator
//! chains must always reach the observer as `Next* (Error | Completed)?`.

use proptest::prelude::*;
use rxcore::{prelude::*, testing::*};

fn notification() -> impl Strategy<Value = Notification<i32, u8>> {
  prop_oneof![
    6 => any::<i32>().prop_map(Notification::Next),
    1 => any::<u8>().prop_map(Notification::Error),
    1 => Just(Notification::Completed),
  ]
}

/// Messages at strictly increasing times after the harness subscribed.
fn script() -> impl Strategy<Value = Vec<Recorded<Notification<i32, u8>>>> {
  prop::collection::vec((1u64..40, notification()), 0..24).prop_map(|steps| {
    let mut time = 200;
    steps
      .into_iter()
      .map(|(delta, value)| {
        time += delta;
        Recorded::new(time, value)
      })
      .collect()
  })
}

#[derive(Debug, Clone, Copy)]
enum Stage {
  Map,
  Filter,
  Take(usize),
}

fn stage() -> impl Strategy<Value = Stage> {
  prop_oneof![Just(Stage::Map), Just(Stage::Filter), (0usize..6).prop_map(Stage::Take)]
}

fn apply<S>(source: S, stage: Stage) -> BoxObservable<i32, u8>
where
  S: Observable<Item = i32, Err = u8> + Send + 'static,
{
  match stage {
    Stage::Map => source.map(|v| v.wrapping_mul(3)).box_it(),
    Stage::Filter => source.filter(|v| v % 2 == 0).box_it(),
    Stage::Take(n) => source.take(n).box_it(),
  }
}

proptest! {
  #[test]
  fn operator_chains_keep_the_grammar(
    left in script(),
    right in script(),
    stages in prop::collection::vec(stage(), 0..4),
  ) {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable(left);
    let ys = scheduler.create_cold_observable(right);
    let observer = scheduler.start(move || {
      stages.into_iter().fold(xs.merge(ys).box_it(), apply)
    });

    let messages = observer.messages();
    prop_assert!(is_well_formed(&messages), "ill-formed: {:?}", messages);
    prop_assert!(messages.iter().all(|m| m.time >= 200 && m.time <= 1000));
  }

  #[test]
  fn materialize_round_trips_any_script(messages in script()) {
    let direct = {
      let scheduler = TestScheduler::new();
      let xs = scheduler.create_hot_observable(messages.clone());
      scheduler.start(move || xs).messages()
    };
    let trip = {
      let scheduler = TestScheduler::new();
      let xs = scheduler.create_hot_observable(messages);
      scheduler.start(move || xs.materialize().dematerialize()).messages()
    };
    prop_assert_eq!(trip, direct);
  }
}
