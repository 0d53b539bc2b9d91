use std::fmt;

use crate::{notification::Notification, scheduler::VirtualTime};

/// A value stamped with the virtual time it was observed at.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Recorded<T> {
  pub time: VirtualTime,
  pub value: T,
}

impl<T> Recorded<T> {
  pub fn new(time: VirtualTime, value: T) -> Self { Self { time, value } }
}

impl<T: fmt::Debug> fmt::Debug for Recorded<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}@{}", self.value, self.time)
  }
}

pub fn on_next<Item, Err>(time: VirtualTime, value: Item) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Next(value))
}

pub fn on_error<Item, Err>(time: VirtualTime, err: Err) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Error(err))
}

pub fn on_completed<Item, Err>(time: VirtualTime) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Completed)
}

/// The virtual interval during which an observer was subscribed to a test
/// source.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionLog {
  pub subscribe: VirtualTime,
  pub unsubscribe: VirtualTime,
}

impl SubscriptionLog {
  pub fn new(subscribe: VirtualTime, unsubscribe: VirtualTime) -> Self {
    Self { subscribe, unsubscribe }
  }

  /// A subscription that was never released.
  pub fn open(subscribe: VirtualTime) -> Self { Self::new(subscribe, VirtualTime::MAX) }

  #[inline]
  pub fn is_open(&self) -> bool { self.unsubscribe == VirtualTime::MAX }
}

impl fmt::Debug for SubscriptionLog {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_open() {
      write!(f, "({}, ∞)", self.subscribe)
    } else {
      write!(f, "({}, {})", self.subscribe, self.unsubscribe)
    }
  }
}

/// Checks `messages` against `Next* (Error | Completed)?` with
/// non-decreasing times.
pub fn is_well_formed<Item, Err>(messages: &[Recorded<Notification<Item, Err>>]) -> bool {
  let times_ordered = messages.windows(2).all(|w| w[0].time <= w[1].time);
  let terminal_last =
    messages.iter().rev().skip(1).all(|message| !message.value.is_terminal());
  times_ordered && terminal_last
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxcore_macro::test]
  fn grammar_checks() {
    let ok: Vec<Recorded<Notification<i32, ()>>> =
      vec![on_next(1, 1), on_next(1, 2), on_completed(3)];
    assert!(is_well_formed(&ok));
    assert!(is_well_formed::<i32, ()>(&[]));

    let after_terminal: Vec<Recorded<Notification<i32, ()>>> =
      vec![on_next(1, 1), on_error(2, ()), on_next(3, 2)];
    assert!(!is_well_formed(&after_terminal));

    let two_terminals: Vec<Recorded<Notification<i32, ()>>> =
      vec![on_completed(2), on_completed(2)];
    assert!(!is_well_formed(&two_terminals));

    let backwards: Vec<Recorded<Notification<i32, ()>>> = vec![on_next(5, 1), on_next(4, 2)];
    assert!(!is_well_formed(&backwards));
  }

  #[rxcore_macro::test]
  fn debug_output() {
    assert_eq!(format!("{:?}", on_next::<_, ()>(210, 3)), "Next(3)@210");
    assert_eq!(format!("{:?}", SubscriptionLog::new(200, 250)), "(200, 250)");
    assert_eq!(format!("{:?}", SubscriptionLog::open(200)), "(200, ∞)");
  }
}
