//! Observer trait and closure adapters
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

/// Observer trait: The consumer of data in reactive programming
///
/// An `Observer` should see `next* (error | complete)?`. Sources do not have to
/// police that themselves: every public subscribe path wraps the observer in a
/// [`Subscriber`](crate::subscriber::Subscriber) that drops anything after a
/// terminal notification.
pub trait Observer<Item, Err> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable. No more values follow.
  fn error(&mut self, err: Err);

  /// Handle completion of the observable. No more values follow.
  fn complete(&mut self);

  /// Returns `true` if the observer will not accept more notifications.
  ///
  /// Synchronous sources (like `from_iter`) poll this to stop emitting early,
  /// e.g. when a downstream `take` already completed.
  fn is_closed(&self) -> bool { false }
}

/// Boxed observer, the form in which observers cross the subscribe boundary.
pub type BoxObserver<Item, Err> = Box<dyn Observer<Item, Err> + Send>;

impl<Item, Err, O> Observer<Item, Err> for Box<O>
where
  O: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }

  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }

  #[inline]
  fn complete(&mut self) { (**self).complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

// ============================================================================
// Closure adapters
// ============================================================================

/// Observer built from a `next` closure. Errors and completion are ignored.
#[derive(Clone)]
pub struct ObserverN<N>(pub N);

impl<Item, Err, N> Observer<Item, Err> for ObserverN<N>
where
  N: FnMut(Item),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.0)(value) }

  fn error(&mut self, _err: Err) {
    tracing::debug!("error reached a subscriber without an error handler");
  }

  #[inline]
  fn complete(&mut self) {}
}

/// Observer built from `next` and `error` closures.
#[derive(Clone)]
pub struct ObserverErr<N, E> {
  pub next: N,
  pub error: E,
}

impl<Item, Err, N, E> Observer<Item, Err> for ObserverErr<N, E>
where
  N: FnMut(Item),
  E: FnMut(Err),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(&mut self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(&mut self) {}
}

/// Observer built from `next` and `complete` closures.
#[derive(Clone)]
pub struct ObserverComp<N, C> {
  pub next: N,
  pub complete: C,
}

impl<Item, Err, N, C> Observer<Item, Err> for ObserverComp<N, C>
where
  N: FnMut(Item),
  C: FnMut(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  fn error(&mut self, _err: Err) {
    tracing::debug!("error reached a subscriber without an error handler");
  }

  #[inline]
  fn complete(&mut self) { (self.complete)() }
}

/// Observer built from `next`, `error` and `complete` closures.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  pub next: N,
  pub error: E,
  pub complete: C,
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnMut(Err),
  C: FnMut(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(&mut self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(&mut self) { (self.complete)() }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct TestObserver {
    values: Vec<i32>,
  }

  impl Observer<i32, ()> for TestObserver {
    fn next(&mut self, value: i32) { self.values.push(value); }

    fn error(&mut self, _: ()) {}

    fn complete(&mut self) {}
  }

  #[rxcore_macro::test]
  fn test_observer_trait() {
    let mut obs = TestObserver { values: vec![] };
    obs.next(1);
    obs.next(2);
    assert_eq!(obs.values, vec![1, 2]);
    assert!(!obs.is_closed());
  }

  #[rxcore_macro::test]
  fn test_boxed_observer_forwards() {
    let mut count = 0;
    {
      let mut boxed: Box<dyn Observer<i32, ()>> = Box::new(ObserverN(|v: i32| count += v));
      boxed.next(10);
      boxed.next(20);
      boxed.complete();
    }
    assert_eq!(count, 30);
  }

  #[rxcore_macro::test]
  fn test_all_adapter() {
    let mut log = vec![];
    {
      let mut obs = ObserverAll {
        next: |v: i32| log.push(format!("n{v}")),
        error: |e: &str| println!("{e}"),
        complete: || {},
      };
      obs.next(1);
      obs.error("x");
    }
    assert_eq!(log, vec!["n1"]);
  }
}
