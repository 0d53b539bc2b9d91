use crate::observer::Observer;

/// One unit of the stream protocol.
///
/// A well-formed sequence is `Next* (Error | Completed)?`. `Error` and
/// `Completed` are terminal: nothing may follow them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Completed,
}

impl<Item, Err> Notification<Item, Err> {
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }

  /// Delivers this notification to `observer`.
  pub fn accept<O>(self, observer: &mut O)
  where
    O: Observer<Item, Err> + ?Sized,
  {
    match self {
      Notification::Next(v) => observer.next(v),
      Notification::Error(e) => observer.error(e),
      Notification::Completed => observer.complete(),
    }
  }

  pub fn map<B>(self, f: impl FnOnce(Item) -> B) -> Notification<B, Err> {
    match self {
      Notification::Next(v) => Notification::Next(f(v)),
      Notification::Error(e) => Notification::Error(e),
      Notification::Completed => Notification::Completed,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Default)]
  struct Collect(Vec<String>);

  impl Observer<i32, &'static str> for Collect {
    fn next(&mut self, value: i32) { self.0.push(format!("next {value}")); }
    fn error(&mut self, err: &'static str) { self.0.push(format!("error {err}")); }
    fn complete(&mut self) { self.0.push("complete".into()); }
  }

  #[rxcore_macro::test]
  fn accept_dispatches_each_variant() {
    let mut obs = Collect::default();
    Notification::Next(1).accept(&mut obs);
    Notification::<i32, &str>::Error("boom").accept(&mut obs);
    Notification::<i32, &str>::Completed.accept(&mut obs);
    assert_eq!(obs.0, vec!["next 1", "error boom", "complete"]);
  }

  #[rxcore_macro::test]
  fn terminal_classification() {
    assert!(!Notification::<_, ()>::Next(1).is_terminal());
    assert!(Notification::<i32, _>::Error(()).is_terminal());
    assert!(Notification::<i32, ()>::Completed.is_terminal());
    assert_eq!(Notification::<_, ()>::Next(2).map(|v| v * 10), Notification::Next(20));
  }
}
