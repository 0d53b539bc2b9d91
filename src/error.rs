//! Error type for misuse and expected failure conditions.
//!
//! Sequence errors are never represented here: they travel through
//! `Observer::error` with the stream's own `Err` type. `RxError` covers the
//! conditions a caller can check for before or instead of subscribing, such as
//! invalid arguments or a virtual clock that is asked to move backwards.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RxError {
  #[error("argument `{name}` is out of range: {reason}")]
  ArgumentOutOfRange { name: &'static str, reason: String },

  #[error("virtual clock cannot move backwards from {now} to {target}")]
  ClockRewind { now: u64, target: u64 },

  #[error("virtual time scheduler is already running")]
  SchedulerRunning,

  #[error("the default scheduler has already been initialized")]
  DefaultSchedulerInitialized,

  #[error("failed to build thread pool: {0}")]
  ThreadPool(String),

  #[error("invalid configuration value for {key}: {value:?}")]
  InvalidConfig { key: &'static str, value: String },
}

impl RxError {
  pub(crate) fn out_of_range(name: &'static str, reason: impl Into<String>) -> Self {
    RxError::ArgumentOutOfRange { name, reason: reason.into() }
  }
}

pub type Result<T> = std::result::Result<T, RxError>;
