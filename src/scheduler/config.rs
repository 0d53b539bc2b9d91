use std::env;

use crate::error::RxError;

const POOL_SIZE_KEY: &str = "RXCORE_POOL_SIZE";
const THREAD_PREFIX_KEY: &str = "RXCORE_THREAD_PREFIX";

/// Settings for the thread-backed schedulers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
  /// Worker count of the thread pool. `None` lets the pool pick one per CPU.
  pub pool_size: Option<usize>,
  /// Name prefix of spawned worker threads.
  pub thread_name_prefix: String,
}

impl Default for SchedulerConfig {
  fn default() -> Self { Self { pool_size: None, thread_name_prefix: "rxcore-worker-".into() } }
}

impl SchedulerConfig {
  /// Reads `RXCORE_POOL_SIZE` and `RXCORE_THREAD_PREFIX`, keeping the default
  /// for unset variables.
  pub fn from_env() -> Result<Self, RxError> {
    Self::from_lookup(|key| env::var(key).ok())
  }

  pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RxError> {
    let mut config = Self::default();
    if let Some(raw) = lookup(POOL_SIZE_KEY) {
      let size = raw
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|size| *size > 0)
        .ok_or(RxError::InvalidConfig { key: POOL_SIZE_KEY, value: raw.clone() })?;
      config.pool_size = Some(size);
    }
    if let Some(prefix) = lookup(THREAD_PREFIX_KEY) {
      if prefix.is_empty() {
        return Err(RxError::InvalidConfig { key: THREAD_PREFIX_KEY, value: prefix });
      }
      config.thread_name_prefix = prefix;
    }
    Ok(config)
  }

  pub fn with_pool_size(mut self, size: usize) -> Self {
    self.pool_size = Some(size);
    self
  }

  pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.thread_name_prefix = prefix.into();
    self
  }
}
