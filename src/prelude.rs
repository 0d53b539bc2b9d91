//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
pub use crate::{
  error::RxError,
  notification::Notification,
  observable::{self, BoxObservable, Observable},
  observer::{BoxObserver, Observer, ObserverAll, ObserverComp, ObserverErr, ObserverN},
  ops::{
    connectable::{ConnectableObservable, Connection},
    ref_count::RefCount,
  },
  scheduler::{
    CurrentThreadScheduler, ImmediateScheduler, NewThreadScheduler, Scheduler, SchedulerConfig,
    SchedulerRef, Task, TaskHandle, TestScheduler, VirtualTime, VirtualTimeScheduler,
  },
  subject::{ReplayConfig, ReplaySubject, Subject},
  subscriber::Subscriber,
  subscription::*,
};
