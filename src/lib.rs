//! # rxcore: a reactive-stream core
//!
//! Push-based sequences of values that end with at most one error or
//! completion, composed with operators and driven by pluggable schedulers.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! observable::from_iter::<_, ()>(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A source plus the operator methods |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscriber`] | Enforces the notification grammar and detaches on termination |
//! | [`SubscriptionLike`] | Handle to cancel an active subscription |
//! | [`Scheduler`] | Decides when and where work runs |
//!
//! Deterministic tests run on the [`TestScheduler`], whose virtual clock only
//! moves when told to; see the [`testing`] module.
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `ThreadPoolScheduler` on the `futures`
//!   thread pool
//! - **`timer`** (default): `futures-time` based sleeping for the thread pool
//! - **`tokio-scheduler`**: `TokioScheduler` on a tokio runtime handle
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscriber`]: subscriber::Subscriber
//! [`SubscriptionLike`]: subscription::SubscriptionLike
//! [`Scheduler`]: scheduler::Scheduler
//! [`TestScheduler`]: scheduler::TestScheduler

pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;
pub mod testing;

// Re-export the prelude module
pub use prelude::*;
