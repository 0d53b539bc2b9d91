//! Virtual-time test harness.
//!
//! Tests describe sources as lists of notifications stamped with virtual
//! times, run an operator chain against them on a [`TestScheduler`], and
//! compare what a recording observer saw with the expected list:
//!
//! ```rust
//! use rxcore::{prelude::*, testing::*};
//!
//! let scheduler = TestScheduler::new();
//! let xs = scheduler.create_hot_observable::<i32, ()>(vec![
//!   on_next(150, 1),
//!   on_next(220, 2),
//!   on_completed(250),
//! ]);
//! let c_xs = xs.clone();
//! let observer = scheduler.start(move || c_xs.map(|v| v * 10));
//!
//! assert_eq!(observer.messages(), vec![on_next(220, 20), on_completed(250)]);
//! assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 250)]);
//! ```
//!
//! [`TestScheduler`]: crate::scheduler::TestScheduler

mod cold_observable;
mod hot_observable;
mod mock_observer;
mod recorded;

pub use cold_observable::ColdObservable;
pub use hot_observable::HotObservable;
pub use mock_observer::MockObserver;
pub use recorded::{is_well_formed, on_completed, on_error, on_next, Recorded, SubscriptionLog};
