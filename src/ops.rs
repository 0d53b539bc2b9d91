//! Operators. Each one wraps its source and, on subscribe, interposes an
//! observer that transforms notifications before they reach the downstream
//! subscriber. The downstream subscription is handed upstream unchanged.

pub(crate) mod blocking;
pub mod connectable;
pub mod delay;
pub mod filter;
pub mod map;
pub mod materialize;
pub mod merge;
pub mod ref_count;
pub mod subscribe_on;
pub mod take;
