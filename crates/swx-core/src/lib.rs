//! Core domain logic for the swx activity log.
//!
//! This crate contains the in-memory building blocks of the log:
//! - Activity registry: reference-counted interning of activity names
//! - Event store: the ordered sequence of activity changes
//! - Stints: derived intervals of continuous activity
//! - Filters and time conversion capabilities used by queries

pub mod filter;
pub mod registry;
mod stint;
pub mod store;
pub mod time;

pub use filter::{ActivityFilter, AnyActivityFilter, ExactActivityFilter, RegexActivityFilter};
pub use registry::{ActivityId, ActivityRegistry};
pub use stint::Stint;
pub use store::{Entry, EventStore};
pub use time::{Clock, FixedClock, SystemClock, TimeFormat, TimeFormatError, TimePoint};
