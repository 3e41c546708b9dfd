//! Time-to-live cache for reference tables.
//!
//! Lookup tables (departments, positions, indicator groups, the criteria
//! catalogue) rarely change, so reads go through a [`TtlCache`] instance
//! that is constructed once and handed to whoever needs it.

mod ttl;

pub use ttl::{keys, CacheStats, CachedEntry, TtlCache};
