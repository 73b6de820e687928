//! Carried-over cache state and the persistence boundary
//!
//! The pre-job phase computes a key, restores whatever matched, and saves its
//! findings as action state. The post-job phase reads that state back into a
//! [`CacheSignals`] snapshot and hands the save itself to a
//! [`CachePersistence`] implementation.

pub mod key;
pub mod paths;
pub mod persist;
pub mod signals;

pub use key::CacheKey;
pub use paths::{cached_paths, split_path_list};
pub use persist::{is_cache_hit, CachePersistence, CommandPersistence, DryRunPersistence};
pub use signals::CacheSignals;
