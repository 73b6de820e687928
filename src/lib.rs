//! cachepost - post-job cache decision step
//!
//! Resolves whether the enclosing CI job succeeded and, when policy allows,
//! hands the prepared cache paths and key to a persistence collaborator.

pub mod audit;
pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod github;

pub use error::{CachePostError, CachePostResult};
