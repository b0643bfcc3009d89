//! Offline icon search for an AAC picture-choice app.
//!
//! Ranks a bundled, immutable icon catalog against free-text queries and,
//! when local coverage is thin, supplements the results with a remote
//! symbol search. The binary in main.rs serves this over HTTP; the modules
//! are exposed for embedding and integration testing.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod merge;
pub mod metrics;
pub mod ranker;
pub mod remote;

pub use catalog::{Catalog, CatalogEntry, Tier};
pub use merge::{LocalResults, MergePolicy, SearchOutcome, SearchSession};
pub use ranker::Ranker;
pub use remote::{RemoteResult, RemoteSearcher};
