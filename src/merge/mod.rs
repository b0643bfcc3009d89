//! Merging local ranking with remote symbol search.

mod policy;
mod session;

pub use policy::{
    dedup_remote, LocalResults, MergePolicy, DEFAULT_REMOTE_LIMIT, DEFAULT_REMOTE_THRESHOLD,
    MIN_REMOTE_QUERY_CHARS,
};
pub use session::{RemoteHandle, SearchOutcome, SearchSession};
