//! Remote symbol search used to supplement thin local results.
//!
//! This module provides a `RemoteSearcher` trait and implementations:
//! - `SymboTalkSearcher` - SymboTalk HTTP API
//! - `MockRemoteSearcher` - Returns canned results for testing
//! - `DisabledRemoteSearcher` - Always empty (offline mode)

mod mock;
mod searcher;
pub mod symbotalk;

pub use mock::{mock_symbol, MockRemoteSearcher};
pub use searcher::{DisabledRemoteSearcher, RemoteResult, RemoteSearcher};
pub use symbotalk::SymboTalkSearcher;
