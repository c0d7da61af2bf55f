//! Calls to the next tier.
//!
//! # Data Flow
//! ```text
//! front tier  /chain
//!     → client.rs (GET {downstream}/chain, x-request-id forwarded)
//!     → middle tier /chain
//!         → backend tier /chain (no downstream: chain ends)
//! ```
//!
//! # Design Decisions
//! - Plain HTTP/1.1 via the hyper-util pooled client
//! - Each call is bounded by `timeouts.downstream_secs`
//! - No retries; a failed hop surfaces as 502 at the calling tier

pub mod client;

pub use client::{DownstreamClient, DownstreamError, CHAIN_PATH};
