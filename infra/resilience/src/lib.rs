//! # Resilience
//!
//! Async primitives for flaky enrollment calls:
//!
//! - [`RetryPolicy`]: bounded exponential backoff (`base * multiplier^(n-1)`, capped) with an
//!   optional per-attempt timeout.
//! - [`RetryEngine`]: runs an operation under a policy, with per-call [`RetryHooks`] for the
//!   retry condition, callbacks, a [`RetryProgress`] channel and cancellation.
//! - [`NetworkMonitor`]: observable online/offline state and connection quality.
//!
//! ## Example
//!
//! ```rust
//! use stride_resilience::{RetryEngine, RetryPolicy};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let engine = RetryEngine::new(RetryPolicy::default().with_base_delay(Duration::from_millis(1)));
//! let mut calls = 0;
//! let result: Result<u32, _> = engine
//!     .run(|| {
//!         calls += 1;
//!         let outcome = if calls < 2 { Err("flaky") } else { Ok(calls) };
//!         async move { outcome }
//!     })
//!     .await;
//! assert_eq!(result.unwrap(), 2);
//! # }
//! ```

mod engine;
mod error;
mod network;
mod policy;

pub use crate::engine::{RetryEngine, RetryHooks, RetryPhase, RetryProgress};
pub use crate::error::RetryError;
pub use crate::network::{ConnectionQuality, EffectiveType, NetworkMonitor, NetworkStatus};
pub use crate::policy::RetryPolicy;
pub use tokio_util::sync::CancellationToken;
