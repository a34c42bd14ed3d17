//! # Opsboard Sync
//!
//! Client-side data synchronization engine for the opsboard client.
//!
//! This crate provides:
//! - A per-domain sync state machine (loading → ready ⇄ refreshing, with a
//!   retrying sub-state)
//! - Scheduled and manual refresh with single-flight fetches
//! - Bounded linear-backoff retry
//! - Token-ordered commits that discard stale completions
//! - Connectivity gating and offline fallback substitution
//! - A subscriber registry sharing one engine per domain across consumers
//!
//! ## Architecture
//!
//! One [`SyncEngine`] exists per data domain, created lazily by the
//! [`SyncRegistry`] when the domain is first subscribed and disposed when the
//! last subscriber leaves. The engine owns the authoritative [`Snapshot`] and
//! [`SyncState`]; consumers only ever receive read-only [`DomainView`]s
//! pushed through the [`SubscriberSet`].
//!
//! All fetching happens inline in the engine's driver task, so at most one
//! fetch is in flight per domain by construction. Cancellation works by
//! invalidating the commit epoch, never by relying on transport aborts.
//!
//! ## Key invariants
//!
//! - At most one in-flight fetch per domain
//! - A commit never overwrites a fresher snapshot
//! - Retry counts reset on any successful commit
//! - Retries are bounded and gated on connectivity
//! - Disposal cancels timers and in-flight work

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod fallback;
mod fetch;
mod http;
mod monitor;
mod registry;
mod state;

pub use config::{RetryPolicy, SyncConfig};
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use fallback::{FallbackProvider, StaticFallback};
pub use fetch::{Fetcher, ScriptedFetcher, ScriptedOutcome};
pub use http::{HttpClient, HttpFetcher, HttpResponse};
pub use monitor::NetworkMonitor;
pub use registry::{SubscriberId, SubscriberSet, Subscription, SyncRegistry};
pub use state::{DomainView, EnginePhase, Snapshot, SyncState};
