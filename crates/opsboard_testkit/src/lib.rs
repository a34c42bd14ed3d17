//! # Opsboard Testkit
//!
//! Test utilities for the opsboard sync core.
//!
//! This crate provides:
//! - Sample payloads and raw response bodies per domain
//! - A recording subscriber that captures every delivered view
//! - Scheduler helpers for driving engine tasks in tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use opsboard_testkit::prelude::*;
//!
//! #[tokio::test(start_paused = true)]
//! async fn observes_initial_load() {
//!     let recorder = RecordingSubscriber::new();
//!     // ... subscribe recorder.listener(), drive the engine ...
//!     settle().await;
//!     assert!(recorder.last().unwrap().payload.is_some());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod recorder;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::recorder::*;
}

pub use fixtures::*;
pub use recorder::*;
