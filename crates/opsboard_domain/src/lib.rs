//! # Opsboard Domain
//!
//! Domain identifiers and payload types for the opsboard client.
//!
//! This crate provides:
//! - The [`Domain`] vocabulary: one identifier per synchronized data category
//! - Typed payloads for each domain, JSON-decoded from backend responses
//!
//! The sync engine treats payloads as opaque values; view code downcasts via
//! the [`DomainPayload`] variants.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod domain;
mod payload;

pub use domain::{Domain, UnknownDomain};
pub use payload::{
    BudgetLine, DashboardStats, DomainPayload, OperationsBudgets, PerformanceMetrics,
    WhitelistEntry, WhitelistPage,
};
