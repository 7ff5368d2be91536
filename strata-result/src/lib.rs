//! Error types and result definitions for the Strata client.
//!
//! This crate provides the unified error type ([`Error`]) and result type alias
//! ([`Result<T>`]) used throughout the Strata client crates. All operations that
//! can fail return `Result<T>`, where the error variant carries enough context
//! to diagnose what went wrong.
//!
//! # Error Philosophy
//!
//! Strata uses a single error enum ([`Error`]) rather than crate-specific error
//! types. This approach:
//! - Simplifies error handling across crate boundaries
//! - Allows errors to propagate naturally with the `?` operator
//! - Enables structured error matching for programmatic handling
//!
//! All failures in the partition pruner are raised synchronously at
//! construction time; iteration never fails.

#![forbid(unsafe_code)]

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
