//! Feedback analytics API.
//!
//! A read-only analytics service over a single table of classified
//! feedback records. This library exposes the core modules for the server
//! binary and for integration tests.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod labels;
pub mod logging;
pub mod store;
