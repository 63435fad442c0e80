//! Integration tests for the feedback analytics service.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable to run them.

pub mod store_test;
