//! Map integration tests.
//!
//! These tests drive whole maps through long sequences of puts and removes
//! and check them only through the public API.

mod persistence_test;
mod removal_test;
mod workload_test;
