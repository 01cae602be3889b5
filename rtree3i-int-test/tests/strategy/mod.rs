//! Balancing strategy integration tests.

mod custom_strategy_test;
mod splitter_test;
