//! Common test utilities for eloquactl end-to-end tests

#[allow(dead_code)]
pub mod mock;

pub use mock::*;
