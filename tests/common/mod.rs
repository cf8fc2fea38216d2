//! Integration test common infrastructure.
//!
//! Provides a runner for the rillcat binary with temporary config and input
//! files.

pub mod runner;

#[allow(unused_imports)]
pub use runner::{Rillcat, RunOutput};
