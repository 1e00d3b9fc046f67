//! Core module containing fundamental types for memscan
//!
//! This module provides the building blocks shared by the scanner, the
//! providers and the command-line front end: address handling, typed
//! values, candidate buffers, tallies and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address, CandidateSet, MemoryError, MemoryResult, ProcessId, ScanValue, Tally, ValueType,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
