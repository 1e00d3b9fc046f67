//! Core type definitions for memscan
//!
//! This module contains the fundamental types used throughout the crate:
//! addresses, typed scan values, candidate buffers, tallies and errors.

mod address;
mod candidates;
mod error;
mod tally;
mod value;

// Re-export all public types
pub use address::Address;
pub use candidates::CandidateSet;
pub use error::{MemoryError, MemoryResult};
pub use tally::Tally;
pub use value::{ScanValue, ValueType};

// Common type aliases
pub type ProcessId = u32;
