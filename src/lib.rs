//! memscan: locate, narrow and monitor values in another process's memory
//!
//! A [`Scanner`] runs the initial value scan over a target process and hands
//! back a [`ScanSession`] holding the matching addresses. The session narrows
//! them with rescans, reads and writes them by index, and can monitor them
//! for changes. All process access goes through a [`MemoryProvider`].

pub mod config;
pub mod core;
pub mod memory;
#[cfg(windows)]
pub mod windows;

// Re-export main types from core module
pub use self::core::types::{
    Address, CandidateSet, MemoryError, MemoryResult, ProcessId, ScanValue, Tally, ValueType,
};

pub use memory::{
    MemoryProvider, MonitorDecision, MonitorOptions, MonitorOutcome, MonitorState, MonitorStep,
    Observation, ScanSession, Scanner,
};

#[cfg(windows)]
pub use self::windows::WindowsProvider;

// Re-export core directly for full access
pub use self::core::*;
