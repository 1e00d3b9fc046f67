//! Scanning, narrowing and monitoring process memory
//!
//! This module provides:
//! - The [`MemoryProvider`] seam every cross-process access goes through
//! - [`Scanner`] for the initial value scan
//! - [`ScanSession`] for rescans, indexed reads and writes, and monitoring
//! - A synthetic provider used by tests and benches

pub mod monitor;
pub mod provider;
pub mod scanner;
pub mod session;

#[doc(hidden)]
pub mod simulated;

pub use monitor::{
    MonitorDecision, MonitorOptions, MonitorOutcome, MonitorState, MonitorStep, Observation,
};
pub use provider::{matches_in_region, MemoryProvider};
pub use scanner::Scanner;
pub use session::ScanSession;
pub use simulated::{ProviderStats, ScanFault, SimulatedHandle, SimulatedProvider};
