//! Windows API layer for the native memory provider
//!
//! Provides safe wrappers around Windows API functions for process
//! and memory operations. All unsafe FFI calls are contained within
//! this module with proper error handling and validation.

pub mod bindings;
pub mod handle;
pub mod provider;
pub mod regions;

pub use handle::ProcessHandle;
pub use provider::WindowsProvider;
pub use regions::{Region, RegionWalker};
