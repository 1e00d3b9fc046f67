//! Custom error types for memscan

use super::ValueType;
use std::fmt;
use thiserror::Error;

/// Main error type for scanning and session operations
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Failed to open process {pid}: {reason}")]
    ProcessOpen { pid: u32, reason: String },

    #[error("Failed to allocate memory for buffer data: {0}")]
    MemoryAllocationFailure(String),

    #[error("Failed to read memory at {address}: {reason}")]
    MemoryReadFailure { address: String, reason: String },

    #[error("Failed to write memory at {address}: {reason}")]
    MemoryWriteFailure { address: String, reason: String },

    #[error("Type mismatch: session expects {expected}, got {actual}")]
    TypeMismatch {
        expected: ValueType,
        actual: ValueType,
    },

    #[error("Candidate index {index} out of range (session holds {len} addresses)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Scan session has been released")]
    SessionReleased,

    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApi(#[from] windows::core::Error),
}

/// Result type alias for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    /// Creates an error with the calling thread's last Windows error code
    #[cfg(windows)]
    pub fn last_os_error() -> Self {
        MemoryError::WindowsApi(windows::core::Error::from_win32())
    }

    /// Creates a process open error
    pub fn process_open(pid: u32, reason: impl Into<String>) -> Self {
        MemoryError::ProcessOpen {
            pid,
            reason: reason.into(),
        }
    }

    /// Creates a read failure error
    pub fn read_failure(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::MemoryReadFailure {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a write failure error
    pub fn write_failure(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::MemoryWriteFailure {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a type mismatch error
    pub fn type_mismatch(expected: ValueType, actual: ValueType) -> Self {
        MemoryError::TypeMismatch { expected, actual }
    }

    /// True for failures reported by a provider, which release the session
    /// they occur in.
    ///
    /// Contract errors (type mismatch, bad index) and parse errors leave the
    /// session usable; retrying after a releasing error needs a fresh scan.
    pub fn releases_session(&self) -> bool {
        match self {
            MemoryError::ProcessOpen { .. }
            | MemoryError::MemoryAllocationFailure(_)
            | MemoryError::MemoryReadFailure { .. }
            | MemoryError::MemoryWriteFailure { .. }
            | MemoryError::InvalidAddress(_) => true,
            #[cfg(windows)]
            MemoryError::WindowsApi(_) => true,
            MemoryError::TypeMismatch { .. }
            | MemoryError::IndexOutOfRange { .. }
            | MemoryError::SessionReleased
            | MemoryError::InvalidValue(_) => false,
        }
    }

    /// True for errors raised by a caller breaking an API contract
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            MemoryError::TypeMismatch { .. } | MemoryError::IndexOutOfRange { .. }
        )
    }
}
