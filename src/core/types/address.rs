//! Memory address wrapper type

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw address in the target process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub usize);

impl Address {
    /// Creates a new address from a usize value
    pub const fn new(value: usize) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Adds a byte offset to the address
    pub const fn offset(&self, bytes: usize) -> Self {
        Address(self.0.wrapping_add(bytes))
    }

    /// Returns the raw usize value
    pub const fn as_usize(&self) -> usize {
        self.0
    }

    /// Lower-case hex with a `0x` prefix and no padding, e.g. `0x7ff6a010`
    pub fn to_hex_string(&self) -> String {
        format!("{:#x}", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}
