//! Raw Windows API wrappers
//!
//! All unsafe FFI calls live here.

pub mod kernel32;
pub mod toolhelp;
