//! Typed scan values and their fixed value kinds

use super::error::{MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of value a scan session is fixed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Integer32,
    Float32,
    Float64,
}

impl ValueType {
    /// Returns the size in bytes for this value type
    pub const fn size(&self) -> usize {
        match self {
            ValueType::Integer32 | ValueType::Float32 => 4,
            ValueType::Float64 => 8,
        }
    }

    /// Short name used in messages and on the command line
    pub const fn name(&self) -> &'static str {
        match self {
            ValueType::Integer32 => "int",
            ValueType::Float32 => "float",
            ValueType::Float64 => "double",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" | "i32" | "integer32" => Ok(ValueType::Integer32),
            "float" | "f32" | "float32" => Ok(ValueType::Float32),
            "double" | "f64" | "float64" => Ok(ValueType::Float64),
            other => Err(MemoryError::InvalidValue(format!(
                "unknown value type '{}'",
                other
            ))),
        }
    }
}

/// A value tagged with its kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ScanValue {
    Integer32(i32),
    Float32(f32),
    Float64(f64),
}

impl ScanValue {
    /// Gets the value type for this value
    pub const fn value_type(&self) -> ValueType {
        match self {
            ScanValue::Integer32(_) => ValueType::Integer32,
            ScanValue::Float32(_) => ValueType::Float32,
            ScanValue::Float64(_) => ValueType::Float64,
        }
    }

    /// Returns the size in bytes of the value
    pub const fn size(&self) -> usize {
        self.value_type().size()
    }

    /// Returns the value unchanged if its tag is `expected`
    pub fn checked(self, expected: ValueType) -> MemoryResult<Self> {
        if self.value_type() == expected {
            Ok(self)
        } else {
            Err(MemoryError::type_mismatch(expected, self.value_type()))
        }
    }

    /// Parses `text` as a value of kind `value_type`
    pub fn parse(text: &str, value_type: ValueType) -> MemoryResult<Self> {
        let text = text.trim();
        let invalid = || MemoryError::InvalidValue(format!("'{}' is not a valid {}", text, value_type));
        match value_type {
            ValueType::Integer32 => text.parse().map(ScanValue::Integer32).map_err(|_| invalid()),
            ValueType::Float32 => text.parse().map(ScanValue::Float32).map_err(|_| invalid()),
            ValueType::Float64 => text.parse().map(ScanValue::Float64).map_err(|_| invalid()),
        }
    }

    /// Converts the value to its in-memory little-endian bytes
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            ScanValue::Integer32(v) => v.to_le_bytes().to_vec(),
            ScanValue::Float32(v) => v.to_le_bytes().to_vec(),
            ScanValue::Float64(v) => v.to_le_bytes().to_vec(),
        }
    }

    /// Decodes a value of `value_type` from the start of `bytes`
    pub fn from_le_bytes(bytes: &[u8], value_type: ValueType) -> Option<Self> {
        match value_type {
            ValueType::Integer32 => bytes
                .get(..4)
                .and_then(|b| <[u8; 4]>::try_from(b).ok())
                .map(|b| ScanValue::Integer32(i32::from_le_bytes(b))),
            ValueType::Float32 => bytes
                .get(..4)
                .and_then(|b| <[u8; 4]>::try_from(b).ok())
                .map(|b| ScanValue::Float32(f32::from_le_bytes(b))),
            ValueType::Float64 => bytes
                .get(..8)
                .and_then(|b| <[u8; 8]>::try_from(b).ok())
                .map(|b| ScanValue::Float64(f64::from_le_bytes(b))),
        }
    }

    /// Numeric equality as the scan compares values.
    ///
    /// Floats use IEEE `==`: `NaN` never matches and `0.0` matches `-0.0`.
    /// Values of different kinds never match.
    pub fn matches(&self, other: &ScanValue) -> bool {
        match (self, other) {
            (ScanValue::Integer32(a), ScanValue::Integer32(b)) => a == b,
            (ScanValue::Float32(a), ScanValue::Float32(b)) => a == b,
            (ScanValue::Float64(a), ScanValue::Float64(b)) => a == b,
            _ => false,
        }
    }

    /// Checks whether `bytes` starts with a value equal to this one
    pub fn matches_bytes(&self, bytes: &[u8]) -> bool {
        ScanValue::from_le_bytes(bytes, self.value_type())
            .map(|found| found.matches(self))
            .unwrap_or(false)
    }
}

impl fmt::Display for ScanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanValue::Integer32(v) => write!(f, "{}", v),
            ScanValue::Float32(v) => write!(f, "{}", v),
            ScanValue::Float64(v) => write!(f, "{}", v),
        }
    }
}

impl From<i32> for ScanValue {
    fn from(value: i32) -> Self {
        ScanValue::Integer32(value)
    }
}

impl From<f32> for ScanValue {
    fn from(value: f32) -> Self {
        ScanValue::Float32(value)
    }
}

impl From<f64> for ScanValue {
    fn from(value: f64) -> Self {
        ScanValue::Float64(value)
    }
}
