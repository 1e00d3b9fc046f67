//! Frequency counts of observed values

use super::value::ScanValue;
use std::collections::HashMap;
use std::fmt;

/// Hashable identity of a value.
///
/// Floats are keyed by bit pattern after folding `-0.0` into `0.0` and every
/// NaN into one quiet NaN, so values that compare equal when scanning land on
/// the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ValueKey {
    Integer32(i32),
    Float32(u32),
    Float64(u64),
}

impl From<ScanValue> for ValueKey {
    fn from(value: ScanValue) -> Self {
        match value {
            ScanValue::Integer32(v) => ValueKey::Integer32(v),
            ScanValue::Float32(v) => ValueKey::Float32(canonical_f32(v).to_bits()),
            ScanValue::Float64(v) => ValueKey::Float64(canonical_f64(v).to_bits()),
        }
    }
}

fn canonical_f32(v: f32) -> f32 {
    if v.is_nan() {
        f32::NAN
    } else if v == 0.0 {
        0.0
    } else {
        v
    }
}

fn canonical_f64(v: f64) -> f64 {
    if v.is_nan() {
        f64::NAN
    } else if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl From<ValueKey> for ScanValue {
    fn from(key: ValueKey) -> Self {
        match key {
            ValueKey::Integer32(v) => ScanValue::Integer32(v),
            ValueKey::Float32(bits) => ScanValue::Float32(f32::from_bits(bits)),
            ValueKey::Float64(bits) => ScanValue::Float64(f64::from_bits(bits)),
        }
    }
}

/// Multiset of values seen across all candidates in one poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: HashMap<ValueKey, usize>,
}

impl Tally {
    /// Creates an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Tallies a slice of observed values
    pub fn from_values(values: &[ScanValue]) -> Self {
        values.iter().copied().collect()
    }

    /// A tally holding `count` copies of `value`
    pub fn uniform(value: ScanValue, count: usize) -> Self {
        let mut tally = Tally::new();
        if count > 0 {
            tally.counts.insert(value.into(), count);
        }
        tally
    }

    /// Records one observation of `value`
    pub fn add(&mut self, value: ScanValue) {
        *self.counts.entry(value.into()).or_insert(0) += 1;
    }

    /// Number of times `value` was observed
    pub fn count(&self, value: &ScanValue) -> usize {
        self.counts
            .get(&ValueKey::from(*value))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct values
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Total number of observations
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates over `(value, count)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (ScanValue, usize)> + '_ {
        self.counts.iter().map(|(key, count)| ((*key).into(), *count))
    }

    /// Pairs sorted by descending count, ties broken by value
    pub fn most_common(&self) -> Vec<(ScanValue, usize)> {
        let mut pairs: Vec<(ValueKey, usize)> =
            self.counts.iter().map(|(k, c)| (*k, *c)).collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| key_order(&a.0).cmp(&key_order(&b.0))));
        pairs.into_iter().map(|(k, c)| (k.into(), c)).collect()
    }
}

fn key_order(key: &ValueKey) -> (u8, u64) {
    match key {
        ValueKey::Integer32(v) => (0, *v as u32 as u64),
        ValueKey::Float32(bits) => (1, *bits as u64),
        ValueKey::Float64(bits) => (2, *bits),
    }
}

impl FromIterator<ScanValue> for Tally {
    fn from_iter<I: IntoIterator<Item = ScanValue>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for value in iter {
            tally.add(value);
        }
        tally
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (value, count)) in self.most_common().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", value, count)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts() {
        let tally = Tally::from_values(&[
            ScanValue::Integer32(100),
            ScanValue::Integer32(105),
            ScanValue::Integer32(100),
        ]);
        assert_eq!(tally.count(&ScanValue::Integer32(100)), 2);
        assert_eq!(tally.count(&ScanValue::Integer32(105)), 1);
        assert_eq!(tally.count(&ScanValue::Integer32(7)), 0);
        assert_eq!(tally.distinct(), 2);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn test_tally_equality_is_full_map() {
        let a = Tally::from_values(&[ScanValue::Integer32(100), ScanValue::Integer32(100)]);
        let b = Tally::from_values(&[ScanValue::Integer32(100), ScanValue::Integer32(105)]);
        let c = Tally::uniform(ScanValue::Integer32(100), 2);
        assert_ne!(a, b);
        assert_eq!(a, c);
        // Same total, different distribution
        assert_eq!(a.total(), b.total());
    }

    #[test]
    fn test_float_keys() {
        let tally = Tally::from_values(&[
            ScanValue::Float32(1.5),
            ScanValue::Float32(1.5),
            ScanValue::Float64(1.5),
        ]);
        assert_eq!(tally.count(&ScanValue::Float32(1.5)), 2);
        assert_eq!(tally.count(&ScanValue::Float64(1.5)), 1);
    }

    #[test]
    fn test_signed_zeros_share_a_key() {
        let mixed = Tally::from_values(&[ScanValue::Float32(0.0), ScanValue::Float32(-0.0)]);
        assert_eq!(mixed, Tally::uniform(ScanValue::Float32(0.0), 2));
        assert_eq!(mixed.count(&ScanValue::Float32(-0.0)), 2);
        assert_eq!(mixed.to_string(), "{0: 2}");

        let doubles = Tally::from_values(&[ScanValue::Float64(-0.0), ScanValue::Float64(0.0)]);
        assert_eq!(doubles.distinct(), 1);
    }

    #[test]
    fn test_nans_share_a_key() {
        let other_nan = f64::from_bits(f64::NAN.to_bits() | 1);
        let tally = Tally::from_values(&[ScanValue::Float64(f64::NAN), ScanValue::Float64(other_nan)]);
        assert_eq!(tally.distinct(), 1);
        assert_eq!(tally, Tally::from_values(&[ScanValue::Float64(f64::NAN); 2]));
    }

    #[test]
    fn test_most_common_and_display() {
        let tally = Tally::from_values(&[
            ScanValue::Integer32(1),
            ScanValue::Integer32(2),
            ScanValue::Integer32(2),
        ]);
        assert_eq!(
            tally.most_common(),
            vec![(ScanValue::Integer32(2), 2), (ScanValue::Integer32(1), 1)]
        );
        assert_eq!(tally.to_string(), "{2: 2, 1: 1}");
    }

    #[test]
    fn test_uniform_zero_is_empty() {
        assert!(Tally::uniform(ScanValue::Integer32(3), 0).is_empty());
    }
}
