//! Candidate address buffer shared between a provider and one session

use super::{Address, MemoryError, MemoryResult};

/// Ordered addresses currently believed to hold the searched value.
///
/// Buffers are handed out by a provider's `allocate_candidates` and must be
/// returned through `free_candidates` exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    addresses: Vec<Address>,
}

impl CandidateSet {
    /// Creates an empty set with `capacity` slots reserved
    pub fn with_capacity(capacity: usize) -> Self {
        CandidateSet {
            addresses: Vec::with_capacity(capacity),
        }
    }

    /// Like [`with_capacity`](Self::with_capacity), reporting allocation
    /// failure instead of aborting
    pub fn try_with_capacity(capacity: usize) -> MemoryResult<Self> {
        let mut addresses = Vec::new();
        addresses.try_reserve_exact(capacity).map_err(|err| {
            MemoryError::MemoryAllocationFailure(format!(
                "{} candidate slots: {}",
                capacity, err
            ))
        })?;
        Ok(CandidateSet { addresses })
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.addresses.capacity()
    }

    pub fn get(&self, index: usize) -> Option<Address> {
        self.addresses.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.addresses
    }

    pub fn iter(&self) -> impl Iterator<Item = Address> + '_ {
        self.addresses.iter().copied()
    }

    pub fn extend<I: IntoIterator<Item = Address>>(&mut self, addresses: I) {
        self.addresses.extend(addresses);
    }

    /// Replaces the contents with a subset of the current addresses
    pub fn retain_subset(&mut self, retained: Vec<Address>) {
        debug_assert!(retained.len() <= self.addresses.len());
        self.addresses = retained;
    }

    pub fn shrink_to_fit(&mut self) {
        self.addresses.shrink_to_fit();
    }

    /// The hex projection shown to callers, one string per address
    pub fn to_address_list(&self) -> Vec<String> {
        self.addresses.iter().map(Address::to_hex_string).collect()
    }
}

impl FromIterator<Address> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        CandidateSet {
            addresses: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_capacity() {
        let set = CandidateSet::with_capacity(16);
        assert!(set.is_empty());
        assert!(set.capacity() >= 16);
    }

    #[test]
    fn test_try_with_capacity() {
        assert!(CandidateSet::try_with_capacity(8).unwrap().capacity() >= 8);
        assert!(matches!(
            CandidateSet::try_with_capacity(usize::MAX),
            Err(MemoryError::MemoryAllocationFailure(_))
        ));
    }

    #[test]
    fn test_extend_and_list() {
        let mut set = CandidateSet::default();
        set.extend([Address::new(0x1000), Address::new(0x1abc)]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1), Some(Address::new(0x1abc)));
        assert_eq!(set.get(2), None);
        assert_eq!(set.to_address_list(), vec!["0x1000", "0x1abc"]);
    }

    #[test]
    fn test_retain_subset() {
        let mut set: CandidateSet = [0x10, 0x20, 0x30].into_iter().map(Address::new).collect();
        set.retain_subset(vec![Address::new(0x20)]);
        assert_eq!(set.as_slice(), &[Address::new(0x20)]);
    }
}
