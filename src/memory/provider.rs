//! Memory access provider abstraction
//!
//! Everything that touches another process goes through [`MemoryProvider`]:
//! process lookup, handle acquisition, candidate buffer lifetime, the initial
//! value scan and typed reads and writes. The scanner and its sessions only
//! orchestrate these primitives.

use crate::core::types::{
    Address, CandidateSet, MemoryResult, ProcessId, ScanValue, ValueType,
};

/// Native capability performing cross-process memory access
pub trait MemoryProvider {
    /// Open handle to one target process
    type Handle;

    /// Finds the first process whose executable name is `name`.
    ///
    /// A miss is `None`, not an error.
    fn find_process_id_by_name(&self, name: &str) -> Option<ProcessId>;

    /// Opens a handle to `pid`, failing with `ProcessOpen`
    fn open_process(&self, pid: ProcessId) -> MemoryResult<Self::Handle>;

    /// Hands out an empty candidate buffer
    fn allocate_candidates(&self) -> MemoryResult<CandidateSet>;

    /// Takes back a buffer handed out by `allocate_candidates`
    fn free_candidates(&self, candidates: CandidateSet);

    /// Scans all readable memory of the process for `target`, appending
    /// every matching address to `candidates`.
    ///
    /// Fails with `MemoryAllocationFailure` when a scan buffer cannot be
    /// sized, or `MemoryReadFailure` when process memory cannot be walked.
    fn scan_for_value(
        &self,
        handle: &Self::Handle,
        target: ScanValue,
        candidates: &mut CandidateSet,
    ) -> MemoryResult<()>;

    /// Reads one value of `value_type` at `address`
    fn read_value(
        &self,
        handle: &Self::Handle,
        address: Address,
        value_type: ValueType,
    ) -> MemoryResult<ScanValue>;

    /// Writes `value` at `address`
    fn write_value(
        &self,
        handle: &Self::Handle,
        address: Address,
        value: ScanValue,
    ) -> MemoryResult<()>;

    /// Filters `candidates` down to the addresses currently holding `target`.
    ///
    /// The retained set is computed before anything is committed: on the
    /// first read failure the error is returned and `candidates` is left
    /// exactly as it was.
    fn rescan_for_value(
        &self,
        handle: &Self::Handle,
        candidates: &mut CandidateSet,
        target: ScanValue,
    ) -> MemoryResult<()> {
        let mut retained = Vec::with_capacity(candidates.len());
        for address in candidates.iter() {
            let current = self.read_value(handle, address, target.value_type())?;
            if current.matches(&target) {
                retained.push(address);
            }
        }
        candidates.retain_subset(retained);
        Ok(())
    }
}

/// Addresses inside `bytes` (mapped at `base`) whose contents equal `target`.
///
/// The region is walked with a stride of the value's size, so only
/// naturally aligned slots relative to `base` are considered. A trailing
/// partial slot is ignored.
pub fn matches_in_region<'a>(
    base: Address,
    bytes: &'a [u8],
    target: &'a ScanValue,
) -> impl Iterator<Item = Address> + 'a {
    let size = target.size();
    bytes
        .chunks_exact(size)
        .enumerate()
        .filter(move |(_, slot)| target.matches_bytes(slot))
        .map(move |(i, _)| base.offset(i * size))
}
