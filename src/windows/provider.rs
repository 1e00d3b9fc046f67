//! Native provider reading and writing another process on Windows

use super::bindings::{kernel32, toolhelp};
use super::handle::ProcessHandle;
use super::regions::RegionWalker;
use crate::core::types::{
    Address, CandidateSet, MemoryError, MemoryResult, ProcessId, ScanValue, ValueType,
};
use crate::memory::provider::{matches_in_region, MemoryProvider};
use tracing::{debug, trace, warn};

/// Capacity of a fresh candidate buffer when none is configured
pub const DEFAULT_CANDIDATE_CAPACITY: usize = 1024;

/// [`MemoryProvider`] backed by `ReadProcessMemory` and friends
#[derive(Debug, Clone)]
pub struct WindowsProvider {
    candidate_capacity: usize,
}

impl Default for WindowsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowsProvider {
    pub fn new() -> Self {
        Self::with_candidate_capacity(DEFAULT_CANDIDATE_CAPACITY)
    }

    pub fn with_candidate_capacity(candidate_capacity: usize) -> Self {
        WindowsProvider { candidate_capacity }
    }
}

impl MemoryProvider for WindowsProvider {
    type Handle = ProcessHandle;

    fn find_process_id_by_name(&self, name: &str) -> Option<ProcessId> {
        match toolhelp::find_process_id(name) {
            Ok(pid) => pid,
            Err(err) => {
                warn!(name, error = %err, "process snapshot failed");
                None
            }
        }
    }

    fn open_process(&self, pid: ProcessId) -> MemoryResult<ProcessHandle> {
        ProcessHandle::open(pid)
    }

    fn allocate_candidates(&self) -> MemoryResult<CandidateSet> {
        CandidateSet::try_with_capacity(self.candidate_capacity)
    }

    fn free_candidates(&self, candidates: CandidateSet) {
        drop(candidates);
    }

    fn scan_for_value(
        &self,
        handle: &ProcessHandle,
        target: ScanValue,
        candidates: &mut CandidateSet,
    ) -> MemoryResult<()> {
        let mut walker = RegionWalker::new(handle);
        let mut buffer: Vec<u8> = Vec::new();
        let mut scanned = 0usize;
        let mut skipped = 0usize;

        for region in walker.by_ref() {
            buffer.clear();
            buffer.try_reserve_exact(region.size).map_err(|err| {
                MemoryError::MemoryAllocationFailure(format!(
                    "{} bytes for region at {}: {}",
                    region.size, region.base, err
                ))
            })?;
            buffer.resize(region.size, 0);

            let read = unsafe { kernel32::read_process_memory(handle.raw(), region.base, &mut buffer) };
            if let Err(err) = read {
                trace!(base = %region.base, size = region.size, error = %err, "skipping region");
                skipped += 1;
                continue;
            }
            candidates.extend(matches_in_region(region.base, &buffer, &target));
            scanned += 1;
        }

        if walker.queried() == 0 {
            return Err(MemoryError::read_failure(
                Address::null(),
                "VirtualQueryEx failed on the first region",
            ));
        }

        candidates.shrink_to_fit();
        debug!(
            pid = handle.pid(),
            scanned,
            skipped,
            found = candidates.len(),
            "region walk complete"
        );
        Ok(())
    }

    fn read_value(
        &self,
        handle: &ProcessHandle,
        address: Address,
        value_type: ValueType,
    ) -> MemoryResult<ScanValue> {
        let mut bytes = [0u8; 8];
        let slot = &mut bytes[..value_type.size()];
        unsafe { kernel32::read_process_memory(handle.raw(), address, slot)? };
        ScanValue::from_le_bytes(slot, value_type)
            .ok_or_else(|| MemoryError::read_failure(address, "decoded size mismatch"))
    }

    fn write_value(
        &self,
        handle: &ProcessHandle,
        address: Address,
        value: ScanValue,
    ) -> MemoryResult<()> {
        unsafe { kernel32::write_process_memory(handle.raw(), address, &value.to_le_bytes()) }
    }
}
