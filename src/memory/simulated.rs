//! In-memory provider backed by a synthetic process model
//!
//! Used by the test suite and the benches to drive the scanner without a
//! real target process. Clones share the same state, so a test can keep one
//! clone to change memory or inject faults while a scanner owns another.

use super::provider::{matches_in_region, MemoryProvider};
use crate::core::types::{
    Address, CandidateSet, MemoryError, MemoryResult, ProcessId, ScanValue, ValueType,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default capacity of buffers handed out by [`SimulatedProvider`]
pub const DEFAULT_SIMULATED_CAPACITY: usize = 64;

/// Failure to inject into the next initial scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanFault {
    /// The scan buffer cannot be sized
    Allocation,
    /// Process memory cannot be walked
    Read,
}

/// Counters kept by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderStats {
    pub allocated: usize,
    pub freed: usize,
    pub reads: usize,
    pub writes: usize,
}

impl ProviderStats {
    /// Buffers handed out and not yet returned
    pub fn live_buffers(&self) -> usize {
        self.allocated.saturating_sub(self.freed)
    }
}

/// Handle to a simulated process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedHandle {
    pid: ProcessId,
}

impl SimulatedHandle {
    pub fn pid(&self) -> ProcessId {
        self.pid
    }
}

#[derive(Debug)]
struct SimulatedProcess {
    name: String,
    accessible: bool,
    regions: BTreeMap<usize, Vec<u8>>,
}

impl SimulatedProcess {
    fn slot(&self, address: Address, size: usize) -> Option<&[u8]> {
        let (base, bytes) = self.regions.range(..=address.as_usize()).next_back()?;
        let start = address.as_usize() - base;
        bytes.get(start..start.checked_add(size)?)
    }

    fn slot_mut(&mut self, address: Address, size: usize) -> Option<&mut [u8]> {
        let (base, bytes) = self.regions.range_mut(..=address.as_usize()).next_back()?;
        let start = address.as_usize() - *base;
        bytes.get_mut(start..start.checked_add(size)?)
    }
}

#[derive(Debug, Default)]
struct SimulatedState {
    processes: BTreeMap<ProcessId, SimulatedProcess>,
    failing_reads: HashSet<Address>,
    failing_writes: HashSet<Address>,
    scan_fault: Option<ScanFault>,
    stats: ProviderStats,
}

/// Provider reading and writing a synthetic memory model
#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    state: Arc<Mutex<SimulatedState>>,
    capacity: usize,
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self::with_candidate_capacity(DEFAULT_SIMULATED_CAPACITY)
    }

    /// Provider whose fresh candidate buffers reserve `capacity` slots
    pub fn with_candidate_capacity(capacity: usize) -> Self {
        SimulatedProvider {
            state: Arc::new(Mutex::new(SimulatedState::default())),
            capacity,
        }
    }

    fn state(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an empty process
    pub fn add_process(&self, pid: ProcessId, name: &str) -> &Self {
        self.state().processes.insert(
            pid,
            SimulatedProcess {
                name: name.to_string(),
                accessible: true,
                regions: BTreeMap::new(),
            },
        );
        self
    }

    /// Makes `open_process` fail for `pid`, as if privileges were missing
    pub fn deny_access(&self, pid: ProcessId) -> &Self {
        if let Some(process) = self.state().processes.get_mut(&pid) {
            process.accessible = false;
        }
        self
    }

    /// Removes a process; later reads and writes through open handles fail
    pub fn kill_process(&self, pid: ProcessId) {
        self.state().processes.remove(&pid);
    }

    /// Maps `size` zeroed bytes at `base` in process `pid`
    pub fn map_region(&self, pid: ProcessId, base: Address, size: usize) -> &Self {
        if let Some(process) = self.state().processes.get_mut(&pid) {
            process.regions.insert(base.as_usize(), vec![0; size]);
        }
        self
    }

    /// Stores `value` at `address` without going through the provider API
    pub fn poke(&self, pid: ProcessId, address: Address, value: impl Into<ScanValue>) -> MemoryResult<()> {
        let value = value.into();
        let mut state = self.state();
        let slot = state
            .processes
            .get_mut(&pid)
            .and_then(|p| p.slot_mut(address, value.size()))
            .ok_or_else(|| MemoryError::InvalidAddress(address.to_hex_string()))?;
        slot.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Loads the value at `address` without going through the provider API
    pub fn peek(&self, pid: ProcessId, address: Address, value_type: ValueType) -> Option<ScanValue> {
        let state = self.state();
        let process = state.processes.get(&pid)?;
        ScanValue::from_le_bytes(process.slot(address, value_type.size())?, value_type)
    }

    /// Makes every read at `address` fail
    pub fn fail_reads_at(&self, address: Address) {
        self.state().failing_reads.insert(address);
    }

    /// Makes every write at `address` fail
    pub fn fail_writes_at(&self, address: Address) {
        self.state().failing_writes.insert(address);
    }

    /// Makes initial scans fail with `fault` until cleared
    pub fn inject_scan_fault(&self, fault: ScanFault) {
        self.state().scan_fault = Some(fault);
    }

    pub fn clear_faults(&self) {
        let mut state = self.state();
        state.failing_reads.clear();
        state.failing_writes.clear();
        state.scan_fault = None;
    }

    pub fn stats(&self) -> ProviderStats {
        self.state().stats
    }
}

impl MemoryProvider for SimulatedProvider {
    type Handle = SimulatedHandle;

    fn find_process_id_by_name(&self, name: &str) -> Option<ProcessId> {
        self.state()
            .processes
            .iter()
            .find(|(_, process)| process.name == name)
            .map(|(pid, _)| *pid)
    }

    fn open_process(&self, pid: ProcessId) -> MemoryResult<SimulatedHandle> {
        match self.state().processes.get(&pid) {
            Some(process) if process.accessible => Ok(SimulatedHandle { pid }),
            Some(_) => Err(MemoryError::process_open(pid, "access denied")),
            None => Err(MemoryError::process_open(pid, "no such process")),
        }
    }

    fn allocate_candidates(&self) -> MemoryResult<CandidateSet> {
        self.state().stats.allocated += 1;
        Ok(CandidateSet::with_capacity(self.capacity))
    }

    fn free_candidates(&self, candidates: CandidateSet) {
        self.state().stats.freed += 1;
        drop(candidates);
    }

    fn scan_for_value(
        &self,
        handle: &SimulatedHandle,
        target: ScanValue,
        candidates: &mut CandidateSet,
    ) -> MemoryResult<()> {
        let state = self.state();
        match state.scan_fault {
            Some(ScanFault::Allocation) => {
                return Err(MemoryError::MemoryAllocationFailure(
                    "simulated allocation failure".to_string(),
                ))
            }
            Some(ScanFault::Read) => {
                return Err(MemoryError::read_failure(
                    Address::null(),
                    "simulated region walk failure",
                ))
            }
            None => {}
        }

        let process = state
            .processes
            .get(&handle.pid)
            .ok_or_else(|| MemoryError::read_failure(Address::null(), "process has exited"))?;
        for (base, bytes) in &process.regions {
            candidates.extend(matches_in_region(Address::new(*base), bytes, &target));
        }
        candidates.shrink_to_fit();
        Ok(())
    }

    fn read_value(
        &self,
        handle: &SimulatedHandle,
        address: Address,
        value_type: ValueType,
    ) -> MemoryResult<ScanValue> {
        let mut state = self.state();
        state.stats.reads += 1;
        if state.failing_reads.contains(&address) {
            return Err(MemoryError::read_failure(address, "simulated read failure"));
        }
        let process = state
            .processes
            .get(&handle.pid)
            .ok_or_else(|| MemoryError::read_failure(address, "process has exited"))?;
        process
            .slot(address, value_type.size())
            .and_then(|bytes| ScanValue::from_le_bytes(bytes, value_type))
            .ok_or_else(|| MemoryError::read_failure(address, "address is not mapped"))
    }

    fn write_value(
        &self,
        handle: &SimulatedHandle,
        address: Address,
        value: ScanValue,
    ) -> MemoryResult<()> {
        let mut state = self.state();
        state.stats.writes += 1;
        if state.failing_writes.contains(&address) {
            return Err(MemoryError::write_failure(address, "simulated write failure"));
        }
        let slot = state
            .processes
            .get_mut(&handle.pid)
            .ok_or_else(|| MemoryError::write_failure(address, "process has exited"))?
            .slot_mut(address, value.size())
            .ok_or_else(|| MemoryError::write_failure(address, "address is not mapped"))?;
        slot.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}
