//! Initial value scan over a target process

use super::provider::MemoryProvider;
use super::session::ScanSession;
use crate::core::types::{CandidateSet, MemoryResult, ProcessId, ScanValue, ValueType};
use std::fmt;
use tracing::{debug, info, warn};

/// Binds a provider to one target process and performs the first scan
pub struct Scanner<P: MemoryProvider> {
    provider: P,
    pid: ProcessId,
    handle: P::Handle,
    candidates: Option<CandidateSet>,
}

impl<P: MemoryProvider> Scanner<P> {
    /// Opens `pid` and reserves an empty candidate buffer
    pub fn open(provider: P, pid: ProcessId) -> MemoryResult<Self> {
        let handle = provider.open_process(pid)?;
        let candidates = provider.allocate_candidates()?;
        debug!(pid, capacity = candidates.capacity(), "opened process");
        Ok(Scanner {
            provider,
            pid,
            handle,
            candidates: Some(candidates),
        })
    }

    /// Looks up a process ID by executable name; `None` when nothing matches
    pub fn find_process_id_by_name(provider: &P, name: &str) -> Option<ProcessId> {
        let pid = provider.find_process_id_by_name(name);
        if pid.is_none() {
            debug!(name, "no process with that name");
        }
        pid
    }

    /// Opens the first process named `name`
    pub fn open_by_name(provider: P, name: &str) -> MemoryResult<Option<Self>> {
        match Self::find_process_id_by_name(&provider, name) {
            Some(pid) => Self::open(provider, pid).map(Some),
            None => Ok(None),
        }
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub(crate) fn handle(&self) -> &P::Handle {
        &self.handle
    }

    /// Scans all readable memory for `value` and starts a session fixed to
    /// its type.
    ///
    /// On failure the candidate buffer is freed before the error returns.
    pub fn scan(&mut self, value: ScanValue) -> MemoryResult<ScanSession<'_, P>> {
        let mut candidates = match self.candidates.take() {
            Some(candidates) => candidates,
            None => self.provider.allocate_candidates()?,
        };

        if let Err(err) = self
            .provider
            .scan_for_value(&self.handle, value, &mut candidates)
        {
            warn!(pid = self.pid, %value, error = %err, "initial scan failed");
            self.provider.free_candidates(candidates);
            return Err(err);
        }

        info!(
            pid = self.pid,
            %value,
            value_type = %value.value_type(),
            found = candidates.len(),
            "initial scan complete"
        );
        Ok(ScanSession::new(self, candidates, value.value_type()))
    }

    /// Like [`scan`](Self::scan), first checking that `value` is a `value_type`.
    ///
    /// A mismatch is reported before the provider is touched.
    pub fn scan_as(
        &mut self,
        value: ScanValue,
        value_type: ValueType,
    ) -> MemoryResult<ScanSession<'_, P>> {
        let value = value.checked(value_type)?;
        self.scan(value)
    }
}

impl<P: MemoryProvider> Drop for Scanner<P> {
    fn drop(&mut self) {
        if let Some(candidates) = self.candidates.take() {
            self.provider.free_candidates(candidates);
        }
    }
}

impl<P: MemoryProvider> fmt::Debug for Scanner<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("pid", &self.pid)
            .field("holds_buffer", &self.candidates.is_some())
            .finish()
    }
}
