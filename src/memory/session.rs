//! Narrowing, reading and writing a fixed-type candidate set

use super::provider::MemoryProvider;
use super::scanner::Scanner;
use crate::core::types::{
    Address, CandidateSet, MemoryError, MemoryResult, ScanValue, ValueType,
};
use std::fmt;
use tracing::{debug, info, trace, warn};

/// Follow-on session created by [`Scanner::scan`].
///
/// The session exclusively owns the candidate buffer. Any provider failure
/// releases it before the error is returned, and every later call then
/// fails with [`MemoryError::SessionReleased`]. Dropping the session
/// releases the buffer as well.
pub struct ScanSession<'a, P: MemoryProvider> {
    scanner: &'a Scanner<P>,
    candidates: Option<CandidateSet>,
    value_type: ValueType,
    address_list: Vec<String>,
}

impl<'a, P: MemoryProvider> ScanSession<'a, P> {
    pub(crate) fn new(
        scanner: &'a Scanner<P>,
        candidates: CandidateSet,
        value_type: ValueType,
    ) -> Self {
        let address_list = candidates.to_address_list();
        ScanSession {
            scanner,
            candidates: Some(candidates),
            value_type,
            address_list,
        }
    }

    /// The value type fixed when the scan began
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Hex form of every candidate, rebuilt after each successful rescan
    pub fn address_list(&self) -> MemoryResult<&[String]> {
        self.candidates()?;
        Ok(&self.address_list)
    }

    /// The raw candidate addresses
    pub fn addresses(&self) -> MemoryResult<&[Address]> {
        Ok(self.candidates()?.as_slice())
    }

    /// Number of candidates
    pub fn len(&self) -> MemoryResult<usize> {
        Ok(self.candidates()?.len())
    }

    pub fn is_empty(&self) -> MemoryResult<bool> {
        Ok(self.candidates()?.is_empty())
    }

    pub fn is_released(&self) -> bool {
        self.candidates.is_none()
    }

    pub(crate) fn provider(&self) -> &'a P {
        self.scanner.provider()
    }

    pub(crate) fn handle(&self) -> &'a P::Handle {
        self.scanner.handle()
    }

    pub(crate) fn candidates(&self) -> MemoryResult<&CandidateSet> {
        self.candidates.as_ref().ok_or(MemoryError::SessionReleased)
    }

    fn ensure_type(&self, value: ScanValue) -> MemoryResult<ScanValue> {
        value.checked(self.value_type)
    }

    fn address_at(&self, index: usize) -> MemoryResult<Address> {
        let candidates = self.candidates()?;
        candidates.get(index).ok_or(MemoryError::IndexOutOfRange {
            index,
            len: candidates.len(),
        })
    }

    /// Releases the session when a provider call failed, then passes the
    /// result on. Only wraps provider results, so every error it sees is one
    /// that [`MemoryError::releases_session`] accepts.
    pub(crate) fn release_on_err<T>(&mut self, result: MemoryResult<T>) -> MemoryResult<T> {
        if let Err(err) = &result {
            debug_assert!(err.releases_session(), "non-provider error: {}", err);
            warn!(pid = self.scanner.pid(), error = %err, "provider failure, releasing session");
            self.close();
        }
        result
    }

    /// Keeps only the candidates currently holding `value`.
    ///
    /// Returns the number of candidates retained. A type mismatch is
    /// reported before any read. A read failure on any candidate releases
    /// the session; the set is never partially filtered.
    pub fn rescan(&mut self, value: ScanValue) -> MemoryResult<usize> {
        let value = self.ensure_type(value)?;
        let provider = self.provider();
        let handle = self.handle();
        let candidates = self
            .candidates
            .as_mut()
            .ok_or(MemoryError::SessionReleased)?;
        let before = candidates.len();

        let result = provider.rescan_for_value(handle, candidates, value);
        self.release_on_err(result)?;

        self.address_list = self.candidates()?.to_address_list();
        let after = self.address_list.len();
        info!(%value, before, after, "rescan complete");
        Ok(after)
    }

    /// Reads the current value at the `index`-th candidate
    pub fn read_at(&mut self, index: usize) -> MemoryResult<ScanValue> {
        let address = self.address_at(index)?;
        let result = self
            .provider()
            .read_value(self.handle(), address, self.value_type);
        let value = self.release_on_err(result)?;
        trace!(index, address = %address, %value, "read");
        Ok(value)
    }

    /// Writes `value` to the `index`-th candidate
    pub fn write_at(&mut self, index: usize, value: ScanValue) -> MemoryResult<()> {
        let value = self.ensure_type(value)?;
        let address = self.address_at(index)?;
        let result = self.provider().write_value(self.handle(), address, value);
        self.release_on_err(result)?;
        debug!(index, address = %address, %value, "wrote value");
        Ok(())
    }

    /// Writes `value` to every candidate in order.
    ///
    /// Stops at the first failure and releases the session; writes already
    /// made are not rolled back.
    pub fn write_all(&mut self, value: ScanValue) -> MemoryResult<usize> {
        let value = self.ensure_type(value)?;
        let provider = self.provider();
        let handle = self.handle();
        let result = self
            .candidates()?
            .iter()
            .try_for_each(|address| provider.write_value(handle, address, value));
        self.release_on_err(result)?;

        let written = self.len()?;
        debug!(%value, written, "wrote value to all candidates");
        Ok(written)
    }

    /// Frees the candidate buffer. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(candidates) = self.candidates.take() {
            debug!(pid = self.scanner.pid(), remaining = candidates.len(), "releasing candidates");
            self.provider().free_candidates(candidates);
            self.address_list.clear();
        }
    }
}

impl<P: MemoryProvider> Drop for ScanSession<'_, P> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<P: MemoryProvider> fmt::Display for ScanSession<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_released() {
            return write!(f, "<released>");
        }
        write!(f, "[")?;
        for (i, address) in self.address_list.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}'", address)?;
        }
        write!(f, "]")
    }
}

impl<P: MemoryProvider> fmt::Debug for ScanSession<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSession")
            .field("pid", &self.scanner.pid())
            .field("value_type", &self.value_type)
            .field("candidates", &self.candidates.as_ref().map(CandidateSet::len))
            .field("released", &self.is_released())
            .finish()
    }
}
