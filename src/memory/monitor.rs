//! Live monitoring of a scan session
//!
//! Each poll reads every candidate and tallies the observed values. When the
//! tally differs from the previous poll's, the caller decides whether to
//! narrow the session to a new target. The loop state is an explicit
//! [`MonitorState`] passed through [`ScanSession::monitor_step`].

use super::provider::MemoryProvider;
use super::session::ScanSession;
use crate::config::MonitorConfig;
use crate::core::types::{MemoryResult, ScanValue, Tally};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Monitor loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    /// The loop stops once a narrowing leaves fewer candidates than this
    pub min_addresses_to_exit: usize,
    /// Suspension between polls
    pub interval: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        MonitorOptions {
            min_addresses_to_exit: 10,
            interval: Duration::from_secs(10),
        }
    }
}

impl From<&MonitorConfig> for MonitorOptions {
    fn from(config: &MonitorConfig) -> Self {
        MonitorOptions {
            min_addresses_to_exit: config.min_addresses_to_exit,
            interval: config.interval(),
        }
    }
}

/// What the caller wants done after a change was detected
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonitorDecision {
    /// Rescan the session for this value
    Narrow(ScanValue),
    /// Leave the candidates as they are
    Keep,
}

impl From<(bool, ScanValue)> for MonitorDecision {
    fn from((narrow, target): (bool, ScanValue)) -> Self {
        if narrow {
            MonitorDecision::Narrow(target)
        } else {
            MonitorDecision::Keep
        }
    }
}

/// One poll's reading of every candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Values in candidate order
    pub values: Vec<ScanValue>,
    pub tally: Tally,
}

/// State carried from one poll to the next
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorState {
    /// Tally the next poll is compared against; `None` before the first poll
    pub baseline: Option<Tally>,
    pub polls: u64,
}

/// Result of a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStep {
    /// First poll, baseline recorded without consulting the caller
    Seeded,
    /// Tally identical to the previous poll
    Unchanged,
    /// Change detected, caller chose not to narrow
    ChangeKept,
    /// Change detected and the session was narrowed
    Narrowed { remaining: usize },
    /// Narrowed below the exit threshold
    Stopped { remaining: usize },
}

/// Summary returned when the loop stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOutcome {
    pub polls: u64,
    pub narrowings: usize,
    pub remaining: usize,
}

impl<P: MemoryProvider> ScanSession<'_, P> {
    /// Reads every candidate once.
    ///
    /// Any read failure releases the session.
    pub fn observe(&mut self) -> MemoryResult<Observation> {
        let provider = self.provider();
        let handle = self.handle();
        let value_type = self.value_type();
        let result: MemoryResult<Vec<ScanValue>> = self
            .candidates()?
            .iter()
            .map(|address| provider.read_value(handle, address, value_type))
            .collect();
        let values = self.release_on_err(result)?;
        let tally = values.iter().copied().collect();
        Ok(Observation { values, tally })
    }

    /// Runs one poll: observe, compare against the baseline and, on a
    /// change, ask `on_change` what to do.
    ///
    /// Returns the state for the next poll along with what happened. The
    /// baseline is refreshed on every poll; after a narrowing it becomes the
    /// post-rescan tally, i.e. every remaining candidate holding the target.
    pub fn monitor_step<F, D>(
        &mut self,
        state: MonitorState,
        options: &MonitorOptions,
        on_change: &mut F,
    ) -> MemoryResult<(MonitorState, MonitorStep)>
    where
        F: FnMut(&[ScanValue], &Tally) -> D,
        D: Into<MonitorDecision>,
    {
        let observation = self.observe()?;
        let polls = state.polls + 1;

        let previous = match state.baseline {
            Some(previous) => previous,
            None => {
                debug!(tally = %observation.tally, "monitor baseline seeded");
                let next = MonitorState {
                    baseline: Some(observation.tally),
                    polls,
                };
                return Ok((next, MonitorStep::Seeded));
            }
        };

        if previous == observation.tally {
            let next = MonitorState {
                baseline: Some(observation.tally),
                polls,
            };
            return Ok((next, MonitorStep::Unchanged));
        }

        info!(from = %previous, to = %observation.tally, "change detected");
        let decision: MonitorDecision = on_change(&observation.values, &observation.tally).into();
        match decision {
            MonitorDecision::Keep => {
                let next = MonitorState {
                    baseline: Some(observation.tally),
                    polls,
                };
                Ok((next, MonitorStep::ChangeKept))
            }
            MonitorDecision::Narrow(target) => {
                let remaining = self.rescan(target)?;
                let next = MonitorState {
                    baseline: Some(Tally::uniform(target, remaining)),
                    polls,
                };
                let step = if remaining < options.min_addresses_to_exit {
                    MonitorStep::Stopped { remaining }
                } else {
                    MonitorStep::Narrowed { remaining }
                };
                Ok((next, step))
            }
        }
    }

    /// Polls the candidates every `options.interval` until a narrowing drops
    /// the count below `options.min_addresses_to_exit`.
    ///
    /// Blocks the calling thread. There is no other exit: the loop runs
    /// until it stops or a read fails, which releases the session.
    pub fn monitor<F, D>(
        &mut self,
        options: &MonitorOptions,
        mut on_change: F,
    ) -> MemoryResult<MonitorOutcome>
    where
        F: FnMut(&[ScanValue], &Tally) -> D,
        D: Into<MonitorDecision>,
    {
        let candidates = self.len()?;
        info!(
            candidates,
            min_addresses_to_exit = options.min_addresses_to_exit,
            interval_ms = options.interval.as_millis() as u64,
            "monitor started"
        );

        let mut state = MonitorState::default();
        let mut narrowings = 0;
        loop {
            let (next, step) = self.monitor_step(state, options, &mut on_change)?;
            state = next;
            match step {
                MonitorStep::Stopped { remaining } => {
                    narrowings += 1;
                    info!(polls = state.polls, remaining, "monitor stopped");
                    return Ok(MonitorOutcome {
                        polls: state.polls,
                        narrowings,
                        remaining,
                    });
                }
                MonitorStep::Narrowed { remaining } => {
                    narrowings += 1;
                    debug!(remaining, "narrowed, still monitoring");
                }
                _ => {}
            }
            thread::sleep(options.interval);
        }
    }
}
