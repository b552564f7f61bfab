//! Persistence seam for the counter state
//!
//! On the board the state lives in RTC slow memory, which keeps its content
//! through deep sleep but not through a power loss. The cycle only talks to
//! it through [`PersistentStore`], loading once and storing once per wake.

use crate::clock::ClockState;

/// Memory that outlives a deep sleep transition
pub trait PersistentStore {
    /// Read the state left behind by the previous cycle
    fn load(&self) -> ClockState;

    /// Write the state for the next cycle
    fn store(&mut self, state: &ClockState);
}

/// Plain memory store, behaves like RTC memory after a fresh power-up.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: ClockState,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given state instead of the first boot defaults
    pub fn with_state(state: ClockState) -> Self {
        MemoryStore { state, writes: 0 }
    }

    /// How many times the state was stored
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl PersistentStore for MemoryStore {
    fn load(&self) -> ClockState {
        self.state
    }

    fn store(&mut self, state: &ClockState) {
        self.state = *state;
        self.writes += 1;
    }
}
