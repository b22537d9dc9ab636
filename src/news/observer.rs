//! Renderer-facing notification contract.

use parking_lot::Mutex;

use crate::news::state::FetchState;

/// Notified after every transition, in order, with the new state.
///
/// Called while the orchestrator holds its session lock: implementations
/// must not call back into the orchestrator and must treat the state as
/// read-only.
pub trait StateObserver: Send + Sync {
    fn on_state_change(&self, state: &FetchState);
}

impl<F> StateObserver for F
where
    F: Fn(&FetchState) + Send + Sync,
{
    fn on_state_change(&self, state: &FetchState) {
        self(state)
    }
}

/// Observer that keeps every state it was shown.
#[derive(Default)]
pub struct StateRecorder {
    states: Mutex<Vec<FetchState>>,
}

impl StateRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> Vec<FetchState> {
        self.states.lock().clone()
    }

    pub fn last(&self) -> Option<FetchState> {
        self.states.lock().last().cloned()
    }
}

impl StateObserver for StateRecorder {
    fn on_state_change(&self, state: &FetchState) {
        self.states.lock().push(state.clone());
    }
}
