use super::intent::Intent;
use super::state::ViewState;

/// Reducer transforms state based on intents.
///
/// The reducer is the only place where state transitions are computed.
/// It must be a pure function: (State, Intent) -> State
pub trait Reducer {
    type State: ViewState;

    type Intent: Intent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
