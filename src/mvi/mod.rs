//! Model-View-Intent primitives shared by the widget cores.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ Observer
//!    ↑                                │
//!    └────────────────────────────────┘
//! ```
//!
//! - **State**: value replaced wholesale on every transition
//! - **Intent**: outcome or command that may move the state
//! - **Reducer**: pure function computing the next state

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::ViewState;
