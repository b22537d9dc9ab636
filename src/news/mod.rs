//! News fetching: request resolution, relay fallback, caching and the
//! Idle/Loading/Success/Empty/Error state machine that drives the list.

pub mod article;
pub mod cache;
pub mod envelope;
pub mod error;
pub mod observer;
pub mod orchestrator;
pub mod params;
pub mod pool;
pub mod reducer;
pub mod state;
pub mod transport;

pub use article::{Article, Source};
pub use cache::ResponseCache;
pub use envelope::{unwrap_and_parse, Page};
pub use error::{FetchError, TransportError};
pub use observer::{StateObserver, StateRecorder};
pub use orchestrator::{FetchOrchestrator, FetchSettings};
pub use params::{Locale, Mode, RequestParameters, Selection, ALL_CATEGORIES};
pub use pool::{relay_url, ProxyPool};
pub use reducer::{FetchIntent, FetchReducer};
pub use state::{FetchState, FetchStatus, PageCursor};
pub use transport::{HttpTransport, RawResponse, Transport};
