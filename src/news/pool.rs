//! Ordered relay pool with last-known-good rotation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::RelayProxy;
use crate::news::envelope;
use crate::news::error::{FetchError, TransportError};
use crate::news::params::redact_api_key;
use crate::news::transport::{RawResponse, Transport};

/// Relays are interchangeable; the pool remembers which one last worked
/// and starts the next request there.
#[derive(Clone)]
pub struct ProxyPool {
    relays: Arc<[RelayProxy]>,
    current: Arc<AtomicUsize>,
    attempt_timeout: Duration,
}

impl ProxyPool {
    pub fn new(relays: Vec<RelayProxy>, attempt_timeout: Duration) -> Self {
        Self {
            relays: relays.into(),
            current: Arc::new(AtomicUsize::new(0)),
            attempt_timeout,
        }
    }

    /// Index of the last relay that answered.
    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    /// GET `target` through the pool.
    ///
    /// Tries each relay once, starting from the last-known-good index and
    /// wrapping around. An attempt fails on connection errors, on its own
    /// timeout, and on non-2xx answers that are not API error envelopes.
    pub async fn fetch(
        &self,
        transport: &dyn Transport,
        target: &str,
    ) -> Result<RawResponse, FetchError> {
        let len = self.relays.len();
        let start = self.current_index() % len.max(1);
        let mut last = None;

        for attempt in 0..len {
            let index = (start + attempt) % len;
            let relay = &self.relays[index];
            let url = relay_url(relay, target);

            let outcome = match tokio::time::timeout(self.attempt_timeout, transport.get(&url)).await
            {
                Ok(Ok(response)) if response.is_success() || envelope::is_api_error(&response.body) => {
                    Ok(response)
                }
                Ok(Ok(response)) => Err(TransportError::Status(response.status)),
                Ok(Err(err)) => Err(err),
                Err(_) => Err(TransportError::Timeout(self.attempt_timeout)),
            };

            match outcome {
                Ok(response) => {
                    if index != start {
                        tracing::info!(
                            relay = %relay.name,
                            index,
                            "Relay fallback succeeded, making it current"
                        );
                    }
                    self.current.store(index, Ordering::Relaxed);
                    return Ok(response);
                }
                Err(err) => {
                    tracing::warn!(
                        relay = %relay.name,
                        attempt = attempt + 1,
                        of = len,
                        url = %redact_api_key(&url),
                        error = %err,
                        "Relay attempt failed"
                    );
                    last = Some(err);
                }
            }
        }

        Err(FetchError::ProxyExhausted {
            attempts: len,
            last,
        })
    }
}

/// URL that asks `relay` to fetch `target`.
pub fn relay_url(relay: &RelayProxy, target: &str) -> String {
    if relay.is_direct() {
        target.to_string()
    } else {
        format!("{}{}", relay.url_prefix, urlencoding::encode(target))
    }
}
