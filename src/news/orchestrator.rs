//! The fetch state machine.
//!
//! Every user action resolves into one [`RequestParameters`] and one network
//! fetch. Issuing a request cancels the one in flight; results are applied
//! only if they belong to the newest request. Observers see every
//! transition in order.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use scopeguard::ScopeGuard;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, NewsConfig, SecureString};
use crate::mvi::Reducer;
use crate::news::cache::ResponseCache;
use crate::news::envelope::{self, Page};
use crate::news::error::FetchError;
use crate::news::observer::StateObserver;
use crate::news::params::{Locale, RequestParameters, Selection, ALL_CATEGORIES};
use crate::news::pool::ProxyPool;
use crate::news::reducer::{FetchIntent, FetchReducer};
use crate::news::state::{FetchState, FetchStatus, PageCursor};
use crate::news::transport::{HttpTransport, Transport};

/// Everything the orchestrator needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: String,
    pub api_key: Option<SecureString>,
    pub locale: Locale,
    pub page_size: u32,
    pub cache_ttl: Duration,
    /// Ceiling over the whole relay sequence, independent of attempt timeouts.
    pub hard_timeout: Duration,
}

impl FetchSettings {
    pub fn from_config(news: &NewsConfig) -> Self {
        let credential = news.resolve_credential();
        if credential.secret().is_none() {
            tracing::warn!("No news API key configured, requests will likely be refused");
        }
        Self {
            base_url: news.base_url.clone(),
            api_key: credential.secret().cloned(),
            locale: Locale {
                country: news.country.clone(),
                language: news.language.clone(),
            },
            page_size: news.page_size,
            cache_ttl: Duration::from_secs(news.cache_ttl_seconds),
            hard_timeout: Duration::from_secs(news.hard_timeout_seconds),
        }
    }
}

struct InFlight {
    generation: u64,
    token: CancellationToken,
}

struct Session {
    state: FetchState,
    selection: Selection,
    locale: Locale,
    page: u32,
    /// Bumped for every issued request; only the newest may settle.
    generation: u64,
    in_flight: Option<InFlight>,
}

/// Handle to one request issued under the session lock.
struct Ticket {
    generation: u64,
    token: CancellationToken,
    params: RequestParameters,
    append: bool,
}

struct Shared {
    settings: FetchSettings,
    transport: Arc<dyn Transport>,
    pool: ProxyPool,
    cache: ResponseCache,
    observer: Arc<dyn StateObserver>,
    session: Mutex<Session>,
}

/// Coordinates user intents with the relay pool and the response cache.
///
/// Cheap to clone; clones share one session. Every operation returns the
/// state current at the moment it settled, which is not necessarily the
/// outcome of that operation if a newer one superseded it.
#[derive(Clone)]
pub struct FetchOrchestrator {
    shared: Arc<Shared>,
}

impl FetchOrchestrator {
    pub fn new(
        settings: FetchSettings,
        pool: ProxyPool,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn StateObserver>,
    ) -> Self {
        let session = Session {
            state: FetchState::default(),
            selection: Selection::default(),
            locale: settings.locale.clone(),
            page: 1,
            generation: 0,
            in_flight: None,
        };
        Self {
            shared: Arc::new(Shared {
                cache: ResponseCache::new(settings.cache_ttl),
                settings,
                transport,
                pool,
                observer,
                session: Mutex::new(session),
            }),
        }
    }

    /// Build an orchestrator talking to the network over HTTP.
    pub fn from_config(
        config: &Config,
        observer: Arc<dyn StateObserver>,
    ) -> Result<Self, reqwest::Error> {
        let transport = HttpTransport::with_defaults(Duration::from_secs(
            config.gateway.connect_timeout_seconds,
        ))?;
        let pool = ProxyPool::new(
            config.relays.clone(),
            Duration::from_secs(config.news.attempt_timeout_seconds),
        );
        Ok(Self::new(
            FetchSettings::from_config(&config.news),
            pool,
            Arc::new(transport),
            observer,
        ))
    }

    /// Headlines for the configured country, no category, page 1.
    pub async fn load_initial(&self) -> FetchState {
        self.reset_and_fetch(Selection::default()).await
    }

    /// Category headlines from page 1. `"all"` clears the category filter.
    /// Any active search is dropped.
    pub async fn switch_category(&self, category: &str) -> FetchState {
        self.reset_and_fetch(Selection::category(category)).await
    }

    /// Free-text search from page 1. A blank query behaves exactly like
    /// `switch_category("all")`.
    pub async fn search(&self, query: &str) -> FetchState {
        if query.trim().is_empty() {
            return self.switch_category(ALL_CATEGORIES).await;
        }
        self.reset_and_fetch(Selection::search(query)).await
    }

    /// Next page of the current selection, appended to the list.
    ///
    /// Ignored unless the last result was a full page and nothing is in
    /// flight.
    pub async fn load_more(&self) -> FetchState {
        let ticket = {
            let mut session = self.shared.session.lock();
            if session.state.status() != FetchStatus::Success
                || !session.state.has_more()
                || session.in_flight.is_some()
            {
                tracing::debug!(
                    status = ?session.state.status(),
                    in_flight = session.in_flight.is_some(),
                    "load_more ignored"
                );
                return session.state.clone();
            }
            let next = session.page + 1;
            self.issue(&mut session, next, true)
        };
        self.run(ticket).await
    }

    /// Change the search language and refetch the current selection from
    /// page 1.
    pub async fn set_language(&self, language: &str) -> FetchState {
        let ticket = {
            let mut session = self.shared.session.lock();
            session.locale.language = language.trim().to_lowercase();
            session.page = 1;
            self.issue(&mut session, 1, false)
        };
        self.run(ticket).await
    }

    /// Abort the request in flight without issuing another. The state
    /// returns to Idle once the fetch notices.
    pub fn cancel(&self) {
        let session = self.shared.session.lock();
        if let Some(in_flight) = &session.in_flight {
            tracing::debug!(generation = in_flight.generation, "Cancelling in-flight request");
            in_flight.token.cancel();
        }
    }

    pub fn state(&self) -> FetchState {
        self.shared.session.lock().state.clone()
    }

    /// Parameters the current selection resolves to.
    pub fn parameters(&self) -> RequestParameters {
        let session = self.shared.session.lock();
        self.resolve(&session, session.page)
    }

    pub fn current_proxy_index(&self) -> usize {
        self.shared.pool.current_index()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.shared.cache
    }

    async fn reset_and_fetch(&self, selection: Selection) -> FetchState {
        let ticket = {
            let mut session = self.shared.session.lock();
            session.selection = selection;
            session.page = 1;
            self.issue(&mut session, 1, false)
        };
        self.run(ticket).await
    }

    fn resolve(&self, session: &Session, page: u32) -> RequestParameters {
        RequestParameters::resolve(
            &session.selection,
            &session.locale,
            page,
            self.shared.settings.page_size,
        )
    }

    /// Supersede whatever is in flight and move to Loading with a request
    /// for `page`. Caller holds the session lock. The session page only
    /// moves once that page loads.
    fn issue(&self, session: &mut Session, page: u32, append: bool) -> Ticket {
        if let Some(previous) = session.in_flight.take() {
            tracing::debug!(generation = previous.generation, "Superseding in-flight request");
            previous.token.cancel();
        }

        session.generation += 1;
        let token = CancellationToken::new();
        session.in_flight = Some(InFlight {
            generation: session.generation,
            token: token.clone(),
        });

        let params = self.resolve(session, page);
        tracing::info!(generation = session.generation, request = %params, append, "Fetching news");
        self.apply(session, FetchIntent::Begin { append });

        Ticket {
            generation: session.generation,
            token,
            params,
            append,
        }
    }

    async fn run(&self, ticket: Ticket) -> FetchState {
        let cacheable = !ticket.params.is_search();
        if cacheable {
            if let Some(page) = self.shared.cache.get(&ticket.params.cache_key()) {
                tracing::debug!(generation = ticket.generation, "Served from cache");
                return self.settle(&ticket, Ok(page), false);
            }
        }

        // Resets to Idle if the caller drops this future before it settles.
        let generation = ticket.generation;
        let guard = scopeguard::guard((), |()| self.abandon(generation));
        let result = self.fetch(&ticket).await;
        ScopeGuard::into_inner(guard);

        self.settle(&ticket, result, cacheable)
    }

    /// One relay sequence bounded by the hard ceiling and the cancel token.
    async fn fetch(&self, ticket: &Ticket) -> Result<Page, FetchError> {
        let settings = &self.shared.settings;
        let target = ticket
            .params
            .endpoint_url(&settings.base_url, settings.api_key.as_ref().map(SecureString::expose));
        let after = settings.hard_timeout;
        let deadline = Instant::now() + after;

        let response = tokio::select! {
            biased;
            _ = ticket.token.cancelled() => return Err(FetchError::Cancelled),
            _ = tokio::time::sleep_until(deadline) => return Err(FetchError::HardTimeout { after }),
            result = self.shared.pool.fetch(self.shared.transport.as_ref(), &target) => result,
        };

        // A relay answering exactly at the ceiling still counts as too late.
        if Instant::now() >= deadline {
            return Err(FetchError::HardTimeout { after });
        }
        envelope::unwrap_and_parse(&response?.body)
    }

    fn settle(
        &self,
        ticket: &Ticket,
        result: Result<Page, FetchError>,
        write_cache: bool,
    ) -> FetchState {
        let mut session = self.shared.session.lock();
        if session.generation != ticket.generation {
            tracing::debug!(
                generation = ticket.generation,
                current = session.generation,
                "Discarding stale result"
            );
            return session.state.clone();
        }
        session.in_flight = None;

        match result {
            Ok(page) => {
                tracing::info!(
                    generation = ticket.generation,
                    articles = page.articles.len(),
                    total = ?page.total_results,
                    "News loaded"
                );
                session.page = ticket.params.page;
                if write_cache {
                    self.shared
                        .cache
                        .insert(ticket.params.cache_key(), page.clone());
                }
                let cursor = PageCursor {
                    page: ticket.params.page,
                    page_size: ticket.params.page_size,
                    last_batch: page.received,
                };
                self.apply(
                    &mut session,
                    FetchIntent::Loaded {
                        articles: page.articles,
                        cursor,
                        append: ticket.append,
                    },
                );
            }
            Err(FetchError::Cancelled) => {
                tracing::debug!(generation = ticket.generation, "Request abandoned");
                self.apply(&mut session, FetchIntent::Abandoned);
            }
            Err(err) => {
                tracing::warn!(
                    generation = ticket.generation,
                    kind = err.kind(),
                    error = %err,
                    "News fetch failed"
                );
                self.apply(
                    &mut session,
                    FetchIntent::Failed {
                        message: err.user_message(),
                    },
                );
            }
        }
        session.state.clone()
    }

    /// Settle `generation` as abandoned if it is still the newest request.
    fn abandon(&self, generation: u64) {
        let mut session = self.shared.session.lock();
        let owns_flight = session
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == generation);
        if owns_flight {
            tracing::debug!(generation, "Fetch dropped before settling");
            session.in_flight = None;
            self.apply(&mut session, FetchIntent::Abandoned);
        }
    }

    fn apply(&self, session: &mut Session, intent: FetchIntent) {
        let next = FetchReducer::reduce(std::mem::take(&mut session.state), intent);
        debug_assert!(next.is_consistent(), "inconsistent state: {:?}", next);
        session.state = next;
        self.shared.observer.on_state_change(&session.state);
    }
}
