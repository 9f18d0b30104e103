pub mod ports;

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use ports::{MenuExtractorPort, MenuStore, OutboundPort, PageFetchPort, RestaurantSearchPort};
use router::{render, Candidate, IntentRouter, MenuError, MenuIndex, RouteAction, Session};
use thiserror::Error;
use tracing::{error, info, warn};

/// Default bound on any single external call.
pub const DEFAULT_SERVICE_TIMEOUT: Duration = Duration::from_secs(60);

/// A search, fetch, extraction or storage call that did not produce a result.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} timed out after {secs}s")]
    Timeout { service: &'static str, secs: u64 },

    #[error("{service} failed: {message}")]
    Failed { service: &'static str, message: String },
}

/// Headless ordering core: consumes chat messages, emits replies.
///
/// Session state sits behind a mutex that is only held while the router
/// runs or results are applied, never across external I/O.
pub struct OrchestratorCore<S, F, X, M, O>
where
    S: RestaurantSearchPort,
    F: PageFetchPort,
    X: MenuExtractorPort,
    M: MenuStore,
    O: OutboundPort,
{
    router: IntentRouter,
    search: S,
    fetcher: F,
    extractor: X,
    store: M,
    outbound: O,
    service_timeout: Duration,
    session: Mutex<Session>,
    self_id: Mutex<Option<String>>,
}

impl<S, F, X, M, O> OrchestratorCore<S, F, X, M, O>
where
    S: RestaurantSearchPort,
    F: PageFetchPort,
    X: MenuExtractorPort,
    M: MenuStore,
    O: OutboundPort,
{
    pub fn new(router: IntentRouter, search: S, fetcher: F, extractor: X, store: M, outbound: O) -> Self {
        Self {
            router,
            search,
            fetcher,
            extractor,
            store,
            outbound,
            service_timeout: DEFAULT_SERVICE_TIMEOUT,
            session: Mutex::new(Session::default()),
            self_id: Mutex::new(None),
        }
    }

    pub fn set_service_timeout(&mut self, timeout: Duration) {
        self.service_timeout = timeout;
    }

    /// Record the bot's own author id (known once the transport connects).
    pub fn set_self_id(&self, id: impl Into<String>) {
        *self.self_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(id.into());
    }

    /// Read-only access to the current session state.
    pub fn with_session<T>(&self, f: impl FnOnce(&Session) -> T) -> T {
        f(&self.session())
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the stored menu into the session. A missing menu is not an
    /// error; an invalid one is reported and the current menu is kept.
    pub async fn load_menu(&self) -> Result<usize> {
        let Some(items) = self.call("menu store", self.store.load()).await? else {
            warn!("no stored menu found; starting with an empty menu");
            return Ok(0);
        };
        let index = MenuIndex::build(items)?;
        let count = index.len();
        self.session().replace_menu(index);
        info!(items = count, "menu loaded from storage");
        Ok(count)
    }

    /// Entry point for inbound messages.
    pub async fn handle(&self, msg: protocol::Message) -> Result<()> {
        match msg {
            protocol::Message::ChatMessage(cm) => self.handle_chat(cm).await,
            protocol::Message::Reply(_) => Ok(()), // ignore our own echoes
        }
    }

    async fn handle_chat(&self, cm: protocol::ChatMessage) -> Result<()> {
        let routed = {
            let self_id = self.self_id.lock().unwrap_or_else(PoisonError::into_inner).clone();
            let mut session = self.session();
            self.router.route(&mut session, &cm, self_id.as_deref(), Utc::now())
        };
        info!(user = %cm.display_name, channel = %cm.channel_id, intent = ?routed.intent, "routed message");

        match routed.action {
            RouteAction::Ignore => Ok(()),
            RouteAction::Reply(texts) => self.send_all(&cm.channel_id, texts).await,
            RouteAction::SearchRestaurants { cuisine, notice } => {
                self.send(&cm.channel_id, notice).await?;
                self.search_and_offer(&cm.channel_id, &cuisine).await
            }
            RouteAction::LoadMenu { candidate, website, notices } => {
                self.send_all(&cm.channel_id, notices).await?;
                self.refresh_menu(&cm.channel_id, &candidate, &website).await
            }
        }
    }

    async fn search_and_offer(&self, channel: &str, cuisine: &str) -> Result<()> {
        let reply = match self.call("restaurant search", self.search.search(cuisine)).await {
            Ok(candidates) => {
                info!(cuisine, results = candidates.len(), "restaurant search finished");
                let mut session = self.session();
                self.router.complete_search(&mut session, candidates, Utc::now())
            }
            Err(e) => {
                warn!(cuisine, error = %e, "restaurant search failed");
                render::SEARCH_FAILED.to_string()
            }
        };
        self.send(channel, reply).await
    }

    /// Fetch, extract, validate, persist, then swap. Any failure leaves the
    /// active menu, the ledger and the stored file untouched.
    async fn refresh_menu(&self, channel: &str, candidate: &Candidate, website: &str) -> Result<()> {
        let page = match self.call("page fetch", self.fetcher.fetch_text(website)).await {
            Ok(page) => page,
            Err(e) => return self.menu_failed(channel, candidate, &e).await,
        };
        self.send(channel, render::PARSING_MENU).await?;

        let items = match self.call("menu extraction", self.extractor.extract_menu(&page)).await {
            Ok(items) if items.is_empty() => {
                let empty = MenuError::Malformed("no menu items found".to_string());
                return self.menu_failed(channel, candidate, &empty).await;
            }
            Ok(items) => items,
            Err(e) => return self.menu_failed(channel, candidate, &e).await,
        };
        let index = match MenuIndex::build(items) {
            Ok(index) => index,
            Err(e) => return self.menu_failed(channel, candidate, &e).await,
        };
        if let Err(e) = self.call("menu store", self.store.save(index.all())).await {
            return self.menu_failed(channel, candidate, &e).await;
        }

        let count = index.len();
        self.session().replace_menu(index);
        info!(restaurant = %candidate.title, items = count, "menu replaced");
        self.send(channel, render::MENU_LOADED).await
    }

    async fn menu_failed(
        &self,
        channel: &str,
        candidate: &Candidate,
        err: &(dyn std::error::Error + Send + Sync),
    ) -> Result<()> {
        error!(restaurant = %candidate.title, error = %err, "menu refresh failed");
        self.send(channel, render::MENU_LOAD_FAILED).await
    }

    async fn call<T>(
        &self,
        service: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T, ServiceError> {
        match tokio::time::timeout(self.service_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ServiceError::Failed { service, message: format!("{:#}", e) }),
            Err(_) => Err(ServiceError::Timeout { service, secs: self.service_timeout.as_secs() }),
        }
    }

    async fn send(&self, channel: &str, text: impl Into<String>) -> Result<()> {
        self.outbound.send(protocol::Message::reply(channel.to_string(), text.into())).await
    }

    async fn send_all(&self, channel: &str, texts: Vec<String>) -> Result<()> {
        for text in texts {
            self.send(channel, text).await?;
        }
        Ok(())
    }
}

// Simple in-crate mocks for demo/testing
pub mod mocks {
    use super::*;
    use async_trait::async_trait;
    use router::{JsonMenuExtractor, MenuItem};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    /// Returns canned candidates, or fails when built with `failing`.
    pub struct MockSearch {
        pub results: Vec<Candidate>,
        pub fail: bool,
    }

    impl MockSearch {
        pub fn with(results: Vec<Candidate>) -> Self {
            Self { results, fail: false }
        }

        pub fn failing() -> Self {
            Self { results: Vec::new(), fail: true }
        }
    }

    #[async_trait]
    impl RestaurantSearchPort for MockSearch {
        async fn search(&self, _cuisine: &str) -> Result<Vec<Candidate>> {
            if self.fail {
                anyhow::bail!("search backend unavailable");
            }
            Ok(self.results.clone())
        }
    }

    /// Serves the same page text for every URL; `None` simulates a fetch error.
    pub struct MockFetcher(pub Option<String>);

    #[async_trait]
    impl PageFetchPort for MockFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.0.clone().ok_or_else(|| anyhow::anyhow!("could not reach {}", url))
        }
    }

    /// Plays back a fixed model answer through the real JSON menu parser.
    pub struct MockExtractor(pub String);

    #[async_trait]
    impl MenuExtractorPort for MockExtractor {
        async fn extract_menu(&self, _page_text: &str) -> Result<Vec<MenuItem>> {
            Ok(JsonMenuExtractor::new().extract_menu(&self.0)?)
        }
    }

    /// In-memory menu store that counts writes. Clones share state.
    #[derive(Clone, Default)]
    pub struct MemoryMenuStore {
        items: Arc<std::sync::Mutex<Option<Vec<MenuItem>>>>,
        saves: Arc<AtomicUsize>,
    }

    impl MemoryMenuStore {
        pub fn with(items: Vec<MenuItem>) -> Self {
            Self { items: Arc::new(std::sync::Mutex::new(Some(items))), ..Self::default() }
        }

        pub fn stored(&self) -> Option<Vec<MenuItem>> {
            self.items.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MenuStore for MemoryMenuStore {
        async fn load(&self) -> Result<Option<Vec<MenuItem>>> {
            Ok(self.stored())
        }

        async fn save(&self, items: &[MenuItem]) -> Result<()> {
            *self.items.lock().unwrap_or_else(PoisonError::into_inner) = Some(items.to_vec());
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Clone)]
    pub struct ChannelOutbound(pub mpsc::Sender<protocol::Message>);

    #[async_trait]
    impl OutboundPort for ChannelOutbound {
        async fn send(&self, msg: protocol::Message) -> Result<()> {
            self.0.send(msg).await.map_err(|e| anyhow::anyhow!(e.to_string()))
        }
    }
}
