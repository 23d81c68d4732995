use std::{fmt, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    catalog::{CatalogSource, CatalogStore},
    config::AppConfig,
    error::ValidationError,
    models::{GameCategory, GameDifficulty, GameFlag, GamePlatform, GameRecord},
    query::{run_query, toggle, FilterRequest, FilterUpdate, ResultPage, SortSpec},
};

use super::state::{QueryStatus, SessionState};

/// Artificial delay applied before a query runs.
#[derive(Clone, Default)]
pub enum Latency {
    /// Queries run as soon as they are dispatched.
    #[default]
    None,
    /// Same delay for every query.
    Fixed(Duration),
    /// Delay chosen per request.
    PerRequest(Arc<dyn Fn(&FilterRequest) -> Duration + Send + Sync>),
}

impl Latency {
    /// Build a [`Latency::PerRequest`] from a closure.
    pub fn per_request(delay: impl Fn(&FilterRequest) -> Duration + Send + Sync + 'static) -> Self {
        Latency::PerRequest(Arc::new(delay))
    }

    fn delay_for(&self, request: &FilterRequest) -> Duration {
        match self {
            Latency::None => Duration::ZERO,
            Latency::Fixed(delay) => *delay,
            Latency::PerRequest(delay) => delay(request),
        }
    }
}

impl fmt::Debug for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Latency::None => f.write_str("None"),
            Latency::Fixed(delay) => write!(f, "Fixed({delay:?})"),
            Latency::PerRequest(_) => f.write_str("PerRequest(..)"),
        }
    }
}

/// Tunables for a [`QuerySession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Games per page; must be positive.
    pub page_size: usize,
    /// Quiet period before a typed query is executed. Zero disables debouncing.
    pub search_debounce: Duration,
    /// Delay applied before each query runs.
    pub latency: Latency,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for SessionConfig {
    fn from(config: &AppConfig) -> Self {
        let latency = match config.simulated_latency() {
            delay if delay.is_zero() => Latency::None,
            delay => Latency::Fixed(delay),
        };
        Self {
            page_size: config.page_size,
            search_debounce: config.search_debounce(),
            latency,
        }
    }
}

/// Owns the filter request of one user and publishes query results.
///
/// Every mutation issues a new query generation. Queries run on spawned
/// tokio tasks; a result is committed only if its generation is still the
/// latest issued, so an older query finishing late never overwrites a newer
/// one. Text queries are debounced, every other mutation dispatches at once.
///
/// Dispatching methods must be called from within a tokio runtime.
#[derive(Clone)]
pub struct QuerySession {
    shared: Arc<Shared>,
}

struct Shared {
    source: CatalogSource,
    config: SessionConfig,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<SessionState>,
}

struct Inner {
    request: FilterRequest,
    generation: u64,
    /// Bumped by every keystroke and every dispatch; a debounced search only
    /// fires if its token is still current.
    search_token: u64,
    catalog: Option<CatalogStore>,
}

impl QuerySession {
    /// Create an idle session. Nothing is loaded until [`QuerySession::start`].
    pub fn new(source: CatalogSource, config: SessionConfig) -> Result<Self, ValidationError> {
        let request = FilterRequest::with_page_size(config.page_size)?;
        let (state_tx, _) = watch::channel(SessionState::idle(request.clone()));
        Ok(Self {
            shared: Arc::new(Shared {
                source,
                config,
                inner: Mutex::new(Inner {
                    request,
                    generation: 0,
                    search_token: 0,
                    catalog: None,
                }),
                state_tx,
            }),
        })
    }

    /// Create a session over `records` and issue the initial query.
    pub fn initialize(
        records: Vec<GameRecord>,
        config: SessionConfig,
    ) -> Result<Self, ValidationError> {
        Self::from_source(CatalogSource::records(records), config)
    }

    /// Create a session over `source` and issue the initial query.
    pub fn from_source(
        source: CatalogSource,
        config: SessionConfig,
    ) -> Result<Self, ValidationError> {
        let session = Self::new(source, config)?;
        session.start();
        Ok(session)
    }

    /// Leave `Idle` by issuing the first query.
    pub fn start(&self) {
        info!(source = ?self.shared.source, "Query session started");
        self.shared.dispatch("session started");
    }

    /// Latest published state.
    pub fn state(&self) -> SessionState {
        self.shared.state_tx.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state_tx.subscribe()
    }

    /// Current filter request, including typed text not yet dispatched.
    pub fn request(&self) -> FilterRequest {
        self.shared.inner.lock().request.clone()
    }

    /// Catalog backing this session, once loaded.
    pub fn catalog(&self) -> Option<CatalogStore> {
        self.shared.inner.lock().catalog.clone()
    }

    /// Wait until the latest dispatched query has completed.
    pub async fn settled(&self) -> SessionState {
        let mut receiver = self.subscribe();
        loop {
            {
                let state = receiver.borrow_and_update();
                if state.is_settled() {
                    return state.clone();
                }
            }
            if receiver.changed().await.is_err() {
                return self.state();
            }
        }
    }

    /// Merge a partial change and re-query.
    pub fn update_filters(&self, update: FilterUpdate) {
        let changed = self.shared.inner.lock().request.apply(update);
        info!(changed, "Filters updated");
        self.shared.dispatch("filters updated");
    }

    /// Jump to `page`. Out-of-range pages are clamped once the result arrives.
    pub fn set_page(&self, page: usize) {
        self.shared.inner.lock().request.page = page.max(1);
        info!(page, "Page changed");
        self.shared.dispatch("page changed");
    }

    /// Move one page forward.
    pub fn next_page(&self) {
        let page = self.shared.inner.lock().request.page;
        self.set_page(page.saturating_add(1));
    }

    /// Move one page back.
    pub fn previous_page(&self) {
        let page = self.shared.inner.lock().request.page;
        self.set_page(page.saturating_sub(1));
    }

    /// Add or remove a category restriction and return to page 1.
    pub fn toggle_category(&self, category: GameCategory) {
        let selected = self.mutate(|request| toggle(&mut request.categories, category));
        info!(category = %category, selected, "Category filter toggled");
        self.shared.dispatch("category changed");
    }

    /// Add or remove a difficulty restriction and return to page 1.
    pub fn toggle_difficulty(&self, difficulty: GameDifficulty) {
        let selected = self.mutate(|request| toggle(&mut request.difficulties, difficulty));
        info!(difficulty = %difficulty, selected, "Difficulty filter toggled");
        self.shared.dispatch("difficulty changed");
    }

    /// Add or remove a platform restriction and return to page 1.
    pub fn toggle_platform(&self, platform: GamePlatform) {
        let selected = self.mutate(|request| toggle(&mut request.platforms, platform));
        info!(platform = %platform, selected, "Platform filter toggled");
        self.shared.dispatch("platform changed");
    }

    /// Add or remove a required flag and return to page 1.
    pub fn toggle_flag(&self, flag: GameFlag) {
        let selected = self.mutate(|request| toggle(&mut request.flags, flag));
        info!(flag = %flag, selected, "Flag filter toggled");
        self.shared.dispatch("flag changed");
    }

    /// Set or clear the minimum average rating.
    pub fn set_min_rating(&self, min_rating: Option<f32>) {
        self.shared
            .inner
            .lock()
            .request
            .apply(FilterUpdate::default().min_rating(min_rating));
        info!(?min_rating, "Minimum rating changed");
        self.shared.dispatch("rating changed");
    }

    /// Change the result order.
    pub fn set_sort(&self, sort: SortSpec) {
        self.shared
            .inner
            .lock()
            .request
            .apply(FilterUpdate::default().sort(sort));
        info!(key = %sort.key, order = ?sort.order, "Sort changed");
        self.shared.dispatch("sort changed");
    }

    /// Record typed text and execute it after the debounce window.
    ///
    /// Each call restarts the window. Any immediate mutation in the meantime
    /// picks up the text and cancels the pending execution.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        let debounce = self.shared.config.search_debounce;
        let token = {
            let mut inner = self.shared.inner.lock();
            inner.request.apply(FilterUpdate::default().query(text.clone()));
            inner.search_token += 1;
            inner.search_token
        };
        debug!(query = %text, token, "Search text changed");

        if debounce.is_zero() {
            self.shared.dispatch("query changed");
            return;
        }

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if shared.inner.lock().search_token != token {
                return;
            }
            info!(query = %text, "Search query settled");
            shared.dispatch("query changed");
        });
    }

    /// Execute the current text right away, skipping the debounce window.
    pub fn submit_query(&self) {
        info!("Search submitted");
        self.shared.dispatch("query submitted");
    }

    /// Reset the request to defaults and re-query.
    pub fn clear_filters(&self) {
        self.shared.inner.lock().request.clear();
        info!("All filters cleared");
        self.shared.dispatch("filters cleared");
    }

    /// Re-issue the current request, reloading the catalog if it never loaded.
    pub fn retry(&self) {
        let status = self.shared.state_tx.borrow().status;
        if status != QueryStatus::Failed {
            debug!(?status, "Retry requested outside of failure state");
        }
        info!("Retrying query");
        self.shared.dispatch("retry");
    }

    fn mutate<R>(&self, change: impl FnOnce(&mut FilterRequest) -> R) -> R {
        let mut inner = self.shared.inner.lock();
        let result = change(&mut inner.request);
        inner.request.page = 1;
        result
    }
}

impl Shared {
    /// Issue a new generation for the current request and run it.
    fn dispatch(self: &Arc<Self>, reason: &'static str) {
        let (generation, request) = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.search_token += 1;
            let generation = inner.generation;
            let request = inner.request.clone();
            self.state_tx.send_modify(|state| {
                state.status = QueryStatus::Loading;
                state.generation = generation;
                state.request = request.clone();
            });
            (generation, request)
        };
        debug!(generation, reason, "Query dispatched");

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let delay = shared.config.latency.delay_for(&request);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let outcome = shared.run(&request).await;
            shared.commit(generation, request, outcome);
        });
    }

    async fn run(&self, request: &FilterRequest) -> Result<ResultPage, String> {
        let catalog = self.catalog().await?;
        run_query(&catalog, request).map_err(|err| {
            error!(%err, "Query rejected");
            err.to_string()
        })
    }

    async fn catalog(&self) -> Result<CatalogStore, String> {
        let cached = self.inner.lock().catalog.clone();
        if let Some(catalog) = cached {
            return Ok(catalog);
        }

        match self.source.load().await {
            Ok(catalog) => {
                let mut inner = self.inner.lock();
                Ok(inner.catalog.get_or_insert(catalog).clone())
            }
            Err(err) => {
                warn!(%err, "Catalog load failed");
                Err(err.user_message())
            }
        }
    }

    fn commit(&self, generation: u64, mut request: FilterRequest, outcome: Result<ResultPage, String>) {
        let mut inner = self.inner.lock();
        if generation != inner.generation {
            debug!(generation, latest = inner.generation, "Discarding stale query result");
            return;
        }

        match outcome {
            Ok(page) => {
                if inner.request.page == request.page && page.current_page != request.page {
                    debug!(
                        requested = request.page,
                        clamped = page.current_page,
                        "Page clamped into range"
                    );
                    inner.request.page = page.current_page;
                }
                request.page = page.current_page;
                info!(
                    generation,
                    total = page.total_matches,
                    page = page.current_page,
                    pages = page.total_pages,
                    "Query ready"
                );
                self.state_tx.send_modify(|state| {
                    state.status = QueryStatus::Ready;
                    state.result = Some(page);
                    state.error = None;
                    state.request = request;
                });
            }
            Err(message) => {
                warn!(generation, error = %message, "Query failed");
                self.state_tx.send_modify(|state| {
                    state.status = QueryStatus::Failed;
                    state.error = Some(message);
                    state.request = request;
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BUILTIN_GAMES;
    use tempfile::tempdir;

    fn config(page_size: usize) -> SessionConfig {
        SessionConfig {
            page_size,
            search_debounce: Duration::from_millis(300),
            latency: Latency::None,
        }
    }

    fn twelve() -> Vec<GameRecord> {
        BUILTIN_GAMES.clone()
    }

    #[test]
    fn new_session_is_idle() {
        let session = QuerySession::new(CatalogSource::Builtin, config(12)).expect("valid config");
        let state = session.state();
        assert_eq!(state.status, QueryStatus::Idle);
        assert_eq!(state.generation, 0);
        assert!(state.result.is_none());
    }

    #[test]
    fn zero_page_size_fails_fast() {
        let err = QuerySession::new(CatalogSource::Builtin, config(0)).err();
        assert_eq!(err, Some(ValidationError::ZeroPageSize));
    }

    #[tokio::test(start_paused = true)]
    async fn start_moves_through_loading_to_ready() {
        let session = QuerySession::initialize(twelve(), config(12)).expect("valid config");
        assert_eq!(session.state().status, QueryStatus::Loading);

        let state = session.settled().await;
        assert_eq!(state.status, QueryStatus::Ready);
        assert_eq!(state.generation, 1);
        let page = state.result.expect("result page");
        assert_eq!(page.total_matches, 12);
        assert_eq!(page.items.len(), 12);
        assert_eq!(session.catalog().map(|c| c.len()), Some(12));
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_page_is_clamped() {
        let session = QuerySession::initialize(twelve(), config(4)).expect("valid config");
        let page = session.settled().await.result.expect("result page");
        assert_eq!(page.total_pages, 3);

        session.set_page(5);
        let state = session.settled().await;
        let page = state.result.expect("result page");
        assert_eq!(page.current_page, 3);
        assert_eq!(state.request.page, 3);
        assert_eq!(session.request().page, 3);

        session.next_page();
        assert_eq!(session.settled().await.result.map(|p| p.current_page), Some(3));
        session.previous_page();
        assert_eq!(session.settled().await.result.map(|p| p.current_page), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_update_is_idempotent() {
        let session = QuerySession::initialize(twelve(), config(4)).expect("valid config");
        session.set_page(2);
        let before = session.settled().await.result.expect("result page");

        session.update_filters(FilterUpdate::default());
        let after = session.settled().await.result.expect("result page");
        assert_eq!(after.current_page, before.current_page);
        assert_eq!(after.total_matches, before.total_matches);
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_filters_restores_full_catalog() {
        let session = QuerySession::initialize(twelve(), config(12)).expect("valid config");
        session.toggle_category(GameCategory::Puzzle);
        session.toggle_flag(GameFlag::Featured);
        let filtered = session.settled().await;
        assert!(filtered.is_empty());
        assert_eq!(filtered.status, QueryStatus::Ready);
        assert!(filtered.error.is_none());

        session.clear_filters();
        let cleared = session.settled().await;
        assert_eq!(cleared.result.map(|p| p.total_matches), Some(12));
        assert!(cleared.request.is_unfiltered());
    }

    #[tokio::test(start_paused = true)]
    async fn toggles_reset_page_and_combine() {
        let session = QuerySession::initialize(twelve(), config(2)).expect("valid config");
        session.set_page(3);
        session.settled().await;

        session.toggle_category(GameCategory::Puzzle);
        session.toggle_category(GameCategory::Racing);
        let state = session.settled().await;
        let page = state.result.expect("result page");
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_matches, 2);

        session.toggle_category(GameCategory::Racing);
        session.toggle_difficulty(GameDifficulty::Easy);
        session.toggle_platform(GamePlatform::Tablet);
        let page = session.settled().await.result.expect("result page");
        assert_eq!(page.items.iter().map(|g| g.id.as_str()).collect::<Vec<_>>(), ["2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn last_issued_request_wins() {
        let mut config = config(12);
        config.latency = Latency::per_request(|request| {
            if request.query == "slow" {
                Duration::from_millis(500)
            } else {
                Duration::from_millis(10)
            }
        });
        let session = QuerySession::initialize(twelve(), config).expect("valid config");
        session.settled().await;

        session.update_filters(FilterUpdate::default().query("slow"));
        session.update_filters(
            FilterUpdate::default()
                .query("")
                .categories([GameCategory::Racing]),
        );

        let state = session.settled().await;
        assert_eq!(state.generation, 3);
        assert_eq!(state.result.as_ref().map(|p| p.total_matches), Some(1));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(session.state(), state);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_issues_one_query() {
        let session = QuerySession::initialize(twelve(), config(12)).expect("valid config");
        session.settled().await;

        session.set_query("c");
        session.set_query("cy");
        session.set_query("cyber");
        assert_eq!(session.state().generation, 1);

        tokio::time::sleep(Duration::from_millis(400)).await;
        let state = session.settled().await;
        assert_eq!(state.generation, 2);
        assert_eq!(state.request.query, "cyber");
        let page = state.result.expect("result page");
        assert_eq!(page.items.iter().map(|g| g.id.as_str()).collect::<Vec<_>>(), ["1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_mutation_absorbs_pending_search() {
        let session = QuerySession::initialize(twelve(), config(12)).expect("valid config");
        session.settled().await;

        session.set_query("fantasy");
        session.toggle_flag(GameFlag::New);
        let state = session.settled().await;
        assert_eq!(state.generation, 2);
        assert_eq!(state.result.map(|p| p.total_matches), Some(2));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(session.state().generation, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_skips_debounce() {
        let session = QuerySession::initialize(twelve(), config(12)).expect("valid config");
        session.settled().await;

        session.set_query("arena");
        session.submit_query();
        let state = session.settled().await;
        assert_eq!(state.generation, 2);
        assert_eq!(state.result.map(|p| p.total_matches), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn sort_and_rating_flow_through() {
        let session = QuerySession::initialize(twelve(), config(3)).expect("valid config");
        session.set_min_rating(Some(4.4));
        session.set_sort(SortSpec::by(crate::query::SortKey::Rating));
        let page = session.settled().await.result.expect("result page");
        assert_eq!(page.total_matches, 5);
        assert_eq!(
            page.items.iter().map(|g| g.id.as_str()).collect::<Vec<_>>(),
            ["8", "2", "5"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn load_failure_is_recoverable_by_retry() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        let session = QuerySession::from_source(CatalogSource::File(path.clone()), config(12))
            .expect("valid config");

        let failed = session.settled().await;
        assert_eq!(failed.status, QueryStatus::Failed);
        assert!(failed.result.is_none());
        assert_eq!(
            failed.error.as_deref(),
            Some("The game catalog is unavailable right now.")
        );

        crate::catalog::source::export_catalog(&path, &BUILTIN_GAMES[..5]).expect("export");
        session.retry();
        let ready = session.settled().await;
        assert_eq!(ready.status, QueryStatus::Ready);
        assert!(ready.error.is_none());
        assert_eq!(ready.result.map(|p| p.total_matches), Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn corrupt_records_surface_as_failure() {
        let mut records = twelve();
        records[1].id = records[0].id.clone();
        let session = QuerySession::initialize(records, config(12)).expect("valid config");
        let state = session.settled().await;
        assert_eq!(state.status, QueryStatus::Failed);
        assert_eq!(
            state.error.as_deref(),
            Some("The game catalog appears to be corrupt.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn filter_change_leaves_failed_state() {
        let dir = tempdir().expect("tempdir");
        let session = QuerySession::from_source(
            CatalogSource::File(dir.path().join("absent.json")),
            config(12),
        )
        .expect("valid config");
        let failed = session.settled().await;
        assert_eq!(failed.status, QueryStatus::Failed);

        session.toggle_category(GameCategory::Racing);
        let loading = session.state();
        assert_eq!(loading.status, QueryStatus::Loading);
        assert_eq!(loading.generation, failed.generation + 1);
        assert!(loading.request.categories.contains(&GameCategory::Racing));

        let state = session.settled().await;
        assert_eq!(state.status, QueryStatus::Failed);
        assert_eq!(state.generation, loading.generation);
        assert!(state
            .error
            .as_deref()
            .is_some_and(|message| !message.contains("absent.json")));
    }
}
