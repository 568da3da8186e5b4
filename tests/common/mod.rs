#![allow(dead_code)]

//! In-memory fakes for the storage, cache, and stream seams.
//!
//! Handler and service tests run against these instead of live Postgres,
//! Redis, and NATS. Each fake keeps observable state (plus call counters
//! where a test needs to assert a path was or was not taken).

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use linkrelay::application::services::{ClickPublisher, LinkService, RedirectTokenSigner};
use linkrelay::domain::entities::{ClickEvent, ClickStatus, Link, LinkPatch, NewLink};
use linkrelay::domain::repositories::{ClickEventStore, LinkStore};
use linkrelay::error::AppError;
use linkrelay::infrastructure::cache::{CacheLookup, CacheResult, LinkCache};
use linkrelay::infrastructure::stream::{ClickLog, LogError};
use linkrelay::state::AppState;

pub const TEST_TOKEN_SECRET: &str = "test-token-secret";

// ─── Link store ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryLinkStore {
    links: Mutex<HashMap<String, Link>>,
    /// Number of `fetch_by_code` calls, for cache-aside assertions.
    pub fetches: AtomicUsize,
}

impl InMemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn get(&self, code: &str) -> Option<Link> {
        self.links.lock().unwrap().get(code).cloned()
    }

    pub fn put(&self, link: Link) {
        self.links.lock().unwrap().insert(link.code.clone(), link);
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();
        if links.contains_key(&new_link.code) {
            return Err(AppError::conflict(
                "Code already exists",
                json!({ "code": new_link.code }),
            ));
        }

        let now = Utc::now();
        let link = Link {
            code: new_link.code.clone(),
            url: new_link.url,
            mode: new_link.mode,
            timer_seconds: new_link.timer_seconds,
            disabled: new_link.disabled,
            expires_at: new_link.expires_at,
            created_at: now,
            updated_at: now,
        };
        links.insert(new_link.code, link.clone());
        Ok(link)
    }

    async fn fetch_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.links.lock().unwrap().get(code).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Link>, AppError> {
        let mut links: Vec<Link> = self.links.lock().unwrap().values().cloned().collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Option<Link>, AppError> {
        let mut links = self.links.lock().unwrap();
        let Some(link) = links.get_mut(code) else {
            return Ok(None);
        };

        if let Some(url) = patch.url {
            link.url = url;
        }
        if let Some(mode) = patch.mode {
            link.mode = mode;
        }
        if let Some(timer_seconds) = patch.timer_seconds {
            link.timer_seconds = timer_seconds;
        }
        if let Some(disabled) = patch.disabled {
            link.disabled = disabled;
        }
        if let Some(expires_at) = patch.expires_at {
            link.expires_at = expires_at;
        }
        link.updated_at = Utc::now();

        Ok(Some(link.clone()))
    }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

/// Cache fake with a perfect (exact-set) existence filter.
///
/// Entry value `None` models the negative sentinel.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Option<Link>>>,
    filter: Mutex<HashSet<String>>,
    /// When false, `may_exist` answers true for everything, like a cache
    /// whose filter backend is down.
    pub filter_enabled: bool,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            filter_enabled: true,
            ..Self::default()
        }
    }

    /// A cache whose filter never rules anything out.
    pub fn without_filter() -> Self {
        Self::default()
    }

    pub fn cached(&self, code: &str) -> Option<Option<Link>> {
        self.entries.lock().unwrap().get(code).cloned()
    }

    pub fn has_negative(&self, code: &str) -> bool {
        matches!(self.cached(code), Some(None))
    }
}

#[async_trait]
impl LinkCache for InMemoryCache {
    async fn may_exist(&self, code: &str) -> bool {
        if !self.filter_enabled {
            return true;
        }
        self.filter.lock().unwrap().contains(code)
    }

    async fn register(&self, code: &str) -> CacheResult<()> {
        self.filter.lock().unwrap().insert(code.to_string());
        Ok(())
    }

    async fn lookup(&self, code: &str) -> CacheLookup {
        match self.entries.lock().unwrap().get(code) {
            Some(Some(link)) => CacheLookup::Hit(link.clone()),
            Some(None) => CacheLookup::Negative,
            None => CacheLookup::Miss,
        }
    }

    async fn store(&self, link: &Link) -> CacheResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(link.code.clone(), Some(link.clone()));
        Ok(())
    }

    async fn store_negative(&self, code: &str) -> CacheResult<()> {
        self.entries.lock().unwrap().insert(code.to_string(), None);
        Ok(())
    }

    async fn invalidate(&self, code: &str) -> CacheResult<()> {
        self.entries.lock().unwrap().remove(code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

// ─── Click store ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryClickStore {
    events: Mutex<HashMap<String, ClickEvent>>,
}

impl InMemoryClickStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<ClickEvent> {
        self.events.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<ClickEvent> {
        self.events.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl ClickEventStore for InMemoryClickStore {
    async fn insert(&self, event: &ClickEvent) -> Result<(), AppError> {
        // Duplicate-tolerant, like ON CONFLICT DO NOTHING.
        self.events
            .lock()
            .unwrap()
            .entry(event.id.clone())
            .or_insert_with(|| event.clone());
        Ok(())
    }

    async fn mark_status(&self, id: &str, status: ClickStatus) -> Result<u64, AppError> {
        let mut events = self.events.lock().unwrap();
        match events.get_mut(id) {
            Some(event) if event.status == ClickStatus::Pending => {
                event.status = status;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn fail_expired_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let mut events = self.events.lock().unwrap();
        let mut changed = 0;
        for event in events.values_mut() {
            if event.status == ClickStatus::Pending && event.timestamp < cutoff {
                event.status = ClickStatus::Failed;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

// ─── Click log ───────────────────────────────────────────────────────────────

/// Captures published payloads instead of appending to a stream.
#[derive(Default)]
pub struct CapturingClickLog {
    published: Mutex<Vec<Vec<u8>>>,
}

impl CapturingClickLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published_events(&self) -> Vec<ClickEvent> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|p| serde_json::from_slice(p).unwrap())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl ClickLog for CapturingClickLog {
    async fn publish(&self, payload: Vec<u8>) -> Result<(), LogError> {
        self.published.lock().unwrap().push(payload);
        Ok(())
    }
}

// ─── State assembly ──────────────────────────────────────────────────────────

/// Handles to the fakes behind a test [`AppState`].
pub struct TestBackend {
    pub store: Arc<InMemoryLinkStore>,
    pub cache: Arc<InMemoryCache>,
    pub clicks: Arc<InMemoryClickStore>,
    pub log: Arc<CapturingClickLog>,
    pub tokens: Arc<RedirectTokenSigner>,
}

/// Builds an [`AppState`] wired entirely to in-memory fakes.
pub fn create_test_state() -> (AppState, TestBackend) {
    let store = Arc::new(InMemoryLinkStore::new());
    let cache = Arc::new(InMemoryCache::new());
    let clicks = Arc::new(InMemoryClickStore::new());
    let log = Arc::new(CapturingClickLog::new());
    let tokens = Arc::new(RedirectTokenSigner::new(
        TEST_TOKEN_SECRET.as_bytes(),
        Duration::from_secs(60),
    ));

    let state = AppState {
        links: Arc::new(LinkService::new(store.clone(), cache.clone())),
        clicks: clicks.clone(),
        publisher: Arc::new(ClickPublisher::new(log.clone())),
        tokens: tokens.clone(),
        cache: cache.clone(),
    };

    let backend = TestBackend {
        store,
        cache,
        clicks,
        log,
        tokens,
    };

    (state, backend)
}

/// Inserts a link through the service so the existence filter learns it,
/// exactly like the create endpoint would.
pub async fn create_test_link(state: &AppState, code: &str, url: &str) -> Link {
    state
        .links
        .create(NewLink {
            code: code.to_string(),
            url: url.to_string(),
            mode: Default::default(),
            timer_seconds: 0,
            disabled: false,
            expires_at: None,
        })
        .await
        .unwrap()
}

pub fn pending_click(id: &str, link_code: &str, age_seconds: i64) -> ClickEvent {
    ClickEvent {
        id: id.to_string(),
        link_code: link_code.to_string(),
        ip: "203.0.113.7".to_string(),
        user_agent: "test-agent".to_string(),
        status: ClickStatus::Pending,
        timestamp: Utc::now() - chrono::Duration::seconds(age_seconds),
    }
}
