//! Offline application-shell cache policy.
//!
//! The policy a service worker (or any caching proxy in front of the app) follows:
//!
//! - **install**: fetch every app-shell asset and store them all in the versioned cache; if any
//!   asset fails, nothing is stored;
//! - **activate**: delete every cache whose name is not the current version, then claim open
//!   clients;
//! - **fetch**: only `GET` requests are handled. A cached response wins, but the network is still
//!   asked and a successful answer refreshes the cache. Without a cached copy the network answer
//!   is used. When both miss and the request accepts HTML, the cached root document is served.
//!
//! A freshly installed version skips the waiting phase, and a waiting version can also be told to
//! skip it with the [`SKIP_WAITING_MESSAGE`] message. The host performs the returned
//! [`LifecycleAction`]s.
//!
//! Storage and network are collaborators ([`CacheStorage`], [`Network`]); in-memory versions are
//! provided.

use crate::config::AppConfig;
use std::collections::BTreeMap;
use thiserror::Error;

/// Default versioned cache name.
pub const DEFAULT_CACHE_NAME: &str = "xizoa-cache-v3";

/// Document served to HTML navigations when offline and uncached.
pub const OFFLINE_FALLBACK_URL: &str = "./index.html";

/// Message asking a waiting version to take over immediately.
pub const SKIP_WAITING_MESSAGE: &str = "SKIP_WAITING";

/// Assets cached at install time.
pub const APP_SHELL: [&str; 8] = [
    "./",
    "./index.html",
    "./css/style.css",
    "./js/app.js",
    "./js/config.js",
    "./js/storage.js",
    "./manifest.json",
    "./assets/favicon.png",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request for {url} failed: {reason}")]
/// A network fetch failed before producing any response.
pub struct NetworkError {
    /// Requested URL.
    pub url: String,
    /// Failure description.
    pub reason: String,
}

/// A request as seen by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method, upper case.
    pub method: String,
    /// Request URL.
    pub url: String,
    /// `Accept` header, if any.
    pub accept: Option<String>,
}

impl Request {
    /// A `GET` without an `Accept` header.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            accept: None,
        }
    }

    /// A `GET` navigation accepting HTML.
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::get(url).with_accept("text/html,application/xhtml+xml")
    }

    /// Set the `Accept` header.
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Set the method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    fn accepts_html(&self) -> bool {
        self.accept
            .as_deref()
            .is_some_and(|accept| accept.contains("text/html"))
    }
}

/// A response body with its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl Response {
    /// A `200` response.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Named response caches.
pub trait CacheStorage {
    /// Store `response` for `url` in cache `cache` (created on demand).
    fn put(&mut self, cache: &str, url: &str, response: Response);

    /// Find `url` in any cache.
    fn lookup(&self, url: &str) -> Option<Response>;

    /// Names of all caches.
    fn cache_names(&self) -> Vec<String>;

    /// Delete a whole cache. Returns whether it existed.
    fn delete(&mut self, cache: &str) -> bool;
}

/// The network.
pub trait Network {
    /// Perform `request`.
    fn fetch(&mut self, request: &Request) -> Result<Response, NetworkError>;
}

/// In-memory [`CacheStorage`].
#[derive(Debug, Default, Clone)]
pub struct MemoryCacheStorage {
    caches: BTreeMap<String, BTreeMap<String, Response>>,
}

impl MemoryCacheStorage {
    /// Create storage with no caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in `cache`.
    pub fn entry_count(&self, cache: &str) -> usize {
        self.caches.get(cache).map_or(0, BTreeMap::len)
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn put(&mut self, cache: &str, url: &str, response: Response) {
        self.caches
            .entry(cache.to_string())
            .or_default()
            .insert(url.to_string(), response);
    }

    fn lookup(&self, url: &str) -> Option<Response> {
        self.caches
            .values()
            .find_map(|entries| entries.get(url).cloned())
    }

    fn cache_names(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    fn delete(&mut self, cache: &str) -> bool {
        self.caches.remove(cache).is_some()
    }
}

/// Outcome of [`ShellCache::fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not handled (non-`GET`); the request goes to the network untouched.
    Passthrough,
    /// Served from the cache.
    Cached(Response),
    /// Served from the network (any status).
    Network(Response),
    /// Network failed and nothing was cached; the cached root document was served.
    OfflineFallback(Response),
    /// Nothing could be served.
    Unavailable,
}

/// Lifecycle step the host should perform after a policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Activate this version without waiting for old clients to close.
    SkipWaiting,
    /// Take control of already open clients.
    ClaimClients,
}

/// Result of [`ShellCache::activate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// Names of the deleted caches.
    pub purged: Vec<String>,
    /// Always [`LifecycleAction::ClaimClients`].
    pub follow_up: LifecycleAction,
}

/// Versioned app-shell cache policy.
#[derive(Debug, Clone)]
pub struct ShellCache {
    name: String,
    shell: Vec<String>,
}

impl Default for ShellCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_NAME)
    }
}

impl ShellCache {
    /// Policy for cache `name` with the default [`APP_SHELL`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shell: APP_SHELL.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Policy for the cache named in `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.cache_name.clone())
    }

    /// Replace the asset list.
    pub fn with_shell(mut self, shell: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.shell = shell.into_iter().map(Into::into).collect();
        self
    }

    /// The cache name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The asset list.
    pub fn shell(&self) -> &[String] {
        &self.shell
    }

    /// Fetch and store every shell asset, all or nothing.
    ///
    /// On success the new version skips waiting.
    pub fn install<C, N>(
        &self,
        storage: &mut C,
        network: &mut N,
    ) -> Result<LifecycleAction, NetworkError>
    where
        C: CacheStorage + ?Sized,
        N: Network + ?Sized,
    {
        let mut fetched = Vec::with_capacity(self.shell.len());
        for url in &self.shell {
            let response = network.fetch(&Request::get(url))?;
            if !response.is_ok() {
                return Err(NetworkError {
                    url: url.clone(),
                    reason: format!("status {}", response.status),
                });
            }
            fetched.push((url, response));
        }
        for (url, response) in fetched {
            storage.put(&self.name, url, response);
        }
        tracing::info!(cache = %self.name, assets = self.shell.len(), "shell cached");
        Ok(LifecycleAction::SkipWaiting)
    }

    /// Delete every cache but the current one.
    pub fn activate<C: CacheStorage + ?Sized>(&self, storage: &mut C) -> Activation {
        let stale: Vec<String> = storage
            .cache_names()
            .into_iter()
            .filter(|name| *name != self.name)
            .collect();
        for name in &stale {
            storage.delete(name);
            tracing::info!(cache = %name, "removed old cache");
        }
        Activation {
            purged: stale,
            follow_up: LifecycleAction::ClaimClients,
        }
    }

    /// React to a message posted by a page. Unknown messages are ignored.
    pub fn on_message(&self, message: &str) -> Option<LifecycleAction> {
        (message == SKIP_WAITING_MESSAGE).then(|| {
            tracing::debug!(cache = %self.name, "skip waiting requested");
            LifecycleAction::SkipWaiting
        })
    }

    /// Serve `request` following the cache-first, refresh-in-background policy.
    pub fn fetch<C, N>(&self, request: &Request, storage: &mut C, network: &mut N) -> FetchOutcome
    where
        C: CacheStorage + ?Sized,
        N: Network + ?Sized,
    {
        if !request.method.eq_ignore_ascii_case("GET") {
            return FetchOutcome::Passthrough;
        }

        let cached = storage.lookup(&request.url);
        let from_network = match network.fetch(request) {
            Ok(response) => {
                if response.is_ok() {
                    storage.put(&self.name, &request.url, response.clone());
                }
                Some(FetchOutcome::Network(response))
            }
            Err(err) => {
                tracing::debug!(error = %err, "network miss");
                if request.accepts_html() {
                    storage
                        .lookup(OFFLINE_FALLBACK_URL)
                        .map(FetchOutcome::OfflineFallback)
                } else {
                    None
                }
            }
        };

        match cached {
            Some(response) => FetchOutcome::Cached(response),
            None => from_network.unwrap_or(FetchOutcome::Unavailable),
        }
    }
}
