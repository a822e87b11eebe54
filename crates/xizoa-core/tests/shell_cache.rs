use std::collections::HashMap;
use xizoa_core::shell_cache::{
    APP_SHELL, DEFAULT_CACHE_NAME, OFFLINE_FALLBACK_URL, SKIP_WAITING_MESSAGE,
};
use xizoa_core::{
    AppConfig, CacheStorage, FetchOutcome, LifecycleAction, MemoryCacheStorage, Network,
    NetworkError, Request, Response, ShellCache,
};

/// Serves canned responses; everything else (or everything, when offline) fails.
#[derive(Default)]
struct FakeNetwork {
    responses: HashMap<String, Response>,
    offline: bool,
    requests: Vec<String>,
}

impl FakeNetwork {
    fn serving_shell() -> Self {
        let mut network = Self::default();
        for url in APP_SHELL {
            network.serve(url, Response::ok(format!("shell {url}")));
        }
        network
    }

    fn serve(&mut self, url: &str, response: Response) {
        self.responses.insert(url.to_string(), response);
    }
}

impl Network for FakeNetwork {
    fn fetch(&mut self, request: &Request) -> Result<Response, NetworkError> {
        self.requests.push(request.url.clone());
        if self.offline {
            return Err(NetworkError {
                url: request.url.clone(),
                reason: "offline".to_string(),
            });
        }
        self.responses.get(&request.url).cloned().ok_or(NetworkError {
            url: request.url.clone(),
            reason: "unreachable".to_string(),
        })
    }
}

#[test]
fn test_install_caches_whole_shell() {
    let cache = ShellCache::default();
    let mut storage = MemoryCacheStorage::new();
    let mut network = FakeNetwork::serving_shell();

    let follow_up = cache.install(&mut storage, &mut network).unwrap();
    assert_eq!(follow_up, LifecycleAction::SkipWaiting);
    assert_eq!(cache.name(), DEFAULT_CACHE_NAME);
    assert_eq!(storage.entry_count(DEFAULT_CACHE_NAME), APP_SHELL.len());
    assert_eq!(
        storage.lookup("./js/app.js"),
        Some(Response::ok("shell ./js/app.js"))
    );
}

#[test]
fn test_install_is_all_or_nothing() {
    let cache = ShellCache::default();
    let mut storage = MemoryCacheStorage::new();
    let mut network = FakeNetwork::serving_shell();
    network.serve(
        "./manifest.json",
        Response {
            status: 404,
            body: Vec::new(),
        },
    );

    let err = cache.install(&mut storage, &mut network).unwrap_err();
    assert_eq!(err.url, "./manifest.json");
    assert!(storage.cache_names().is_empty());
}

#[test]
fn test_activate_purges_old_versions() {
    let cache = ShellCache::new("xizoa-cache-v3");
    let mut storage = MemoryCacheStorage::new();
    storage.put("xizoa-cache-v1", "./", Response::ok("old"));
    storage.put("xizoa-cache-v2", "./", Response::ok("older"));
    storage.put("xizoa-cache-v3", "./", Response::ok("new"));

    let activation = cache.activate(&mut storage);
    assert_eq!(activation.purged, ["xizoa-cache-v1", "xizoa-cache-v2"]);
    assert_eq!(activation.follow_up, LifecycleAction::ClaimClients);
    assert_eq!(storage.cache_names(), ["xizoa-cache-v3"]);
    assert_eq!(storage.lookup("./"), Some(Response::ok("new")));
}

#[test]
fn test_cache_name_comes_from_config() {
    let config = AppConfig {
        cache_name: "xizoa-cache-v4".to_string(),
        ..AppConfig::default()
    };
    let cache = ShellCache::from_config(&config);
    assert_eq!(cache.name(), "xizoa-cache-v4");
    assert_eq!(ShellCache::from_config(&AppConfig::default()).name(), DEFAULT_CACHE_NAME);

    let mut storage = MemoryCacheStorage::new();
    storage.put(DEFAULT_CACHE_NAME, "./", Response::ok("v3"));
    let mut network = FakeNetwork::serving_shell();
    cache.install(&mut storage, &mut network).unwrap();
    assert_eq!(storage.entry_count("xizoa-cache-v4"), APP_SHELL.len());

    let activation = cache.activate(&mut storage);
    assert_eq!(activation.purged, [DEFAULT_CACHE_NAME]);
    assert_eq!(storage.cache_names(), ["xizoa-cache-v4"]);
}

#[test]
fn test_skip_waiting_message() {
    let cache = ShellCache::default();
    assert_eq!(
        cache.on_message(SKIP_WAITING_MESSAGE),
        Some(LifecycleAction::SkipWaiting)
    );
    assert_eq!(cache.on_message("skip_waiting"), None);
    assert_eq!(cache.on_message(""), None);
}

#[test]
fn test_non_get_requests_pass_through() {
    let cache = ShellCache::default();
    let mut storage = MemoryCacheStorage::new();
    let mut network = FakeNetwork::default();

    let request = Request::get("/api").with_method("POST");
    assert_eq!(
        cache.fetch(&request, &mut storage, &mut network),
        FetchOutcome::Passthrough
    );
    assert!(network.requests.is_empty());
}

#[test]
fn test_cached_response_wins_but_network_refreshes() {
    let cache = ShellCache::default();
    let mut storage = MemoryCacheStorage::new();
    storage.put(DEFAULT_CACHE_NAME, "./css/style.css", Response::ok("stale"));
    let mut network = FakeNetwork::default();
    network.serve("./css/style.css", Response::ok("fresh"));

    let outcome = cache.fetch(&Request::get("./css/style.css"), &mut storage, &mut network);
    assert_eq!(outcome, FetchOutcome::Cached(Response::ok("stale")));
    assert_eq!(network.requests, ["./css/style.css"]);
    assert_eq!(storage.lookup("./css/style.css"), Some(Response::ok("fresh")));
}

#[test]
fn test_uncached_requests_use_network_and_only_cache_successes() {
    let cache = ShellCache::default();
    let mut storage = MemoryCacheStorage::new();
    let mut network = FakeNetwork::default();
    network.serve("./img.png", Response::ok("png"));
    let missing = Response {
        status: 404,
        body: b"nope".to_vec(),
    };
    network.serve("./gone", missing.clone());

    assert_eq!(
        cache.fetch(&Request::get("./img.png"), &mut storage, &mut network),
        FetchOutcome::Network(Response::ok("png"))
    );
    assert_eq!(
        cache.fetch(&Request::get("./gone"), &mut storage, &mut network),
        FetchOutcome::Network(missing)
    );
    assert_eq!(storage.lookup("./img.png"), Some(Response::ok("png")));
    assert_eq!(storage.lookup("./gone"), None);
}

#[test]
fn test_offline_html_navigation_falls_back_to_root_document() {
    let cache = ShellCache::default();
    let mut storage = MemoryCacheStorage::new();
    storage.put(DEFAULT_CACHE_NAME, OFFLINE_FALLBACK_URL, Response::ok("<app/>"));
    let mut network = FakeNetwork {
        offline: true,
        ..FakeNetwork::default()
    };

    assert_eq!(
        cache.fetch(&Request::navigate("./projects/1"), &mut storage, &mut network),
        FetchOutcome::OfflineFallback(Response::ok("<app/>"))
    );
    assert_eq!(
        cache.fetch(&Request::get("./data.json"), &mut storage, &mut network),
        FetchOutcome::Unavailable
    );
}
