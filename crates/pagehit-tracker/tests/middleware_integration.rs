use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use tower::ServiceExt;

use pagehit_core::{config::Config, MemoryStore};
use pagehit_tracker::{track_page_views, Tracker};

const BROWSER: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

fn test_config() -> Config {
    Config {
        salt: "middleware-salt".to_string(),
        tenant_id: None,
        bot_tokens: vec![],
        referrer_domain_blacklist: vec![],
        referrer_domain_blacklist_includes_subdomains: false,
        buffer_max_size: 100,
        flush_interval_ms: 5000,
    }
}

/// A host application with two pages, tracked by the middleware.
fn setup() -> (Arc<MemoryStore>, Arc<Tracker>, Router) {
    let store = Arc::new(MemoryStore::new());
    let tracker = Arc::new(Tracker::new(store.clone(), test_config()));
    let app = Router::new()
        .route("/", get(|| async { "home" }).post(|| async { "posted" }))
        .route("/about", get(|| async { "about" }))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&tracker),
            track_page_views,
        ));
    (store, tracker, app)
}

fn page_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("user-agent", BROWSER)
        .header("referer", "https://search.example.net/results?q=pagehit")
        .body(Body::empty())
        .expect("build request")
}

#[tokio::test]
async fn successful_get_is_tracked() {
    let (store, tracker, app) = setup();

    let response = app.oneshot(page_request("/about?lang=en")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    tracker.flush().await;
    let hits = store.hits();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path.as_deref(), Some("/about"));
    assert_eq!(hits[0].url.as_deref(), Some("/about?lang=en"));
    assert_eq!(hits[0].referrer.as_deref(), Some("https://search.example.net/results"));
    assert_eq!(hits[0].browser.as_deref(), Some("Firefox"));
    assert!(hits[0].desktop);
}

#[tokio::test]
async fn not_found_is_not_tracked() {
    let (store, tracker, app) = setup();

    let response = app.oneshot(page_request("/missing")).await.expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    tracker.flush().await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn non_get_is_not_tracked() {
    let (store, tracker, app) = setup();
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("user-agent", BROWSER)
        .body(Body::empty())
        .expect("build request");

    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    tracker.flush().await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn bot_request_is_served_but_not_tracked() {
    let (store, tracker, app) = setup();
    let request = Request::builder()
        .method("GET")
        .uri("/")
        .header("user-agent", "Mozilla/5.0 (compatible; bingbot/2.0)")
        .body(Body::empty())
        .expect("build request");

    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    tracker.flush().await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn peer_address_feeds_the_fingerprint() {
    let (store, tracker, app) = setup();

    for peer in ["192.0.2.10:40000", "192.0.2.10:40001", "192.0.2.11:40000"] {
        let addr: SocketAddr = peer.parse().expect("socket addr");
        let mut request = page_request("/");
        request.extensions_mut().insert(ConnectInfo(addr));
        let response = app.clone().oneshot(request).await.expect("request");
        assert_eq!(response.status(), StatusCode::OK);
    }

    tracker.flush().await;
    let hits = store.hits();
    assert_eq!(hits.len(), 3);
    // Same IP on a different port is the same visitor.
    assert_eq!(hits[0].fingerprint, hits[1].fingerprint);
    assert_ne!(hits[0].fingerprint, hits[2].fingerprint);
}
