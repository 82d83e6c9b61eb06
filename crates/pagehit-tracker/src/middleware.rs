use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use pagehit_core::HitRequest;

use crate::tracker::Tracker;

/// Records a page view for every successful `GET` that passes through.
///
/// Mount with `axum::middleware::from_fn_with_state(tracker, track_page_views)`
/// on the routes that serve pages. The response is passed through untouched;
/// the hit is recorded after the inner service has answered so that errors and
/// redirects are not counted. The peer address comes from `ConnectInfo` when
/// the server was started with `into_make_service_with_connect_info`.
pub async fn track_page_views(
    State(tracker): State<Arc<Tracker>>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let headers = request.headers().clone();
    let uri = request.uri().clone();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let response = next.run(request).await;

    if response.status().is_success() {
        let mut hit_request = HitRequest::new(&headers, &uri);
        if let Some(addr) = remote_addr {
            hit_request = hit_request.with_remote_addr(addr);
        }
        tracker.hit(&hit_request, None).await;
    }

    response
}
