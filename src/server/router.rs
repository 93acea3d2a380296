//! Routes and middleware for the read-only HTTP surface

use crate::refresh::SnapshotCache;
use crate::roster::UserRecord;
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

const ALLOWED_HEADERS: &str = "Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, \
     Authorization, accept, origin, Cache-Control, X-Requested-With";
const ALLOWED_METHODS: &str = "GET, OPTIONS";
// IMF-fixdate, e.g. "Sun, 06 Nov 1994 08:49:37 GMT"
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Response body for `GET /deploys`
#[derive(Debug, Serialize)]
pub struct DeploysEnvelope<'a> {
    pub data: &'a [UserRecord],
}

/// Router with `/` (liveness) and `/deploys` (latest snapshot)
pub fn router(cache: Arc<SnapshotCache>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/deploys", get(get_deploys))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(cache)
}

async fn liveness() -> StatusCode {
    StatusCode::OK
}

// Reads the cache only; serialization happens after the lock is released.
async fn get_deploys(State(cache): State<Arc<SnapshotCache>>) -> Response {
    let snapshot = cache.current();
    let mut response = Json(DeploysEnvelope {
        data: snapshot.records(),
    })
    .into_response();

    if let Some(generated_at) = snapshot.generated_at() {
        let stamp = generated_at.format(HTTP_DATE).to_string();
        if let Ok(value) = HeaderValue::from_str(&stamp) {
            response.headers_mut().insert(header::LAST_MODIFIED, value);
        }
    }
    response
}

/// Allow cross-origin reads from anywhere; answer preflights with 204
pub async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
}
