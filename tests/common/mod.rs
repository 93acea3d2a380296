//! Shared helpers for integration tests
//!
//! `StubUpstream` stands in for the repository host and the deployment
//! host: every path answers with a scripted status, optionally after a
//! delay, and every request is counted.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::Router;
use deploywatch::app::cli::Config;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy)]
struct StubRoute {
    status: u16,
    delay: Duration,
}

#[derive(Default)]
struct StubState {
    routes: Mutex<HashMap<String, StubRoute>>,
    hits: AtomicUsize,
}

pub struct StubUpstream {
    base_url: String,
    state: Arc<StubState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl StubUpstream {
    /// Start on `127.0.0.1:0`; unscripted paths answer 404
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new()
            .fallback(answer)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub upstream");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });

        Self {
            base_url,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn respond(&self, path: &str, status: u16) {
        self.respond_slowly(path, status, Duration::ZERO);
    }

    pub fn respond_slowly(&self, path: &str, status: u16, delay: Duration) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(path.to_string(), StubRoute { status, delay });
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Repository URL template served by this stub
    pub fn repository_template(&self) -> String {
        format!("{}/gh/{{owner}}/{{resource}}", self.base_url)
    }

    /// Deployment URL template served by this stub
    pub fn deployment_template(&self) -> String {
        format!("{}/apps/{{owner}}-{{resource}}", self.base_url)
    }

    /// Script every check for `owner` to answer `status`
    pub fn respond_all_for(&self, owner: &str, status: u16) {
        for app in ["blog", "capstone"] {
            for side in ["frontend", "backend"] {
                self.respond(&format!("/gh/{}/{}-{}", owner, app, side), status);
                self.respond(&format!("/apps/{}-{}-{}", owner, app, side), status);
            }
        }
    }

    /// Configuration pointing every probe at this stub
    pub fn config(&self, users: &[&str]) -> Config {
        let mut toml = format!(
            "[refresh]\ninterval_secs = 1\nprobe_timeout_secs = 1\n\n[probes]\nrepository_url = \"{}\"\ndeployment_url = \"{}\"\n",
            self.repository_template(),
            self.deployment_template()
        );
        for user in users {
            toml.push_str(&format!("\n[[users]]\nusername = \"{}\"\n", user));
        }
        Config::from_toml_str(&toml).expect("stub config should be valid")
    }
}

impl Drop for StubUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn answer(State(state): State<Arc<StubState>>, uri: Uri) -> StatusCode {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let route = state.routes.lock().unwrap().get(uri.path()).copied();
    match route {
        Some(route) => {
            if !route.delay.is_zero() {
                tokio::time::sleep(route.delay).await;
            }
            StatusCode::from_u16(route.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Read a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
