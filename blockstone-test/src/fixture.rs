//! A local HTTP server that serves fixed provider responses.
//!
//! Provider clients are tested against a [`FixtureServer`] instead of the
//! real APIs, so tests are deterministic and work offline.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::{net::TcpListener, task::JoinHandle};

/// A fixed response to a request path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fixture {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl Fixture {
    /// A `200 OK` response with a JSON `body`.
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.into(),
        }
    }

    /// A `200 OK` response with a plain text `body`.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/plain",
            body: body.into(),
        }
    }

    /// An empty response with `status`.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: String::new(),
        }
    }
}

#[derive(Debug, Default)]
struct FixtureState {
    fixtures: HashMap<String, Fixture>,
    requests: Mutex<Vec<String>>,
}

/// A running fixture server, which is shut down when it is dropped.
///
/// Requests for paths without a fixture get an empty `404 Not Found`.
#[derive(Debug)]
pub struct FixtureServer {
    addr: SocketAddr,
    state: Arc<FixtureState>,
    task: JoinHandle<()>,
}

impl FixtureServer {
    /// Starts a server on a random local port, which serves `fixtures` by path.
    pub async fn start<P: Into<String>>(fixtures: impl IntoIterator<Item = (P, Fixture)>) -> Self {
        let state = Arc::new(FixtureState {
            fixtures: fixtures
                .into_iter()
                .map(|(path, fixture)| (path.into(), fixture))
                .collect(),
            requests: Mutex::default(),
        });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("binding a random local port should succeed");
        let addr = listener
            .local_addr()
            .expect("bound listeners have a local address");

        let app = Router::new()
            .fallback(respond)
            .with_state(state.clone());

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("fixture server should run until it is dropped");
        });

        Self { addr, state, task }
    }

    /// Returns the base URL of this server, without a trailing `/`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Returns the path and query of each request received so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .expect("fixture handlers don't panic while holding the lock")
            .clone()
    }

    /// Returns the number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests().len()
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(State(state): State<Arc<FixtureState>>, uri: Uri) -> Response {
    let path_and_query = uri
        .path_and_query()
        .map(ToString::to_string)
        .unwrap_or_else(|| uri.path().to_string());

    state
        .requests
        .lock()
        .expect("fixture handlers don't panic while holding the lock")
        .push(path_and_query.clone());

    tracing::debug!(%path_and_query, "fixture server received request");

    match state.fixtures.get(uri.path()) {
        Some(fixture) => (
            StatusCode::from_u16(fixture.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            [(header::CONTENT_TYPE, fixture.content_type)],
            fixture.body.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Returns a base URL where nothing is listening, so connections are refused.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("binding a random local port should succeed");
    let addr = listener
        .local_addr()
        .expect("bound listeners have a local address");

    drop(listener);

    format!("http://{addr}")
}
