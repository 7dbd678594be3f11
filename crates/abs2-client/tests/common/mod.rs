//! In-process mock of the ABS2 web API.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::IntoResponse;

use abs2_client::{Abs2Api, Abs2Config};

/// A request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

#[derive(Clone)]
struct Shared {
    status: u16,
    body: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Mock server answering every request with the same canned response.
pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    /// Start a server on a random port that replies `status` with `body`.
    pub async fn start(status: u16, body: impl Into<String>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = Shared {
            status,
            body: body.into(),
            requests: Arc::clone(&requests),
        };
        let router = Router::new().fallback(respond).with_state(state);
        let base_url = serve(router).await;
        Self { base_url, requests }
    }

    /// Start a server replying `status` with a JSON body.
    pub async fn json(status: u16, body: serde_json::Value) -> Self {
        Self::start(status, body.to_string()).await
    }

    /// Client configured against this server.
    pub fn api(&self) -> Abs2Api {
        Abs2Api::new(&self.config()).unwrap()
    }

    pub fn config(&self) -> Abs2Config {
        Abs2Config::new()
            .with_api_key("test-key")
            .with_base_url(&self.base_url)
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The single request received so far.
    pub fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }
}

async fn respond(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: serde_json::from_slice(&body).ok(),
    });

    let status = StatusCode::from_u16(state.status).unwrap();
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}

/// Serve `router` on `127.0.0.1:0` and return its `/v1` base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}/v1")
}

/// A base URL nothing is listening on.
pub fn unused_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1")
}
