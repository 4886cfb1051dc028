//! In-process stand-in for the repository search endpoint.

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Canned answer for one request.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn count(total: u64) -> Self {
        Reply::status(
            200,
            &format!(r#"{{"total_count": {}, "incomplete_results": false, "items": []}}"#, total),
        )
    }

    pub fn status(status: u16, body: &str) -> Self {
        Reply {
            status,
            headers: Vec::new(),
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// What the mock saw for one request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub q: String,
    pub per_page: Option<String>,
    pub authorization: Option<String>,
}

type Responder = Arc<dyn Fn(&str) -> Reply + Send + Sync>;

#[derive(Clone)]
struct MockState {
    responder: Responder,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockApi {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockApi {
    /// Serve `responder(q)` for every search request on a random local port.
    pub async fn start(responder: impl Fn(&str) -> Reply + Send + Sync + 'static) -> MockApi {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            responder: Arc::new(responder),
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/search/repositories", get(search))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockApi {
            url: format!("http://{}/search/repositories", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn search(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let q = params.get("q").cloned().unwrap_or_default();
    state.requests.lock().unwrap().push(Recorded {
        q: q.clone(),
        per_page: params.get("per_page").cloned(),
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    let reply = (state.responder)(&q);
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let mut response = (StatusCode::from_u16(reply.status).unwrap(), reply.body).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in reply.headers {
        response.headers_mut().insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(&value).unwrap(),
        );
    }
    response
}

/// The `created:` range embedded in a query, e.g. `2020-01-01..2020-12-31`.
pub fn created_range(q: &str) -> &str {
    q.split_whitespace()
        .find_map(|part| part.strip_prefix("created:"))
        .unwrap_or("")
}
