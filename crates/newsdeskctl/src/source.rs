//! Status sources - where the poller gets raw response bodies from
//!
//! `HttpStatusSource` talks to the backend over HTTP. `FakeStatusSource`
//! serves canned bodies for tests and can hold a request open until a gate
//! is released.

use async_trait::async_trait;
use newsdesk_common::config::{ApiConfig, HttpConfig};
use newsdesk_common::{ApiRequest, Endpoint, FetchError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::debug;

/// Anything that can answer a status request with a raw body
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self, request: &ApiRequest) -> Result<String, FetchError>;
}

/// Real source backed by reqwest
pub struct HttpStatusSource {
    api_root: String,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl HttpStatusSource {
    pub fn new(api: &ApiConfig, http: &HttpConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(http.timeout())
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_root: api.api_root(),
            timeout_ms: http.effective_timeout_ms(),
            client,
        })
    }

    pub fn url_for(&self, request: &ApiRequest) -> String {
        format!("{}{}", self.api_root, request.path_and_query())
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout_ms)
        } else {
            FetchError::Transport(format!("Request failed: {}", e))
        }
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch(&self, request: &ApiRequest) -> Result<String, FetchError> {
        let url = self.url_for(request);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        // Error statuses usually still carry an {"error": ...} body; only
        // give up on the body when it is not JSON at all.
        if !status.is_success()
            && serde_json::from_str::<serde::de::IgnoredAny>(&body).is_err()
        {
            return Err(FetchError::Transport(format!("HTTP {} from {}", status, url)));
        }

        Ok(body)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type FetchHook = Box<dyn Fn(&ApiRequest) + Send + Sync>;

/// Fake source for testing
///
/// Responses are queued per endpoint. A single queued response is served
/// forever; with several queued, each call takes the next one.
#[derive(Default)]
pub struct FakeStatusSource {
    responses: Mutex<HashMap<Endpoint, Vec<Result<String, FetchError>>>>,
    gates: Mutex<HashMap<Endpoint, VecDeque<oneshot::Receiver<()>>>>,
    calls: Mutex<Vec<ApiRequest>>,
    hook: Mutex<Option<FetchHook>>,
}

impl FakeStatusSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw body
    pub fn respond(&self, endpoint: Endpoint, body: impl Into<String>) -> &Self {
        lock(&self.responses)
            .entry(endpoint)
            .or_default()
            .push(Ok(body.into()));
        self
    }

    /// Queue a JSON body
    pub fn respond_json(&self, endpoint: Endpoint, value: serde_json::Value) -> &Self {
        self.respond(endpoint, value.to_string())
    }

    /// Queue a transport-level failure
    pub fn fail(&self, endpoint: Endpoint, error: FetchError) -> &Self {
        lock(&self.responses)
            .entry(endpoint)
            .or_default()
            .push(Err(error));
        self
    }

    /// Hold the next request to `endpoint` open until the returned sender
    /// fires (or is dropped).
    pub fn gate(&self, endpoint: Endpoint) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        lock(&self.gates).entry(endpoint).or_default().push_back(rx);
        tx
    }

    /// Run `hook` at the moment each request is issued
    pub fn on_fetch<F>(&self, hook: F)
    where
        F: Fn(&ApiRequest) + Send + Sync + 'static,
    {
        *lock(&self.hook) = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .count()
    }

    fn next_response(&self, endpoint: Endpoint) -> Result<String, FetchError> {
        let mut responses = lock(&self.responses);
        match responses.get_mut(&endpoint) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) if queue.len() == 1 => queue[0].clone(),
            _ => Err(FetchError::Transport(format!(
                "no canned response for {}",
                endpoint
            ))),
        }
    }
}

#[async_trait]
impl StatusSource for FakeStatusSource {
    async fn fetch(&self, request: &ApiRequest) -> Result<String, FetchError> {
        lock(&self.calls).push(request.clone());
        if let Some(hook) = lock(&self.hook).as_ref() {
            hook(request);
        }

        let response = self.next_response(request.endpoint);
        let gate = lock(&self.gates)
            .get_mut(&request.endpoint)
            .and_then(|q| q.pop_front());
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_url_building() {
        let api = ApiConfig {
            base_url: "http://backend:5000/".to_string(),
            prefix: "/api".to_string(),
        };
        let source = HttpStatusSource::new(&api, &HttpConfig::default()).unwrap();
        assert_eq!(
            source.url_for(&ApiRequest::recent_articles(5)),
            "http://backend:5000/api/recent-articles?limit=5"
        );
        assert_eq!(
            source.url_for(&ApiRequest::new(Endpoint::AiStatus)),
            "http://backend:5000/api/ai-status"
        );
    }

    #[tokio::test]
    async fn test_fake_single_response_repeats() {
        let source = FakeStatusSource::new();
        source.respond_json(Endpoint::WordPressTest, json!({"connected": true}));

        let request = ApiRequest::new(Endpoint::WordPressTest);
        for _ in 0..3 {
            let body = source.fetch(&request).await.unwrap();
            assert_eq!(body, r#"{"connected":true}"#);
        }
        assert_eq!(source.call_count(Endpoint::WordPressTest), 3);
    }

    #[tokio::test]
    async fn test_fake_queued_responses() {
        let source = FakeStatusSource::new();
        source
            .respond(Endpoint::Stats, "first")
            .fail(Endpoint::Stats, FetchError::Timeout(100))
            .respond(Endpoint::Stats, "last");

        let request = ApiRequest::new(Endpoint::Stats);
        assert_eq!(source.fetch(&request).await.unwrap(), "first");
        assert_eq!(source.fetch(&request).await, Err(FetchError::Timeout(100)));
        assert_eq!(source.fetch(&request).await.unwrap(), "last");
        assert_eq!(source.fetch(&request).await.unwrap(), "last");
    }

    #[tokio::test]
    async fn test_fake_without_response() {
        let source = FakeStatusSource::new();
        let result = source.fetch(&ApiRequest::new(Endpoint::AiStatus)).await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_fake_gate_holds_request() {
        let source = std::sync::Arc::new(FakeStatusSource::new());
        source.respond(Endpoint::Stats, "held");
        let release = source.gate(Endpoint::Stats);

        let pending = {
            let source = source.clone();
            tokio::spawn(async move { source.fetch(&ApiRequest::new(Endpoint::Stats)).await })
        };
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        release.send(()).unwrap();
        assert_eq!(pending.await.unwrap().unwrap(), "held");
    }
}
