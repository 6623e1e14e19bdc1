//! Scripted HTTP double for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{Result, SourceError};
use crate::http::HttpFetcher;

type Responder = Box<dyn Fn(&str, &[(String, String)]) -> Result<Value> + Send + Sync>;

/// A recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl Call {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Routes requests by URL substring, first match wins. Unrouted requests
/// fail with a transport error.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<Vec<(String, Responder)>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(self, pattern: &str, responder: F) -> Self
    where
        F: Fn(&str, &[(String, String)]) -> Result<Value> + Send + Sync + 'static,
    {
        self.routes
            .lock()
            .push((pattern.to_string(), Box::new(responder)));
        self
    }

    pub fn on_json(self, pattern: &str, value: Value) -> Self {
        self.on(pattern, move |_, _| Ok(value.clone()))
    }

    pub fn on_status(self, pattern: &str, status: u16) -> Self {
        self.on(pattern, move |url, _| {
            Err(SourceError::http_status(
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                url,
                None,
            ))
        })
    }

    pub fn on_transport_error(self, pattern: &str) -> Self {
        self.on(pattern, |url, _| {
            Err(SourceError::transport(url, "connection refused"))
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl HttpFetcher for ScriptedFetcher {
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value> {
        self.calls.lock().push(Call {
            url: url.to_string(),
            query: query.to_vec(),
        });
        let routes = self.routes.lock();
        match routes.iter().find(|(pattern, _)| url.contains(pattern.as_str())) {
            Some((_, responder)) => responder(url, query),
            None => Err(SourceError::transport(url, "no scripted route")),
        }
    }
}
