use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::{upstream_error, Error};

/// A single JSON-over-HTTP GET. Every external service is reached through
/// this, so tests can script the responses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, Error>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    // query carries API keys
    #[tracing::instrument(skip(self, query))]
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, Error> {
        let res = self.client.get(url).query(query).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(upstream_error(format!("service responded with status {}", status)));
        }

        let data: Value = res.json().await?;

        Ok(data)
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    #[derive(Clone, Debug)]
    pub struct RecordedRequest {
        pub url: String,
        pub query: Vec<(String, String)>,
    }

    impl RecordedRequest {
        pub fn param(&self, name: &str) -> Option<&str> {
            self.query
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Replays canned responses in order and records every request.
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<Value, Error>>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl ScriptedTransport {
        pub fn new(responses: Vec<Result<Value, Error>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(vec![]),
            }
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, Error> {
            self.requests.lock().unwrap().push(RecordedRequest {
                url: url.to_string(),
                query: query
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            });

            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(upstream_error("no scripted response left")))
        }
    }
}
