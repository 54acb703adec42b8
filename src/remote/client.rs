//! HTTP implementation of the remote action API.

use serde_json::{Map, Value};

use super::{ReadAction, RemoteApi, RemoteError, RemoteFailure, WriteAction};
use crate::config::SyncConfig;
use crate::sync::SyncError;

/// Talks to the remote endpoint over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    endpoint: String,
    http: reqwest::Client,
}

impl RemoteClient {
    /// Creates a client for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Creates a client from config.
    ///
    /// Returns an error if no endpoint is configured.
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or(SyncError::NotConfigured)?;
        Ok(Self::new(endpoint))
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Builds the URL for a read action.
    fn read_url(&self, action: ReadAction) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}action={}",
            self.endpoint,
            separator,
            urlencoding::encode(action.as_str())
        )
    }

    async fn parse_response(
        action: &'static str,
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<Value, RemoteError> {
        let response =
            response.map_err(|e| RemoteError::new(action, RemoteFailure::Network(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::new(
                action,
                RemoteFailure::Status(status.as_u16()),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RemoteError::new(action, RemoteFailure::Decode(e.to_string())))
    }
}

#[async_trait::async_trait]
impl RemoteApi for RemoteClient {
    async fn read(&self, action: ReadAction) -> Result<Value, RemoteError> {
        let url = self.read_url(action);
        tracing::debug!("GET {}", url);

        let response = self.http.get(&url).send().await;
        Self::parse_response(action.as_str(), response).await
    }

    async fn write(
        &self,
        action: WriteAction,
        mut payload: Map<String, Value>,
    ) -> Result<Value, RemoteError> {
        tracing::debug!("POST {} action={}", self.endpoint, action.as_str());

        payload.insert(
            "action".to_string(),
            Value::String(action.as_str().to_string()),
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(&Value::Object(payload))
            .send()
            .await;
        Self::parse_response(action.as_str(), response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_url() {
        let client = RemoteClient::new("https://script.example.com/exec");
        assert_eq!(
            client.read_url(ReadAction::ListBills),
            "https://script.example.com/exec?action=listBills"
        );
    }

    #[test]
    fn test_read_url_with_existing_query() {
        let client = RemoteClient::new("https://script.example.com/exec?key=abc");
        assert_eq!(
            client.read_url(ReadAction::GetSettings),
            "https://script.example.com/exec?key=abc&action=getSettings"
        );
    }

    #[test]
    fn test_from_config_requires_endpoint() {
        let config = SyncConfig::default();
        assert!(matches!(
            RemoteClient::from_config(&config),
            Err(SyncError::NotConfigured)
        ));

        let config = SyncConfig {
            endpoint: Some("http://localhost:9000/exec".to_string()),
            ..SyncConfig::default()
        };
        let client = RemoteClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9000/exec");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_failure() {
        // Port 9 (discard) is not listening on loopback in test environments.
        let client = RemoteClient::new("http://127.0.0.1:9/exec");
        let err = client.read(ReadAction::ListMenu).await.unwrap_err();
        assert_eq!(err.action, "listMenu");
        assert!(matches!(err.cause, RemoteFailure::Network(_)));
    }
}
