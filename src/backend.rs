use crate::config::BackendConfig;
use crate::error::BackendError;
use futures::future::BoxFuture;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Duration;

/// Body of `POST /command`
#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest<'a> {
    pub text: &'a str,
}

/// Reply to `POST /command`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandReply {
    /// Server-side log id, when the backend reports one
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub llm_result: Value,
    #[serde(default)]
    pub api_result: Value,
}

/// Reply to `POST /resend/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResendReply {
    #[serde(default)]
    pub original_id: Option<String>,
    #[serde(default)]
    pub llm_result: Value,
    #[serde(default)]
    pub api_result: Value,
    #[serde(default)]
    pub resend: bool,
}

/// One row of `GET /history`, the backend's own command log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub llm_result: Value,
    #[serde(default)]
    pub api_result: Value,
    #[serde(default)]
    pub timestamp: String,
}

/// Operations the console needs from the command backend
pub trait CommandBackend: Send + Sync {
    /// Interpret and execute a free-text command.
    fn create_command<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<CommandReply, BackendError>>;

    /// Run a previously logged command again.
    fn resend_command<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<ResendReply, BackendError>>;

    /// Most recent commands from the backend's log, newest first.
    fn recent_commands(&self) -> BoxFuture<'_, Result<Vec<HistoryRecord>, BackendError>>;
}

/// HTTP client for the command backend
#[derive(Clone)]
pub struct BackendClient {
    base_url: Url,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(config.base_url.clone()));
        }

        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_command(&self, text: &str) -> Result<CommandReply, BackendError> {
        let url = self.endpoint(&["command"])?;
        tracing::debug!(%url, "sending command");

        let response = self
            .client
            .post(url)
            .json(&CommandRequest { text })
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn post_resend(&self, id: &str) -> Result<ResendReply, BackendError> {
        let url = self.endpoint(&["resend", id])?;
        tracing::debug!(%url, "resending command");

        let response = self.client.post(url).send().await?;

        Self::decode(response).await
    }

    async fn get_history(&self) -> Result<Vec<HistoryRecord>, BackendError> {
        let url = self.endpoint(&["history"])?;
        tracing::debug!(%url, "fetching command log");

        let response = self.client.get(url).send().await?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let err = BackendError::from_error_body(status, &body);
            tracing::warn!(%status, detail = ?err.detail(), "backend rejected request");
            return Err(err);
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

impl CommandBackend for BackendClient {
    fn create_command<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<CommandReply, BackendError>> {
        Box::pin(self.post_command(text))
    }

    fn resend_command<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<ResendReply, BackendError>> {
        Box::pin(self.post_resend(id))
    }

    fn recent_commands(&self) -> BoxFuture<'_, Result<Vec<HistoryRecord>, BackendError>> {
        Box::pin(self.get_history())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: base.to_string(),
            request_timeout_secs: None,
        })
        .unwrap()
    }

    #[test]
    fn endpoints_respect_base_path() {
        let plain = client("http://localhost:8001");
        assert_eq!(
            plain.endpoint(&["command"]).unwrap().as_str(),
            "http://localhost:8001/command"
        );

        let nested = client("http://localhost:8001/api/");
        assert_eq!(
            nested.endpoint(&["resend", "abc"]).unwrap().as_str(),
            "http://localhost:8001/api/resend/abc"
        );
    }

    #[test]
    fn resend_id_is_a_single_encoded_segment() {
        let url = client("http://localhost:8001")
            .endpoint(&["resend", "a/b c"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8001/resend/a%2Fb%20c");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        let bad = BackendClient::new(&BackendConfig {
            base_url: "not a url".to_string(),
            request_timeout_secs: None,
        });
        assert!(matches!(bad, Err(BackendError::InvalidUrl(_))));

        let opaque = BackendClient::new(&BackendConfig {
            base_url: "mailto:ops@example.com".to_string(),
            request_timeout_secs: None,
        });
        assert!(matches!(opaque, Err(BackendError::InvalidUrl(_))));
    }

    #[test]
    fn replies_tolerate_missing_fields() {
        let reply: CommandReply = serde_json::from_value(json!({"llm_result": {"action": "add"}})).unwrap();
        assert_eq!(reply.id, None);
        assert_eq!(reply.llm_result, json!({"action": "add"}));
        assert_eq!(reply.api_result, Value::Null);

        let resend: ResendReply = serde_json::from_value(json!({
            "original_id": "42",
            "llm_result": {},
            "api_result": {"status": "ok"},
            "resend": true
        }))
        .unwrap();
        assert_eq!(resend.original_id.as_deref(), Some("42"));
        assert!(resend.resend);
    }
}
