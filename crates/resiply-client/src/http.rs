use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use resiply_types::{ChatLogsResponse, ChatRequest, ChatResponse, RemoteThread};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::traits::{ChatBackend, SuggestBackend};

const CHAT_PATH: &str = "/recommendations/chat";
const CHAT_LOGS_PATH: &str = "/recommendations/chat/logs";
const SUGGEST_PATH: &str = "/search/suggest";

/// reqwest-backed implementation of the backend traits.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        if let Some(token) = &config.session_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::InvalidConfig("invalid session token".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Join base and path without doubling slashes.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client.request(method, self.url(path))
    }

    async fn execute<T: DeserializeOwned + Default>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn chat_logs(&self, member_id: &str) -> Result<Vec<RemoteThread>> {
        let builder = self
            .request(Method::GET, CHAT_LOGS_PATH)
            .query(&[("member_id", member_id)]);

        let logs: ChatLogsResponse = self.execute(builder).await?;
        tracing::debug!(member_id, threads = logs.threads.len(), "Fetched chat logs");
        Ok(logs.threads)
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let builder = self.request(Method::POST, CHAT_PATH).json(request);
        let response: ChatResponse = self.execute(builder).await?;
        tracing::debug!(
            response_type = ?response.response_type,
            chat_log_id = ?response.chat_log_id,
            "Chat reply received"
        );
        Ok(response)
    }
}

#[async_trait]
impl SuggestBackend for HttpBackend {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let limit_param = limit.to_string();
        let builder = self
            .request(Method::GET, SUGGEST_PATH)
            .query(&[("q", query), ("limit", limit_param.as_str())]);

        // Anything other than a string array counts as no suggestions.
        let value: serde_json::Value = self.execute(builder).await?;
        let mut suggestions: Vec<String> = match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        suggestions.truncate(limit);
        Ok(suggestions)
    }
}
