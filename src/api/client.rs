use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::types::{AskRequest, NewThreadRequest, NewThreadResponse, StreamConfig};
use crate::config::Config;
use crate::error::ApiError;

pub const ASK_PATH: &str = "/api/v1/chat/ask";
pub const NEW_THREAD_PATH: &str = "/api/v1/chat/new";
pub const STREAM_PATH: &str = "/api/v1/chat/stream";

const API_KEY_HEADER: &str = "ZAI-API-KEY";
const THREAD_ID_HEADER: &str = "zai-thread-id";

/// HTTP client for the chat backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// `<base_url><path>`, keeping any path prefix on the base.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            url: raw,
            message: e.to_string(),
        })
    }

    pub fn build_headers(&self, thread_id: Option<&str>) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !self.api_key.is_empty() {
            headers.insert(
                HeaderName::from_static("zai-api-key"),
                HeaderValue::from_str(&self.api_key)
                    .map_err(|_| ApiError::InvalidHeader(API_KEY_HEADER))?,
            );
        }
        if let Some(thread_id) = thread_id {
            headers.insert(
                HeaderName::from_static(THREAD_ID_HEADER),
                HeaderValue::from_str(thread_id)
                    .map_err(|_| ApiError::InvalidHeader(THREAD_ID_HEADER))?,
            );
        }
        Ok(headers)
    }

    /// Non-streaming question. Returns the raw message array.
    pub async fn ask(&self, request: &AskRequest) -> Result<Value, ApiError> {
        self.post_json(ASK_PATH, request).await
    }

    pub async fn create_new_thread(
        &self,
        request: &NewThreadRequest,
    ) -> Result<NewThreadResponse, ApiError> {
        self.post_json(NEW_THREAD_PATH, request).await
    }

    /// Open the chat stream. The response body is consumed with
    /// `bytes_stream()` by the caller.
    pub async fn stream_chat(&self, config: &StreamConfig) -> Result<Response, ApiError> {
        let url = self.endpoint(STREAM_PATH)?;
        debug!(%url, thread_id = %config.thread_id, "opening chat stream");
        let response = self
            .http
            .post(url)
            .headers(self.build_headers(Some(&config.thread_id))?)
            .json(config)
            .send()
            .await?;
        let response = check_status(response).await?;
        if response.content_length() == Some(0) {
            return Err(ApiError::EmptyResponse);
        }
        Ok(response)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .headers(self.build_headers(None)?)
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("").to_string(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str, key: &str) -> ApiClient {
        let config = Config {
            base_url: Url::parse(base).unwrap(),
            api_key: key.to_string(),
        };
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn endpoint_appends_path() {
        let c = client("http://localhost:3001", "k");
        assert_eq!(
            c.endpoint(STREAM_PATH).unwrap().as_str(),
            "http://localhost:3001/api/v1/chat/stream"
        );
    }

    #[test]
    fn endpoint_keeps_base_prefix() {
        let c = client("https://example.com/backend/", "k");
        assert_eq!(
            c.endpoint(ASK_PATH).unwrap().as_str(),
            "https://example.com/backend/api/v1/chat/ask"
        );
    }

    #[test]
    fn headers_carry_key_and_thread() {
        let headers = client("http://localhost:3001", "secret")
            .build_headers(Some("t-1"))
            .unwrap();
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(headers.get("ZAI-API-KEY").unwrap(), "secret");
        assert_eq!(headers.get("zai-thread-id").unwrap(), "t-1");
    }

    #[test]
    fn invalid_thread_header_is_rejected() {
        let err = client("http://localhost:3001", "k")
            .build_headers(Some("bad\nid"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidHeader("zai-thread-id")));
    }

    #[test]
    fn status_error_message() {
        let err = ApiError::Status {
            status: 401,
            reason: "Unauthorized".into(),
            body: "bad key".into(),
        };
        assert_eq!(err.to_string(), "request failed: 401 Unauthorized. bad key");
    }
}
