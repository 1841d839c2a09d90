use crate::adapters::{Adapter, AdapterError};
use crate::extract::{classify_reader_warning, validate_content};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use url::Url;

/// Base URL of the Jina reader service
pub const JINA_READER_BASE: &str = "https://r.jina.ai/";

/// Environment variable holding the reader API key
pub const JINA_API_KEY_ENV: &str = "JINA_API_KEY";

const CONTENT_MARKER: &str = "Markdown Content:";

/// Fetches Markdown through the Jina reader API
pub struct JinaAdapter {
    client: Client,
    base: String,
    api_key: Option<String>,
    enabled: bool,
}

impl JinaAdapter {
    pub fn new(client: Client, api_key: Option<String>, enabled: bool) -> Self {
        Self {
            client,
            base: JINA_READER_BASE.to_string(),
            api_key,
            enabled,
        }
    }

    /// Reads the API key from `JINA_API_KEY`; requests are anonymous without it
    pub fn from_env(client: Client, enabled: bool) -> Self {
        let api_key = std::env::var(JINA_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::new(client, api_key, enabled)
    }

    /// Points the adapter at another reader endpoint
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    fn reader_url(&self, url: &Url) -> String {
        format!("{}{}", self.base, url)
    }
}

/// Drops the reader's metadata header when present
fn strip_reader_header(body: &str) -> &str {
    match body.find(CONTENT_MARKER) {
        Some(pos) => body[pos + CONTENT_MARKER.len()..].trim_start(),
        None => body,
    }
}

#[async_trait]
impl Adapter for JinaAdapter {
    fn name(&self) -> &'static str {
        "jina"
    }

    fn matches(&self, _url: &Url) -> bool {
        self.enabled
    }

    async fn fetch(&self, url: &Url) -> Result<String, AdapterError> {
        let mut request = self.client.get(self.reader_url(url));
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(AdapterError::from_request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(AdapterError::from_request)?;
        if body.trim().is_empty() {
            return Err(AdapterError::InvalidContent(
                "empty reader response".to_string(),
            ));
        }

        if let Some(reason) = classify_reader_warning(&body) {
            return Err(AdapterError::Blocked(reason));
        }

        let content = strip_reader_header(&body);
        validate_content(content).map_err(AdapterError::Blocked)?;

        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BlockReason;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer, key: Option<&str>) -> JinaAdapter {
        JinaAdapter::new(Client::new(), key.map(str::to_string), true)
            .with_base(format!("{}/", server.uri()))
    }

    #[test]
    fn test_disabled_adapter_does_not_match() {
        let url = Url::parse("https://x.com/docs").unwrap();
        assert!(!JinaAdapter::new(Client::new(), None, false).matches(&url));
        assert!(JinaAdapter::new(Client::new(), None, true).matches(&url));
    }

    #[test]
    fn test_strip_reader_header() {
        let body = "Title: Setup\nURL Source: https://x.com/docs/setup\n\nMarkdown Content:\n# Setup\n\nText";
        assert_eq!(strip_reader_header(body), "# Setup\n\nText");
        assert_eq!(strip_reader_header("# Plain"), "# Plain");
    }

    #[tokio::test]
    async fn test_fetch_with_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/https://x.com/docs/setup"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "Title: Setup\n\nMarkdown Content:\n# Setup\n\nInstall the tool first.",
            ))
            .mount(&server)
            .await;

        let url = Url::parse("https://x.com/docs/setup").unwrap();
        let content = adapter(&server, Some("secret")).fetch(&url).await.unwrap();
        assert_eq!(content, "# Setup\n\nInstall the tool first.");
    }

    #[tokio::test]
    async fn test_fetch_empty_response_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("   "))
            .mount(&server)
            .await;

        let url = Url::parse("https://x.com/docs/setup").unwrap();
        let err = adapter(&server, None).fetch(&url).await.unwrap_err();
        assert!(matches!(err, AdapterError::InvalidContent(_)));
    }

    #[tokio::test]
    async fn test_fetch_target_forbidden_is_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "Title: \n\nWarning: Target URL returned error 403: Forbidden\n\nMarkdown Content:\n",
            ))
            .mount(&server)
            .await;

        let url = Url::parse("https://x.com/docs/setup").unwrap();
        let err = adapter(&server, None).fetch(&url).await.unwrap_err();
        assert_eq!(err.block_reason(), Some(BlockReason::AccessDenied));
    }

    #[tokio::test]
    async fn test_fetch_challenge_page_is_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Just a moment..."))
            .mount(&server)
            .await;

        let url = Url::parse("https://x.com/docs/setup").unwrap();
        let err = adapter(&server, None).fetch(&url).await.unwrap_err();
        assert_eq!(err.block_reason(), Some(BlockReason::BotDetection));
    }
}
