//! Panel request seam
//!
//! Posts JSON bodies to the panel pages and hands the outcome back to the
//! caller instead of dropping it.

use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::time::Duration;
use tracing::{debug, warn};

/// Successful panel response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub status: u16,
    pub body: String,
}

/// Sends JSON bodies to panel pages
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PanelRequester: Send + Sync {
    /// POST `body` to the page at `path`
    ///
    /// Non-success statuses come back as [`PanelError::Request`].
    async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<RequestOutcome>;
}

/// reqwest-backed requester
pub struct HttpRequester {
    client: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
}

impl HttpRequester {
    pub fn new(config: &PanelConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookie: config.session_cookie.clone(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl PanelRequester for HttpRequester {
    async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<RequestOutcome> {
        let url = self.url_for(path);
        debug!("Sending data to {}: {}", url, body);

        let mut request = self.client.post(&url).json(&body);
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        debug!("Response status: {}", status.as_u16());
        debug!("Response text: {}", text);

        if status.is_success() {
            Ok(RequestOutcome {
                status: status.as_u16(),
                body: text,
            })
        } else {
            warn!("Panel request to {} failed: {} {}", url, status, text);
            Err(PanelError::Request {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let mut config = PanelConfig::default();
        config.base_url = "http://host:5000/".to_string();
        let requester = HttpRequester::new(&config).unwrap();
        assert_eq!(requester.url_for("/panel/status"), "http://host:5000/panel/status");
        assert_eq!(requester.url_for("panel/console"), "http://host:5000/panel/console");
    }
}
