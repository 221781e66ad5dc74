use crate::scrapers::traits::{PageRenderer, RendererFactory};
use crate::scrapers::types::{Navigation, RenderError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches server-rendered HTML without running any scripts.
/// Enough for directory pages that embed their content in the initial response.
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RenderError::Launch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str, navigation: Navigation) -> Result<String, RenderError> {
        debug!("Fetching URL: {}", url);

        let navigation_error = |e: reqwest::Error| RenderError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .timeout(navigation.timeout)
            .send()
            .await
            .map_err(navigation_error)?;

        if !response.status().is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| RenderError::Document {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(html)
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

/// Gives every worker its own HTTP client
pub struct HttpLauncher;

#[async_trait]
impl RendererFactory for HttpLauncher {
    async fn launch(&self) -> Result<Box<dyn PageRenderer>, RenderError> {
        Ok(Box::new(HttpRenderer::new()?))
    }
}
