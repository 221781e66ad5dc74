use crate::scrapers::types::{Navigation, RenderError};
use async_trait::async_trait;

/// Loads a URL and hands back the rendered document as HTML.
/// Each worker owns its renderer exclusively.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str, navigation: Navigation) -> Result<String, RenderError>;

    /// Name of the backend, for logging
    fn backend_name(&self) -> &'static str;
}

/// Creates one renderer per worker (and one for link discovery)
#[async_trait]
pub trait RendererFactory: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PageRenderer>, RenderError>;
}
