pub mod browser;
pub mod discovery;
pub mod http;
pub mod traits;
pub mod types;

pub use browser::{BrowserLauncher, BrowserRenderer};
pub use discovery::{discover_links, parse_directory};
pub use http::{HttpLauncher, HttpRenderer};
pub use traits::{PageRenderer, RendererFactory};
pub use types::{Navigation, RenderError};

use crate::config::{Config, RendererKind};
use std::sync::Arc;

/// Pick the renderer backend named in the configuration
pub fn renderer_factory(config: &Config) -> Arc<dyn RendererFactory> {
    match config.renderer {
        RendererKind::Browser => Arc::new(BrowserLauncher::new(config.chrome_path.clone())),
        RendererKind::Http => Arc::new(HttpLauncher),
    }
}
