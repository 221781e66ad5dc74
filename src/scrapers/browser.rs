use crate::scrapers::traits::{PageRenderer, RendererFactory};
use crate::scrapers::types::{Navigation, RenderError};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

static CHROME_ARGS: [&str; 9] = [
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-default-apps",
    "--disable-extensions",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
];

/// Chrome drops its connection after this long without a command
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(300);

/// Headless Chrome with a single tab reused for every page
pub struct BrowserRenderer {
    // Kept alive for as long as the tab is in use
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserRenderer {
    /// Launch a new headless Chrome process. Blocks until the browser is up.
    pub fn launch(chrome_path: Option<PathBuf>) -> Result<Self, RenderError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((1280, 720)))
            .path(chrome_path)
            .args(CHROME_ARGS.iter().map(OsStr::new).collect())
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(|e| RenderError::Launch(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(options)
            .map_err(|e| RenderError::Launch(format!("Failed to launch Chrome browser: {:#}", e)))?;
        let tab = browser
            .new_tab()
            .map_err(|e| RenderError::Launch(format!("Failed to open tab: {:#}", e)))?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

#[async_trait]
impl PageRenderer for BrowserRenderer {
    async fn render(&self, url: &str, navigation: Navigation) -> Result<String, RenderError> {
        let tab = Arc::clone(&self.tab);
        let url = url.to_string();

        tokio::task::spawn_blocking(move || load_document(&tab, &url, navigation))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))?
    }

    fn backend_name(&self) -> &'static str {
        "headless-chrome"
    }
}

fn load_document(tab: &Tab, url: &str, navigation: Navigation) -> Result<String, RenderError> {
    debug!("Navigating to {}", url);
    tab.set_default_timeout(navigation.timeout);
    tab.navigate_to(url)
        .and_then(|tab| tab.wait_until_navigated())
        .map_err(|e| RenderError::Navigation {
            url: url.to_string(),
            message: format!("{:#}", e),
        })?;

    // Give client-side scripts a moment to fill in the page
    thread::sleep(navigation.settle);

    let result = tab
        .evaluate("document.documentElement.outerHTML", false)
        .map_err(|e| RenderError::Document {
            url: url.to_string(),
            message: format!("{:#}", e),
        })?;

    match result.value.as_ref().and_then(|value| value.as_str()) {
        Some(html) if !html.is_empty() => Ok(html.to_string()),
        _ => Err(RenderError::Document {
            url: url.to_string(),
            message: "page returned no HTML".to_string(),
        }),
    }
}

/// Starts one Chrome process per worker
pub struct BrowserLauncher {
    chrome_path: Option<PathBuf>,
}

impl BrowserLauncher {
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self { chrome_path }
    }
}

#[async_trait]
impl RendererFactory for BrowserLauncher {
    async fn launch(&self) -> Result<Box<dyn PageRenderer>, RenderError> {
        info!("Launching headless Chrome...");
        let chrome_path = self.chrome_path.clone();

        let renderer = tokio::task::spawn_blocking(move || BrowserRenderer::launch(chrome_path))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))??;

        Ok(Box::new(renderer))
    }
}
