use std::time::Duration;
use thiserror::Error;

/// How long to wait for a page, and how long to let it settle once loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub timeout: Duration,
    pub settle: Duration,
}

impl Navigation {
    pub fn new(timeout: Duration, settle: Duration) -> Self {
        Self { timeout, settle }
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to start renderer: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Could not read rendered document from {url}: {message}")]
    Document { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Renderer task failed: {0}")]
    Task(String),
}
