//! Crawl a property directory, pull contact details from every community page
//! and keep a resumable CSV of the results.

pub mod config;
pub mod crawler;
pub mod models;
pub mod pipeline;
pub mod scrapers;
pub mod storage;

use tracing_subscriber::EnvFilter;

/// Log to stdout, honouring `RUST_LOG` and defaulting to `info`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
