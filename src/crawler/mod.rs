//! Worker pool that visits community pages and records what it found.

pub mod orchestrator;
pub mod queue;
pub mod worker;

pub use orchestrator::{unique_links, CrawlReport, Orchestrator};
pub use queue::WorkQueue;
pub use worker::{CrawlWorker, LinkOutcome, WorkerReport};
