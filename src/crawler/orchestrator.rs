use crate::config::Config;
use crate::crawler::queue::WorkQueue;
use crate::crawler::worker::{CrawlWorker, WorkerReport};
use crate::models::CommunityLink;
use crate::scrapers::{discover_links, Navigation, RendererFactory};
use crate::storage::{LinkCache, OutputTable, ProgressStore};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Totals for one crawl session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub total_links: usize,
    pub already_processed: usize,
    pub remaining: usize,
    /// Workers whose renderer launched; at most `min(workers, remaining)`
    pub workers: usize,
    pub session: WorkerReport,
}

/// Drives a whole session: links, progress, worker pool, report
pub struct Orchestrator {
    config: Config,
    factory: Arc<dyn RendererFactory>,
}

impl Orchestrator {
    pub fn new(config: Config, factory: Arc<dyn RendererFactory>) -> Self {
        Self { config, factory }
    }

    pub async fn run(&self) -> Result<CrawlReport> {
        let links = unique_links(self.load_or_discover_links().await?);

        let progress = Arc::new(
            ProgressStore::open(&self.config.progress_file)
                .context("Failed to open progress file")?,
        );
        let processed = progress.processed();
        if processed.is_empty() {
            info!("No previous progress, starting from scratch...");
        } else {
            info!("Previous progress: {} URLs already processed", processed.len());
        }

        let remaining: Vec<CommunityLink> = links
            .iter()
            .filter(|link| !processed.contains(&link.source_url))
            .cloned()
            .collect();

        let mut report = CrawlReport {
            total_links: links.len(),
            already_processed: links.len() - remaining.len(),
            remaining: remaining.len(),
            ..CrawlReport::default()
        };
        info!("Total links: {}", report.total_links);
        info!("Already processed: {}", report.already_processed);
        info!("Remaining: {}", report.remaining);

        if remaining.is_empty() {
            info!("✓ All links have already been processed!");
            return Ok(report);
        }

        let table = Arc::new(OutputTable::new(&self.config.table_file));
        table.initialize().context("Failed to initialize output table")?;

        let pool_size = self.config.workers.min(remaining.len());
        info!(
            "Processing {} communities with {} parallel workers...",
            remaining.len(),
            pool_size
        );

        let queue = Arc::new(WorkQueue::new(remaining));
        let navigation = Navigation::new(self.config.page_timeout, self.config.settle_delay);

        let handles: Vec<_> = (0..pool_size)
            .map(|id| {
                let factory = Arc::clone(&self.factory);
                let queue = Arc::clone(&queue);
                let table = Arc::clone(&table);
                let progress = Arc::clone(&progress);
                let throttle = self.config.throttle_delay;

                tokio::spawn(async move {
                    let renderer = match factory.launch().await {
                        Ok(renderer) => renderer,
                        Err(e) => {
                            error!("Worker {}: could not start: {}", id, e);
                            return None;
                        }
                    };
                    let worker =
                        CrawlWorker::new(id, renderer, table, progress, navigation, throttle);
                    Some(worker.run(queue).await)
                })
            })
            .collect();

        for result in join_all(handles).await {
            match result {
                Ok(Some(worker_report)) => {
                    report.workers += 1;
                    report.session.add(worker_report);
                }
                Ok(None) => {}
                Err(e) => error!("Worker task aborted: {}", e),
            }
        }

        if report.workers < pool_size {
            warn!("Only {} of {} workers started", report.workers, pool_size);
        }

        let left = queue.len().await;
        if left > 0 {
            warn!("{} links were not visited; run again to resume", left);
        }

        info!(
            "✓ Done! {} communities processed this session ({} saved, {} incomplete, {} failed)",
            report.session.processed,
            report.session.accepted,
            report.session.rejected,
            report.session.failed
        );
        Ok(report)
    }

    /// Use the cached link set when there is one, otherwise discover and cache it
    async fn load_or_discover_links(&self) -> Result<Vec<CommunityLink>> {
        let cache = LinkCache::new(&self.config.links_file);

        if cache.exists() {
            info!("Link cache found, loading {}...", cache.path().display());
            match cache.load() {
                Ok(links) if !links.is_empty() => return Ok(links),
                Ok(_) => warn!("Link cache is empty, rediscovering links"),
                Err(e) => warn!("{:#}; rediscovering links", e),
            }
        } else {
            info!("No link cache, discovering links...");
        }

        let renderer = self
            .factory
            .launch()
            .await
            .context("Failed to start renderer for link discovery")?;
        let navigation =
            Navigation::new(self.config.discovery_timeout, self.config.discovery_settle);
        let links = discover_links(renderer.as_ref(), &self.config.directory_url, navigation)
            .await
            .context("Link discovery failed")?;
        drop(renderer);

        if let Err(e) = cache.save(&links) {
            error!("Failed to save link cache: {:#}", e);
        }
        Ok(links)
    }
}

/// Drop repeated URLs, keeping the first occurrence
pub fn unique_links(links: Vec<CommunityLink>) -> Vec<CommunityLink> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.source_url.clone()))
        .collect()
}
