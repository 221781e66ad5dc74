use crate::crawler::queue::WorkQueue;
use crate::models::{CommunityLink, PropertyRecord};
use crate::pipeline::{extract_fields, parse_address, validate_record, Rejection};
use crate::scrapers::{Navigation, PageRenderer};
use crate::storage::{OutputTable, ProgressStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What happened to a single link. Every variant still marks the URL processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Complete record, appended to the output table
    Accepted(PropertyRecord),
    /// Page loaded but the data was incomplete
    Rejected(Rejection),
    /// Page could not be loaded or the row could not be written
    Failed(String),
}

/// Per-worker tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub processed: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl WorkerReport {
    pub fn record(&mut self, outcome: &LinkOutcome) {
        self.processed += 1;
        match outcome {
            LinkOutcome::Accepted(_) => self.accepted += 1,
            LinkOutcome::Rejected(_) => self.rejected += 1,
            LinkOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn add(&mut self, other: WorkerReport) {
        self.processed += other.processed;
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.failed += other.failed;
    }
}

/// Visits links one at a time with its own renderer
pub struct CrawlWorker {
    id: usize,
    renderer: Box<dyn PageRenderer>,
    table: Arc<OutputTable>,
    progress: Arc<ProgressStore>,
    navigation: Navigation,
    throttle: Duration,
}

impl CrawlWorker {
    pub fn new(
        id: usize,
        renderer: Box<dyn PageRenderer>,
        table: Arc<OutputTable>,
        progress: Arc<ProgressStore>,
        navigation: Navigation,
        throttle: Duration,
    ) -> Self {
        Self {
            id,
            renderer,
            table,
            progress,
            navigation,
            throttle,
        }
    }

    /// Drain the queue, recording progress after every link
    pub async fn run(self, queue: Arc<WorkQueue>) -> WorkerReport {
        info!("Worker {}: started ({})", self.id, self.renderer.backend_name());
        let mut report = WorkerReport::default();

        while let Some(link) = queue.next().await {
            let outcome = self.process(&link).await;
            report.record(&outcome);

            match &outcome {
                LinkOutcome::Accepted(_) => info!(
                    "Worker {}: ✓ Processed {} - {}",
                    self.id, report.processed, link.name
                ),
                LinkOutcome::Rejected(rejection) => warn!(
                    "Worker {}: ⚠️  Incomplete record skipped - {} ({})",
                    self.id, link.name, rejection
                ),
                LinkOutcome::Failed(reason) => error!(
                    "Worker {}: ✗ Error processing {}: {}",
                    self.id, link.name, reason
                ),
            }

            match self.record_progress(&link.source_url).await {
                Ok(total) => debug!("Worker {}: 📊 {} URLs processed", self.id, total),
                Err(e) => error!(
                    "Worker {}: could not record progress for {}: {:#}",
                    self.id, link.source_url, e
                ),
            }

            if !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }
        }

        info!(
            "Worker {}: Completed - {} processed ({} saved, {} incomplete, {} failed)",
            self.id, report.processed, report.accepted, report.rejected, report.failed
        );
        report
    }

    /// Fetch, extract, parse, validate and (if complete) persist one link
    pub async fn process(&self, link: &CommunityLink) -> LinkOutcome {
        let html = match self.renderer.render(&link.source_url, self.navigation).await {
            Ok(html) => html,
            Err(e) => return LinkOutcome::Failed(e.to_string()),
        };

        let content = extract_fields(&html);
        let address = parse_address(&content.raw_address);
        debug!(
            "Worker {}: {} -> address '{}', phone '{}'",
            self.id, link.name, content.raw_address, content.raw_phone
        );

        if let Err(rejection) = validate_record(&content, &address) {
            return LinkOutcome::Rejected(rejection);
        }

        let record = PropertyRecord::new(link, address, &content.raw_phone);
        let table = Arc::clone(&self.table);
        let row = record.clone();
        match tokio::task::spawn_blocking(move || table.append(&row)).await {
            Ok(Ok(())) => LinkOutcome::Accepted(record),
            Ok(Err(e)) => LinkOutcome::Failed(format!("{:#}", e)),
            Err(e) => LinkOutcome::Failed(e.to_string()),
        }
    }

    /// Merge one URL into the progress file off the async threads
    async fn record_progress(&self, url: &str) -> anyhow::Result<usize> {
        let progress = Arc::clone(&self.progress);
        let url = url.to_string();
        tokio::task::spawn_blocking(move || progress.merge([url])).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::RenderError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct StaticPages(HashMap<String, String>);

    #[async_trait]
    impl PageRenderer for StaticPages {
        async fn render(&self, url: &str, _navigation: Navigation) -> Result<String, RenderError> {
            self.0.get(url).cloned().ok_or_else(|| RenderError::Navigation {
                url: url.to_string(),
                message: "net::ERR_TIMED_OUT".to_string(),
            })
        }

        fn backend_name(&self) -> &'static str {
            "static"
        }
    }

    fn link(slug: &str, name: &str) -> CommunityLink {
        CommunityLink {
            origin_region: "Illinois".to_string(),
            name: name.to_string(),
            source_url: format!("https://example.com/{}", slug),
        }
    }

    fn worker(temp_dir: &TempDir) -> CrawlWorker {
        let pages = HashMap::from([
            (
                "https://example.com/complete".to_string(),
                r#"<html><body><p>123 Main St, Springfield, IL 62701</p>
                   <a href="tel:2175550100">Call</a></body></html>"#
                    .to_string(),
            ),
            (
                "https://example.com/no-phone".to_string(),
                "<html><body><p>123 Main St, Springfield, IL 62701</p></body></html>".to_string(),
            ),
        ]);
        let table = Arc::new(OutputTable::new(temp_dir.path().join("out.csv")));
        table.initialize().unwrap();
        let progress =
            Arc::new(ProgressStore::open(temp_dir.path().join("progress.json")).unwrap());

        CrawlWorker::new(
            1,
            Box::new(StaticPages(pages)),
            table,
            progress,
            Navigation::new(Duration::from_secs(1), Duration::ZERO),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_process_outcomes() {
        let temp_dir = TempDir::new().unwrap();
        let worker = worker(&temp_dir);

        match worker.process(&link("complete", "Oak Park")).await {
            LinkOutcome::Accepted(record) => {
                assert_eq!(record.street_address, "123 Main St");
                assert_eq!(record.city, "Springfield");
                assert_eq!(record.phone, "+1 217 555 0100");
                assert_eq!(record.email, "oakparkmgr@greystar.com");
            }
            other => panic!("expected accepted record, got {:?}", other),
        }

        assert!(matches!(
            worker.process(&link("no-phone", "No Phone")).await,
            LinkOutcome::Rejected(Rejection { ref missing }) if missing == &vec!["phone"]
        ));
        assert!(matches!(
            worker.process(&link("missing", "Gone")).await,
            LinkOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_run_marks_every_link() {
        let temp_dir = TempDir::new().unwrap();
        let worker = worker(&temp_dir);
        let table = worker.table.clone();
        let progress = worker.progress.clone();

        let links = vec![
            link("complete", "Oak Park"),
            link("no-phone", "No Phone"),
            link("missing", "Gone"),
        ];
        let queue = Arc::new(WorkQueue::new(links.clone()));
        let report = worker.run(queue.clone()).await;

        assert_eq!(
            report,
            WorkerReport {
                processed: 3,
                accepted: 1,
                rejected: 1,
                failed: 1
            }
        );
        assert!(queue.is_empty().await);
        assert_eq!(progress.len(), 3);
        for link in &links {
            assert!(progress.contains(&link.source_url));
        }
        assert_eq!(table.read_records().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_workers_share_files_across_threads() {
        let temp_dir = TempDir::new().unwrap();
        let first = worker(&temp_dir);
        let second = CrawlWorker::new(
            2,
            Box::new(StaticPages(HashMap::from([(
                "https://example.com/complete".to_string(),
                r#"<html><body><p>123 Main St, Springfield, IL 62701</p>
                   <a href="tel:2175550100">Call</a></body></html>"#
                    .to_string(),
            )]))),
            first.table.clone(),
            first.progress.clone(),
            Navigation::new(Duration::from_secs(1), Duration::ZERO),
            Duration::ZERO,
        );
        let table = first.table.clone();
        let progress = first.progress.clone();

        let links: Vec<CommunityLink> = (0..20)
            .map(|i| link(if i % 2 == 0 { "complete" } else { "missing" }, &format!("C{}", i)))
            .collect();
        let queue = Arc::new(WorkQueue::new(links));
        let (a, b) = tokio::join!(
            tokio::spawn(first.run(queue.clone())),
            tokio::spawn(second.run(queue.clone()))
        );

        let mut report = a.unwrap();
        report.add(b.unwrap());
        assert_eq!(report.processed, 20);
        assert_eq!(report.accepted, 10);
        assert_eq!(report.failed, 10);
        assert!(queue.is_empty().await);
        // Every link shares one of two URLs
        assert_eq!(progress.len(), 2);
        assert_eq!(table.read_records().unwrap().len(), 10);
    }
}
