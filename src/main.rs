use community_scout::config::Config;
use community_scout::crawler::Orchestrator;
use community_scout::scrapers::renderer_factory;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    community_scout::init_tracing();

    info!("🏢 Community Scout - Property Directory Crawler");
    info!("================================================");

    let config = Config::from_env()?;
    info!(
        "Directory: {} ({} workers, {:?} renderer)",
        config.directory_url, config.workers, config.renderer
    );

    let orchestrator = Orchestrator::new(config.clone(), renderer_factory(&config));

    // Fatal errors are reported, not turned into a failing exit status
    match orchestrator.run().await {
        Ok(report) => {
            info!("");
            info!("📋 Summary");
            info!("   Links in directory:  {}", report.total_links);
            info!("   Already processed:   {}", report.already_processed);
            info!("   Processed this run:  {}", report.session.processed);
            info!("   Saved to table:      {}", report.session.accepted);
            info!("   Incomplete:          {}", report.session.rejected);
            info!("   Failed:              {}", report.session.failed);
            info!("💾 Results in {}", config.table_file.display());
        }
        Err(e) => error!("❌ Fatal error: {:#}", e),
    }

    Ok(())
}
