//! Keep only the rows of the latest table whose phone number was not in the
//! previous batch.

use community_scout::config::Config;
use community_scout::storage::{filter_unseen, PHONE_COLUMN};
use tracing::{error, info};

const SAMPLE_ROWS: usize = 5;

fn main() -> anyhow::Result<()> {
    community_scout::init_tracing();

    let config = Config::from_env()?;
    info!(
        "Comparing {} against {}...",
        config.table_file.display(),
        config.previous_table_file.display()
    );

    match filter_unseen(
        &config.table_file,
        &config.previous_table_file,
        &config.batch_table_file,
    ) {
        Ok(summary) => {
            info!("Rows in current table:  {}", summary.current_rows);
            info!("Rows in previous table: {}", summary.previous_rows);
            info!("Already seen:           {}", summary.shared);
            info!("New rows:               {}", summary.unique.len());
            info!("💾 Saved to {}", config.batch_table_file.display());

            for row in summary.unique.iter().take(SAMPLE_ROWS) {
                info!(
                    "   {} - {}",
                    row.get(1).unwrap_or_default(),
                    row.get(PHONE_COLUMN).unwrap_or_default()
                );
            }
        }
        Err(e) => error!("❌ Could not build batch: {:#}", e),
    }

    Ok(())
}
