//! Files shared by all workers: the link cache, the progress record and the
//! output table.

pub mod links;
pub mod progress;
pub mod table;

pub use links::LinkCache;
pub use progress::ProgressStore;
pub use table::{filter_unseen, DedupSummary, OutputTable, PHONE_COLUMN, TABLE_HEADER};
