use crate::models::PropertyRecord;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

pub const TABLE_HEADER: [&str; 8] = [
    "state_name",
    "communityName",
    "address",
    "city",
    "state_code",
    "zip",
    "phone",
    "email",
];

/// Column holding the phone number, the key used to compare batches
pub const PHONE_COLUMN: usize = 6;

/// Append-only CSV of accepted property records
pub struct OutputTable {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl OutputTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header row if the table does not exist yet.
    /// Returns true when a new table was created.
    pub fn initialize(&self) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let has_content = std::fs::metadata(&self.path)
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);
        if has_content {
            return Ok(false);
        }

        let header = encode_row(&TABLE_HEADER)?;
        std::fs::write(&self.path, header)
            .with_context(|| format!("Failed to create table {}", self.path.display()))?;
        info!("✓ Initialized output table {}", self.path.display());
        Ok(true)
    }

    /// Append one record as a single line
    pub fn append(&self, record: &PropertyRecord) -> Result<()> {
        let line = encode_row(&[
            &record.origin_region,
            &record.name,
            &record.street_address,
            &record.city,
            &record.region_code,
            &record.postal_code,
            &record.phone,
            &record.email,
        ])?;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open table {}", self.path.display()))?;
        file.write_all(&line)
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;

        debug!("Appended row for {}", record.name);
        Ok(())
    }

    /// Read back every data row
    pub fn read_records(&self) -> Result<Vec<PropertyRecord>> {
        let mut reader = ReaderBuilder::new()
            .from_path(&self.path)
            .with_context(|| format!("Failed to open table {}", self.path.display()))?;

        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row.context("Malformed table row")?);
        }
        Ok(records)
    }
}

fn encode_row<I, T>(fields: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to encode CSV row: {}", e.error()))
}

/// Counts reported by [`filter_unseen`]
#[derive(Debug, Clone)]
pub struct DedupSummary {
    pub current_rows: usize,
    pub previous_rows: usize,
    pub shared: usize,
    pub unique: Vec<StringRecord>,
}

/// Write to `output` the rows of `current` whose phone number never appears in
/// `previous`. Rows with fewer than seven columns are dropped.
pub fn filter_unseen(current: &Path, previous: &Path, output: &Path) -> Result<DedupSummary> {
    let previous_rows = read_rows(previous)?;
    let seen: HashSet<String> = previous_rows
        .iter()
        .filter_map(|row| row.get(PHONE_COLUMN))
        .map(|phone| phone.trim().to_string())
        .filter(|phone| !phone.is_empty())
        .collect();

    let (header, current_rows) = read_with_header(current)?;
    let mut shared = 0;
    let mut unique = Vec::new();
    for row in &current_rows {
        let Some(phone) = row.get(PHONE_COLUMN) else {
            continue;
        };
        if seen.contains(phone.trim()) {
            shared += 1;
        } else {
            unique.push(row.clone());
        }
    }

    let mut writer = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_path(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    writer.write_record(&header)?;
    for row in &unique {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(DedupSummary {
        current_rows: current_rows.len(),
        previous_rows: previous_rows.len(),
        shared,
        unique,
    })
}

fn read_rows(path: &Path) -> Result<Vec<StringRecord>> {
    Ok(read_with_header(path)?.1)
}

fn read_with_header(path: &Path) -> Result<(StringRecord, Vec<StringRecord>)> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let header = reader.headers()?.clone();
    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("Malformed row in {}", path.display()))?;
        if row.iter().any(|field| !field.trim().is_empty()) {
            rows.push(row);
        }
    }
    Ok((header, rows))
}
