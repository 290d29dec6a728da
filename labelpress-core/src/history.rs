//! Dispatch history ledger
//!
//! CSV-backed record store, one line per dispatch attempt. The ledger is
//! the only writer of its file. Appends are a single write of one encoded
//! line; deletions and clears rewrite through a temp file in the same
//! directory and atomically replace the live file, so concurrent readers
//! never observe a half-written store.
//!
//! Record ids are timestamp-derived: the epoch milliseconds of the record's
//! timestamp, bumped past the newest stored id on collision. Ids therefore
//! stay unique and strictly increasing within one ledger file.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

pub type RecordId = i64;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const HEADER: [&str; 5] = ["Timestamp", "SKU", "Quantity", "Printer", "Status"];

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger format error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed ledger row: {0}")]
    BadRow(String),

    #[error("failed to replace ledger file: {0}")]
    Replace(#[from] tempfile::PersistError),
}

pub type HistoryResult<T> = Result<T, HistoryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Success,
    Failure,
}

/// One completed (or failed) dispatch attempt. Created exactly once per
/// attempt, never edited in place; removal is whole-record only.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecord {
    pub id: RecordId,
    pub timestamp: DateTime<Local>,
    pub identifier: String,
    pub quantity: u32,
    pub printer: String,
    pub status: JobStatus,
    pub detail: Option<String>,
}

/// On-disk row shape; the status column folds the optional detail in after
/// a `: ` separator.
#[derive(Debug, Serialize, Deserialize)]
struct Row {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "SKU")]
    sku: String,
    #[serde(rename = "Quantity")]
    quantity: u32,
    #[serde(rename = "Printer")]
    printer: String,
    #[serde(rename = "Status")]
    status: String,
}

impl HistoryRecord {
    fn to_row(&self) -> Row {
        let status = match (&self.status, &self.detail) {
            (JobStatus::Success, None) => "success".to_string(),
            (JobStatus::Success, Some(detail)) => format!("success: {detail}"),
            (JobStatus::Failure, None) => "failure".to_string(),
            (JobStatus::Failure, Some(detail)) => format!("failure: {detail}"),
        };
        Row {
            timestamp: self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            sku: self.identifier.clone(),
            quantity: self.quantity,
            printer: self.printer.clone(),
            status,
        }
    }

    fn from_row(row: Row) -> HistoryResult<Self> {
        let naive = NaiveDateTime::parse_from_str(&row.timestamp, TIMESTAMP_FORMAT)
            .map_err(|e| HistoryError::BadRow(format!("bad timestamp '{}': {e}", row.timestamp)))?;
        let timestamp = Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| HistoryError::BadRow(format!("unmappable timestamp '{}'", row.timestamp)))?;

        let (status, detail) = parse_status(&row.status)?;

        Ok(Self {
            id: timestamp.timestamp_millis(),
            timestamp,
            identifier: row.sku,
            quantity: row.quantity,
            printer: row.printer,
            status,
            detail,
        })
    }
}

fn parse_status(raw: &str) -> HistoryResult<(JobStatus, Option<String>)> {
    let (head, detail) = match raw.split_once(": ") {
        Some((head, detail)) => (head, Some(detail.to_string())),
        None => (raw, None),
    };
    match head {
        "success" => Ok((JobStatus::Success, detail)),
        "failure" => Ok((JobStatus::Failure, detail)),
        _ => Err(HistoryError::BadRow(format!("unknown status '{raw}'"))),
    }
}

#[derive(Debug, Clone)]
pub struct HistoryLedger {
    path: PathBuf,
}

impl HistoryLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record with a wall-clock timestamp taken now (dispatch
    /// completion time). Returns the stored record.
    pub fn append(
        &self,
        status: JobStatus,
        identifier: &str,
        quantity: u32,
        printer: &str,
        detail: Option<String>,
    ) -> HistoryResult<HistoryRecord> {
        let timestamp = self.next_timestamp()?;
        let record = HistoryRecord {
            id: timestamp.timestamp_millis(),
            timestamp,
            identifier: identifier.to_string(),
            quantity,
            printer: printer.to_string(),
            status,
            detail,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let mut encoded: Vec<u8> = Vec::new();
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut encoded);
            if needs_header {
                writer.write_record(HEADER)?;
            }
            writer.serialize(record.to_row())?;
            writer.flush()?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&encoded)?;

        debug!(record_id = record.id, sku = %record.identifier, "history record appended");
        Ok(record)
    }

    /// Wall clock, truncated to milliseconds and bumped past the newest
    /// stored record so ids never collide.
    fn next_timestamp(&self) -> HistoryResult<DateTime<Local>> {
        let now = Local::now();
        let mut millis = now.timestamp_millis();
        if let Some(newest) = self.read_all()?.last().map(|record| record.id) {
            if millis <= newest {
                millis = newest + 1;
            }
        }
        Ok(DateTime::<Utc>::from_timestamp_millis(millis)
            .map(|utc| utc.with_timezone(&Local))
            .unwrap_or(now))
    }

    /// All records in insertion order (file order).
    fn read_all(&self) -> HistoryResult<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<Row>() {
            records.push(HistoryRecord::from_row(row?)?);
        }
        Ok(records)
    }

    /// All records, newest first. Descending by timestamp; equal timestamps
    /// keep the later insertion first.
    pub fn list(&self) -> HistoryResult<Vec<HistoryRecord>> {
        let mut records = self.read_all()?;
        records.reverse();
        // stable sort keeps the reversed insertion order on ties
        records.sort_by_key(|record| std::cmp::Reverse(record.id));
        Ok(records)
    }

    pub fn get(&self, id: RecordId) -> HistoryResult<Option<HistoryRecord>> {
        Ok(self.read_all()?.into_iter().find(|record| record.id == id))
    }

    /// Remove exactly one record. Unknown ids are a no-op.
    pub fn delete(&self, id: RecordId) -> HistoryResult<bool> {
        let records = self.read_all()?;
        let before = records.len();
        let kept: Vec<HistoryRecord> = records
            .into_iter()
            .filter(|record| record.id != id)
            .collect();

        if kept.len() == before {
            debug!(record_id = id, "delete: no such record");
            return Ok(false);
        }

        self.rewrite(&kept)?;
        info!(record_id = id, "history record deleted");
        Ok(true)
    }

    /// Remove all records, leaving only the header. Irreversible.
    pub fn clear(&self) -> HistoryResult<()> {
        self.rewrite(&[])?;
        info!("history cleared");
        Ok(())
    }

    fn rewrite(&self, records: &[HistoryRecord]) -> HistoryResult<()> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(tmp.as_file_mut());
            writer.write_record(HEADER)?;
            for record in records {
                writer.serialize(record.to_row())?;
            }
            writer.flush()?;
        }
        tmp.persist(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_in(dir: &Path) -> HistoryLedger {
        HistoryLedger::new(dir.join("print_log.csv"))
    }

    fn append_success(ledger: &HistoryLedger, sku: &str, quantity: u32) -> HistoryRecord {
        ledger
            .append(JobStatus::Success, sku, quantity, "LabelPrinter1", None)
            .unwrap()
    }

    #[test]
    fn append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(dir.path());

        append_success(&ledger, "ABC123", 3);
        append_success(&ledger, "DEF456", 1);

        let text = fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(text.matches("Timestamp,SKU,Quantity,Printer,Status").count(), 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn list_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(dir.path());

        let first = append_success(&ledger, "ONE", 1);
        let second = append_success(&ledger, "TWO", 2);

        let records = ledger.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, second.id);
        assert_eq!(records[1].id, first.id);
    }

    #[test]
    fn rapid_appends_get_strictly_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(dir.path());

        let ids: Vec<RecordId> = (0..5)
            .map(|i| append_success(&ledger, "ABC123", i + 1).id)
            .collect();

        for window in ids.windows(2) {
            assert!(window[1] > window[0], "ids not increasing: {ids:?}");
        }
    }

    #[test]
    fn detail_round_trips_through_the_status_column() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(dir.path());

        let detail = "printer 'X' rejected copy 2 of 5: exit 1, see log\nsecond line";
        ledger
            .append(
                JobStatus::Failure,
                "ABC123",
                5,
                "LabelPrinter1",
                Some(detail.to_string()),
            )
            .unwrap();

        let records = ledger.list().unwrap();
        assert_eq!(records[0].status, JobStatus::Failure);
        assert_eq!(records[0].detail.as_deref(), Some(detail));
    }

    #[test]
    fn delete_removes_exactly_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(dir.path());

        let first = append_success(&ledger, "ONE", 1);
        let second = append_success(&ledger, "TWO", 2);

        assert!(ledger.delete(first.id).unwrap());
        let records = ledger.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, second.id);
    }

    #[test]
    fn delete_unknown_id_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(dir.path());
        append_success(&ledger, "ONE", 1);

        assert!(!ledger.delete(42).unwrap());
        assert_eq!(ledger.list().unwrap().len(), 1);
    }

    #[test]
    fn clear_leaves_an_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(dir.path());
        append_success(&ledger, "ONE", 1);
        append_success(&ledger, "TWO", 2);

        ledger.clear().unwrap();
        assert!(ledger.list().unwrap().is_empty());

        // still appendable afterwards
        append_success(&ledger, "THREE", 3);
        assert_eq!(ledger.list().unwrap().len(), 1);
    }

    #[test]
    fn missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(dir.path());
        assert!(ledger.list().unwrap().is_empty());
    }

    #[test]
    fn status_parsing_rejects_garbage() {
        assert!(parse_status("printed").is_err());
        assert_eq!(
            parse_status("success").unwrap(),
            (JobStatus::Success, None)
        );
        let (status, detail) = parse_status("failure: a: b").unwrap();
        assert_eq!(status, JobStatus::Failure);
        assert_eq!(detail.as_deref(), Some("a: b"));
    }
}
