//! Ledger store - the durable, append-only record log.
//!
//! All users share one CSV file with a fixed header. Reads and purges scan the
//! whole file, which is fine for the volume a personal ledger bot sees. Within a
//! process the store is shared as a [`SharedLedger`]; nothing coordinates
//! separate processes writing the same file, so the last write wins.

use crate::{
    entities::{Kind, Record},
    errors::{Error, Result},
};
use chrono::{Local, NaiveDateTime, Timelike};
use std::{
    ffi::OsString,
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{debug, info, instrument, warn};

/// Column names of the log, in file order.
pub const HEADER: [&str; 5] = ["user_id", "kind", "amount", "description", "timestamp"];

/// Source of record timestamps.
pub trait Clock {
    /// Current naive local time.
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the process's local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Ledger handle shared by all command handlers.
pub type SharedLedger = Arc<Mutex<CsvLedger>>;

/// Locks a shared ledger, turning a poisoned lock into a storage error.
pub fn lock_ledger(ledger: &SharedLedger) -> Result<MutexGuard<'_, CsvLedger>> {
    ledger.lock().map_err(|_| Error::Persistence {
        message: "Failed to acquire ledger lock".to_string(),
    })
}

/// Flat CSV record log.
#[derive(Debug)]
pub struct CsvLedger<C = SystemClock> {
    path: PathBuf,
    clock: C,
    last_timestamp: Option<NaiveDateTime>,
}

impl CsvLedger<SystemClock> {
    /// Opens (lazily) the log at `path`, stamping records with the system clock.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, SystemClock)
    }

    /// Wraps the ledger for sharing between handlers.
    #[must_use]
    pub fn into_shared(self) -> SharedLedger {
        Arc::new(Mutex::new(self))
    }
}

impl<C: Clock> CsvLedger<C> {
    /// Opens (lazily) the log at `path` with a custom timestamp source.
    pub fn with_clock(path: impl Into<PathBuf>, clock: C) -> Self {
        Self {
            path: path.into(),
            clock,
            last_timestamp: None,
        }
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the log with its header if it does not exist yet. Safe to call repeatedly.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn init(&self) -> Result<()> {
        let mut writer = self.open_for_append()?;
        writer.flush()?;
        Ok(())
    }

    /// Writes a new record stamped with the current time and returns it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Persistence` if the log cannot be created, opened or written.
    #[instrument(skip(self, description), fields(path = %self.path.display()))]
    pub fn append(
        &mut self,
        user_id: &str,
        kind: Kind,
        amount: u64,
        description: Option<&str>,
    ) -> Result<Record> {
        let mut writer = self.open_for_append()?;
        let record = Record::new(user_id, kind, amount, description, self.next_timestamp());

        writer.serialize(&record)?;
        writer.flush()?;

        info!(
            "Appended {} of {} for user_id {} at {}",
            record.kind, record.amount, record.user_id, record.timestamp
        );
        Ok(record)
    }

    /// All records of `user_id`, in the order they were written.
    ///
    /// A missing or header-only log yields an empty list.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self, user_id: &str) -> Result<Vec<Record>> {
        let records = self.scan(|record| record.user_id == user_id)?;
        debug!("Read {} records for user_id {}", records.len(), user_id);
        Ok(records)
    }

    /// Removes every record of `user_id` and returns how many were removed.
    ///
    /// Other users' records keep their content and relative order. The log is
    /// rewritten to a temporary file which then replaces the original.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn purge(&mut self, user_id: &str) -> Result<usize> {
        let mut removed = 0;
        let kept = self.scan(|record| {
            if record.user_id == user_id {
                removed += 1;
                false
            } else {
                true
            }
        })?;

        if removed == 0 {
            debug!("Nothing to purge for user_id {}", user_id);
            return Ok(0);
        }

        let tmp_path = self.tmp_path();
        let replaced = write_log(&tmp_path, &kept)
            .and_then(|()| fs::rename(&tmp_path, &self.path).map_err(Error::from));
        if let Err(e) = replaced {
            match fs::remove_file(&tmp_path) {
                Ok(()) => {}
                Err(cleanup) if cleanup.kind() == ErrorKind::NotFound => {}
                Err(cleanup) => warn!("Failed to remove {}: {}", tmp_path.display(), cleanup),
            }
            return Err(e);
        }

        info!(
            "Purged {} records for user_id {} ({} records from other users kept)",
            removed,
            user_id,
            kept.len()
        );
        Ok(removed)
    }

    /// The log file exactly as stored, or nothing if it was never created.
    pub fn raw_log(&self) -> Result<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn next_timestamp(&mut self) -> NaiveDateTime {
        let now = self.clock.now();
        let now = now.with_nanosecond(0).unwrap_or(now);
        let timestamp = self.last_timestamp.map_or(now, |last| {
            if now < last {
                warn!("Clock went backwards ({} < {}), reusing last timestamp", now, last);
            }
            now.max(last)
        });
        self.last_timestamp = Some(timestamp);
        timestamp
    }

    /// Opens the log for appending, writing the header into a new file.
    ///
    /// An existing log must carry the expected header, otherwise nothing is
    /// written. A last line missing its terminator gets one first.
    fn open_for_append(&self) -> Result<csv::Writer<File>> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)?;
        let is_new = file.metadata()?.len() == 0;

        if !is_new {
            self.check_header(csv::Reader::from_reader(&file).headers()?)?;

            let mut last = [0_u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                warn!("Ledger log {} lacks a final newline, adding one", self.path.display());
                file.write_all(b"\n")?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            info!("Creating ledger log at {}", self.path.display());
            writer.write_record(HEADER)?;
        }
        Ok(writer)
    }

    fn scan<F>(&self, mut keep: F) -> Result<Vec<Record>>
    where
        F: FnMut(&Record) -> bool,
    {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::Reader::from_reader(file);
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        self.check_header(&headers)?;

        let mut records = Vec::new();
        for row in reader.deserialize::<Record>() {
            let record = row?;
            if keep(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn check_header(&self, headers: &csv::StringRecord) -> Result<()> {
        if headers.iter().ne(HEADER) {
            return Err(Error::Persistence {
                message: format!(
                    "Unexpected header in {}: {:?}",
                    self.path.display(),
                    headers.iter().collect::<Vec<_>>()
                ),
            });
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// Writes a complete log (header plus `records`) to `path`, replacing any file there.
fn write_log(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{init_test_tracing, setup_test_ledger, ts};
    use chrono::Duration;

    #[test]
    fn test_append_creates_log_with_header() -> Result<()> {
        init_test_tracing();
        let (_dir, mut ledger, _clock) = setup_test_ledger()?;
        assert!(!ledger.path().exists());

        ledger.append("42", Kind::Expense, 400, Some("food"))?;

        let contents = fs::read_to_string(ledger.path())?;
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "user_id,kind,amount,description,timestamp");
        assert_eq!(lines[1], "42,expense,400,food,2024-03-05 12:30:00");
        assert_eq!(lines.len(), 2);
        Ok(())
    }

    #[test]
    fn test_init_is_idempotent() -> Result<()> {
        let (_dir, mut ledger, _clock) = setup_test_ledger()?;
        ledger.init()?;
        ledger.init()?;
        ledger.append("1", Kind::Income, 10, None)?;
        ledger.init()?;

        let contents = fs::read_to_string(ledger.path())?;
        assert_eq!(contents.matches("user_id,kind").count(), 1);
        assert_eq!(ledger.read("1")?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_append_creates_parent_directories() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("nested").join("deeper").join("ledger.csv");
        let mut ledger = CsvLedger::new(&path);

        ledger.append("7", Kind::Income, 1, None)?;

        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_read_returns_only_own_records_in_append_order() -> Result<()> {
        let (_dir, mut ledger, clock) = setup_test_ledger()?;
        let first = ledger.append("u", Kind::Income, 1000, Some("salary"))?;
        ledger.append("other", Kind::Expense, 5, Some("coffee"))?;
        clock.advance(Duration::minutes(5));
        let second = ledger.append("u", Kind::Expense, 400, Some("food"))?;
        ledger.append("other", Kind::Income, 9, None)?;
        let third = ledger.append("u", Kind::Expense, 1, None)?;

        let records = ledger.read("u")?;

        assert_eq!(records, vec![first, second, third]);
        assert!(records.iter().all(|r| r.user_id == "u"));
        Ok(())
    }

    #[test]
    fn test_read_missing_log_is_empty_and_creates_nothing() -> Result<()> {
        let (_dir, ledger, _clock) = setup_test_ledger()?;
        assert!(ledger.read("nobody")?.is_empty());
        assert!(!ledger.path().exists());
        Ok(())
    }

    #[test]
    fn test_read_header_only_log_is_empty() -> Result<()> {
        let (_dir, ledger, _clock) = setup_test_ledger()?;
        ledger.init()?;
        assert!(ledger.read("nobody")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_read_empty_file_is_empty() -> Result<()> {
        let (_dir, ledger, _clock) = setup_test_ledger()?;
        fs::write(ledger.path(), "")?;
        assert!(ledger.read("nobody")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_read_is_idempotent() -> Result<()> {
        let (_dir, mut ledger, _clock) = setup_test_ledger()?;
        ledger.append("u", Kind::Income, 3, None)?;
        ledger.append("u", Kind::Expense, 2, None)?;

        assert_eq!(ledger.read("u")?, ledger.read("u")?);
        Ok(())
    }

    #[test]
    fn test_description_with_separators_survives() -> Result<()> {
        let (_dir, mut ledger, _clock) = setup_test_ledger()?;
        let written = ledger.append("u", Kind::Expense, 15, Some("rice, \"special\"\nextra"))?;

        let read = ledger.read("u")?;
        assert_eq!(read, vec![written]);
        assert_eq!(read[0].description, "rice, \"special\"\nextra");
        Ok(())
    }

    #[test]
    fn test_purge_removes_all_and_only_that_user() -> Result<()> {
        let (_dir, mut ledger, _clock) = setup_test_ledger()?;
        let a1 = ledger.append("a", Kind::Income, 1, None)?;
        ledger.append("b", Kind::Income, 2, None)?;
        let a2 = ledger.append("a", Kind::Expense, 3, None)?;
        ledger.append("b", Kind::Expense, 4, None)?;
        let c1 = ledger.append("c", Kind::Income, 5, None)?;

        let removed = ledger.purge("b")?;

        assert_eq!(removed, 2);
        assert!(ledger.read("b")?.is_empty());
        assert_eq!(ledger.read("a")?, vec![a1, a2]);
        assert_eq!(ledger.read("c")?, vec![c1]);
        assert!(!ledger.tmp_path().exists());
        Ok(())
    }

    #[test]
    fn test_purge_last_user_keeps_header() -> Result<()> {
        let (_dir, mut ledger, _clock) = setup_test_ledger()?;
        ledger.append("only", Kind::Income, 1, None)?;

        assert_eq!(ledger.purge("only")?, 1);

        let contents = fs::read_to_string(ledger.path())?;
        assert_eq!(contents.trim_end(), "user_id,kind,amount,description,timestamp");
        ledger.append("only", Kind::Income, 2, None)?;
        assert_eq!(ledger.read("only")?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_purge_unknown_user_or_missing_log() -> Result<()> {
        let (_dir, mut ledger, _clock) = setup_test_ledger()?;
        assert_eq!(ledger.purge("ghost")?, 0);
        assert!(!ledger.path().exists());

        ledger.append("a", Kind::Income, 1, None)?;
        assert_eq!(ledger.purge("ghost")?, 0);
        assert_eq!(ledger.read("a")?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_timestamps_never_go_backwards() -> Result<()> {
        let (_dir, mut ledger, clock) = setup_test_ledger()?;
        let first = ledger.append("u", Kind::Income, 1, None)?;

        clock.set(ts(2024, 3, 1, 0, 0, 0));
        let second = ledger.append("u", Kind::Income, 1, None)?;
        assert_eq!(second.timestamp, first.timestamp);

        clock.set(ts(2024, 3, 6, 9, 0, 0));
        let third = ledger.append("u", Kind::Income, 1, None)?;
        assert_eq!(third.timestamp, ts(2024, 3, 6, 9, 0, 0));
        Ok(())
    }

    #[test]
    fn test_timestamps_truncated_to_seconds() -> Result<()> {
        let (_dir, mut ledger, clock) = setup_test_ledger()?;
        clock.set(ts(2024, 3, 5, 12, 30, 0) + Duration::milliseconds(750));

        let record = ledger.append("u", Kind::Income, 1, None)?;

        assert_eq!(record.timestamp, ts(2024, 3, 5, 12, 30, 0));
        assert_eq!(ledger.read("u")?, vec![record]);
        Ok(())
    }

    #[test]
    fn test_unknown_kind_in_log_fails_read() -> Result<()> {
        let (_dir, ledger, _clock) = setup_test_ledger()?;
        fs::write(
            ledger.path(),
            "user_id,kind,amount,description,timestamp\n1,transfer,10,-,2024-01-01 00:00:00\n",
        )?;

        let err = ledger.read("1").unwrap_err();
        assert!(matches!(err, Error::Persistence { .. }));
        assert!(err.to_string().contains("Invalid transaction kind 'transfer'"));
        Ok(())
    }

    #[test]
    fn test_negative_amount_in_log_fails_read() -> Result<()> {
        let (_dir, ledger, _clock) = setup_test_ledger()?;
        fs::write(
            ledger.path(),
            "user_id,kind,amount,description,timestamp\n1,income,-10,-,2024-01-01 00:00:00\n",
        )?;

        assert!(matches!(ledger.read("1"), Err(Error::Persistence { .. })));
        Ok(())
    }

    #[test]
    fn test_unexpected_header_fails_read() -> Result<()> {
        let (_dir, ledger, _clock) = setup_test_ledger()?;
        fs::write(
            ledger.path(),
            "user_id,tipe,jumlah,deskripsi,tanggal\n1,pemasukan,10,-,2024-01-01 00:00:00\n",
        )?;

        let err = ledger.read("1").unwrap_err();
        assert!(matches!(err, Error::Persistence { .. }));
        assert!(err.to_string().contains("Unexpected header"));
        Ok(())
    }

    #[test]
    fn test_foreign_header_blocks_writes() -> Result<()> {
        let (_dir, mut ledger, _clock) = setup_test_ledger()?;
        let foreign = "user_id,tipe,jumlah,deskripsi,tanggal\n1,pemasukan,10,-,2024-01-01 00:00:00\n";
        fs::write(ledger.path(), foreign)?;

        assert!(matches!(ledger.init(), Err(Error::Persistence { .. })));
        let err = ledger.append("1", Kind::Income, 5, None).unwrap_err();
        assert!(err.to_string().contains("Unexpected header"));

        assert_eq!(fs::read_to_string(ledger.path())?, foreign);
        Ok(())
    }

    #[test]
    fn test_append_after_unterminated_last_line() -> Result<()> {
        let (_dir, mut ledger, _clock) = setup_test_ledger()?;
        fs::write(
            ledger.path(),
            "user_id,kind,amount,description,timestamp\n1,income,10,-,2024-01-01 00:00:00",
        )?;

        let written = ledger.append("2", Kind::Expense, 5, None)?;

        let contents = fs::read_to_string(ledger.path())?;
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[1], "1,income,10,-,2024-01-01 00:00:00");
        assert_eq!(lines[2], "2,expense,5,-,2024-03-05 12:30:00");
        assert_eq!(ledger.read("1")?.len(), 1);
        assert_eq!(ledger.read("2")?, vec![written]);
        Ok(())
    }

    #[test]
    fn test_unterminated_header_only_log_accepts_append() -> Result<()> {
        let (_dir, mut ledger, _clock) = setup_test_ledger()?;
        fs::write(ledger.path(), "user_id,kind,amount,description,timestamp")?;

        ledger.append("1", Kind::Income, 3, None)?;

        assert_eq!(ledger.read("1")?.len(), 1);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_purge_cleans_up_temp_file() -> Result<()> {
        let (dir, mut ledger, _clock) = setup_test_ledger()?;
        let kept = ledger.append("a", Kind::Income, 1, None)?;
        ledger.append("b", Kind::Income, 2, None)?;
        let before = fs::read(ledger.path())?;
        // The temp file cannot be created through a link into a missing directory
        std::os::unix::fs::symlink(dir.path().join("missing").join("log"), ledger.tmp_path())?;

        assert!(matches!(ledger.purge("b"), Err(Error::Persistence { .. })));

        assert!(fs::symlink_metadata(ledger.tmp_path()).is_err());
        assert_eq!(fs::read(ledger.path())?, before);
        assert_eq!(ledger.read("a")?, vec![kept]);
        Ok(())
    }

    #[test]
    fn test_unwritable_location_is_persistence_error() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        // The path points at a directory, so it can never be opened as a file
        let mut ledger = CsvLedger::new(dir.path());

        let result = ledger.append("u", Kind::Income, 1, None);

        assert!(matches!(result, Err(Error::Persistence { .. })));
        Ok(())
    }

    #[test]
    fn test_raw_log_matches_file() -> Result<()> {
        let (_dir, mut ledger, _clock) = setup_test_ledger()?;
        assert!(ledger.raw_log()?.is_empty());

        ledger.append("u", Kind::Income, 1000, Some("salary"))?;

        assert_eq!(ledger.raw_log()?, fs::read(ledger.path())?);
        Ok(())
    }

    #[test]
    fn test_shared_ledger_lock() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let shared = CsvLedger::new(dir.path().join("ledger.csv")).into_shared();

        lock_ledger(&shared)?.append("u", Kind::Income, 5, None)?;
        let records = lock_ledger(&shared)?.read("u")?;

        assert_eq!(records.len(), 1);
        Ok(())
    }
}
