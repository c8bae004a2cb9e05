use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{Local, NaiveDate};

use crate::archive;
use crate::config::LogConfig;
use crate::error::LogError;
use crate::record::{LogRecord, Severity};

/// Source tag for records the writer emits about itself.
const SELF_SOURCE: &str = "Logger";

/// The currently open log file. Replaced on rotation, dropped on close.
struct ActiveFile {
    writer: BufWriter<fs::File>,
    path: PathBuf,
    /// Calendar date stamped on the file; compared against today before each
    /// write to detect staleness independent of wall-clock drift.
    opened: NaiveDate,
}

/// Appends rendered records to a date-stamped file in the log directory and
/// rotates it across calendar-day boundaries.
///
/// Rotation closes the active file, gzips every retired `.log` file in the
/// directory, and opens a fresh `DD-MM-YYYY[_N].log` for the current date.
/// The whole check-rotate-write sequence runs under one lock, so concurrent
/// callers never interleave partial lines or race two rotations.
///
/// Every record is flushed as soon as it is written. A crash loses at most a
/// partially flushed OS buffer, never an accepted record.
pub struct LogWriter {
    dir: PathBuf,
    state: Mutex<Option<ActiveFile>>,
}

impl LogWriter {
    /// Open a writer on the configured log directory.
    pub fn open(config: &LogConfig) -> Result<Self, LogError> {
        Self::with_dir(config.directory.clone())
    }

    /// Open a writer on a custom directory, creating it if absent.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self, LogError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| LogError::CreateDir {
            path: dir.clone(),
            source: e,
        })?;

        let active = open_active(&dir, Local::now().date_naive())?;
        Ok(Self {
            dir,
            state: Mutex::new(Some(active)),
        })
    }

    /// The log directory this writer appends into.
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Path of the currently active file.
    pub fn active_path(&self) -> Option<PathBuf> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.as_ref().map(|active| active.path.clone())
    }

    /// Append a record to the active file and flush it.
    ///
    /// If the active file was opened on an earlier calendar date the writer
    /// rotates first, so rotation happens at most once per day boundary,
    /// checked on demand rather than by a timer.
    pub fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let today = Local::now().date_naive();
        let needs_rotation = match state.as_ref() {
            Some(active) => active.opened < today,
            // A failed rotation left no active file; recover by rotating.
            None => true,
        };
        if needs_rotation {
            let stale = state.as_ref().map(|active| active.opened);
            self.rotate_locked(&mut state, today, stale)?;
        }

        let active = state.as_mut().ok_or_else(no_active_file)?;
        write_line(active, record)
    }

    /// Force a rotation for the current date.
    ///
    /// The retired file is archived like any day-boundary rotation and the
    /// replacement gets the next free disambiguator. Emits the switched-files
    /// record but no staleness warning.
    pub fn rotate_now(&self) -> Result<(), LogError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.rotate_locked(&mut state, Local::now().date_naive(), None)
    }

    /// Flush and close the writer, surfacing the final flush error.
    pub fn close(self) -> Result<(), LogError> {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(mut active) = state {
            active.writer.flush()?;
        }
        Ok(())
    }

    /// Retire the active file, archive the directory, and open a new file.
    /// `stale` carries the retired date when this is a day-boundary rotation.
    ///
    /// Call order matters: the old handle must be dropped before the archive
    /// sweep runs, and the sweep must finish before the new name is chosen so
    /// the disambiguator counts `.log.gz` files instead of colliding.
    fn rotate_locked(
        &self,
        state: &mut Option<ActiveFile>,
        today: NaiveDate,
        stale: Option<NaiveDate>,
    ) -> Result<(), LogError> {
        if let Some(mut previous) = state.take() {
            previous.writer.flush()?;
        }

        let (_, failures) = archive::compress_directory(&self.dir);

        let mut active = open_active(&self.dir, today)?;

        if let Some(retired) = stale {
            let notice = format!(
                "file was outdated! continuing log from {}",
                retired.format("%d-%m-%Y")
            );
            write_line(
                &mut active,
                &LogRecord::new(&notice, SELF_SOURCE, Severity::Warning),
            )?;
        }
        write_line(
            &mut active,
            &LogRecord::new("Switched files!", SELF_SOURCE, Severity::Warning),
        )?;

        // Archival failures are non-fatal; record them best-effort now that a
        // file is accepting writes again.
        for (path, error) in failures {
            let notice = format!("failed to archive {}: {}", path.display(), error);
            let _ = write_line(
                &mut active,
                &LogRecord::new(&notice, SELF_SOURCE, Severity::Error),
            );
        }

        *state = Some(active);
        Ok(())
    }
}

fn write_line(active: &mut ActiveFile, record: &LogRecord) -> Result<(), LogError> {
    writeln!(active.writer, "{}", record.rendered())?;
    active.writer.flush()?;
    Ok(())
}

fn open_active(dir: &Path, today: NaiveDate) -> Result<ActiveFile, LogError> {
    let path = next_log_path(dir, today);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| LogError::OpenFile {
            path: path.clone(),
            source: e,
        })?;

    Ok(ActiveFile {
        writer: BufWriter::new(file),
        path,
        opened: today,
    })
}

/// First `DD-MM-YYYY[_N].log` path that collides with neither an existing
/// `.log` nor a `.log.gz` archive. Repeated rotations within one day and
/// process restarts each get the next free disambiguator.
fn next_log_path(dir: &Path, date: NaiveDate) -> PathBuf {
    let base = date.format("%d-%m-%Y").to_string();
    let mut stem = base.clone();
    let mut n = 1;
    loop {
        let path = dir.join(format!("{stem}.log"));
        if !path.exists() && !dir.join(format!("{stem}.log.gz")).exists() {
            return path;
        }
        stem = format!("{base}_{n}");
        n += 1;
    }
}

fn no_active_file() -> LogError {
    LogError::Write(std::io::Error::other("no active log file"))
}
