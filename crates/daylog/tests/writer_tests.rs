use std::fs;
use std::io::Read;
use std::sync::Arc;

use chrono::Local;
use daylog::{LogRecord, LogWriter, Logger, Severity};
use flate2::read::GzDecoder;
use tempfile::TempDir;

/// Helper: today's file stem, `DD-MM-YYYY`.
fn today_stem() -> String {
    Local::now().date_naive().format("%d-%m-%Y").to_string()
}

// ============================================================
// Opening
// ============================================================

#[test]
fn test_open_creates_directory_and_dated_file() {
    let dir = TempDir::new().unwrap();
    let logs = dir.path().join("Logs");

    let writer = LogWriter::with_dir(&logs).unwrap();

    assert!(logs.is_dir());
    assert_eq!(
        writer.active_path().unwrap(),
        logs.join(format!("{}.log", today_stem()))
    );
}

#[test]
fn test_open_is_idempotent_on_existing_directory() {
    let dir = TempDir::new().unwrap();

    let first = LogWriter::with_dir(dir.path()).unwrap();
    drop(first);
    let second = LogWriter::with_dir(dir.path());

    assert!(second.is_ok());
}

#[test]
fn test_reopen_same_day_picks_next_disambiguator() {
    let dir = TempDir::new().unwrap();

    let first = LogWriter::with_dir(dir.path()).unwrap();
    let first_path = first.active_path().unwrap();
    drop(first);

    let second = LogWriter::with_dir(dir.path()).unwrap();

    assert_eq!(first_path, dir.path().join(format!("{}.log", today_stem())));
    assert_eq!(
        second.active_path().unwrap(),
        dir.path().join(format!("{}_1.log", today_stem()))
    );
}

// ============================================================
// Appending
// ============================================================

#[test]
fn test_append_writes_flushed_line() {
    let dir = TempDir::new().unwrap();
    let writer = LogWriter::with_dir(dir.path()).unwrap();

    let record = LogRecord::new("ready", "Boot", Severity::Info);
    writer.append(&record).unwrap();

    // Flushed on append: readable while the writer is still open.
    let content = fs::read_to_string(writer.active_path().unwrap()).unwrap();
    assert_eq!(content, format!("{}\n", record.rendered()));
}

#[test]
fn test_append_escapes_before_hitting_disk() {
    let dir = TempDir::new().unwrap();
    let writer = LogWriter::with_dir(dir.path()).unwrap();

    writer
        .append(&LogRecord::new("a\nb\tc", "Test", Severity::Info))
        .unwrap();

    let content = fs::read_to_string(writer.active_path().unwrap()).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("a\\nb\\tc"));
}

#[test]
fn test_close_flushes() {
    let dir = TempDir::new().unwrap();
    let writer = LogWriter::with_dir(dir.path()).unwrap();
    let path = writer.active_path().unwrap();

    writer
        .append(&LogRecord::new("last words", "Test", Severity::Info))
        .unwrap();
    writer.close().unwrap();

    assert!(fs::read_to_string(path).unwrap().contains("last words"));
}

// ============================================================
// Forced rotation and archival
// ============================================================

#[test]
fn test_rotate_now_archives_and_switches() {
    let dir = TempDir::new().unwrap();
    let writer = LogWriter::with_dir(dir.path()).unwrap();
    let first_path = writer.active_path().unwrap();

    writer
        .append(&LogRecord::new("before rotation", "Test", Severity::Info))
        .unwrap();
    let original = fs::read(&first_path).unwrap();

    writer.rotate_now().unwrap();

    // Original is gone; the archive restores it byte for byte.
    assert!(!first_path.exists());
    let archive_path = dir.path().join(format!("{}.log.gz", today_stem()));
    let mut restored = Vec::new();
    GzDecoder::new(fs::File::open(&archive_path).unwrap())
        .read_to_end(&mut restored)
        .unwrap();
    assert_eq!(restored, original);

    // Replacement takes the next disambiguator and opens with the
    // switched-files notice.
    let new_path = writer.active_path().unwrap();
    assert_eq!(new_path, dir.path().join(format!("{}_1.log", today_stem())));
    let content = fs::read_to_string(&new_path).unwrap();
    let first_line = content.lines().next().unwrap();
    assert!(first_line.contains("Switched files!"));
    assert!(first_line.contains("[Warning] Logger"));
}

#[test]
fn test_repeated_rotations_count_up() {
    let dir = TempDir::new().unwrap();
    let writer = LogWriter::with_dir(dir.path()).unwrap();

    writer.rotate_now().unwrap();
    writer.rotate_now().unwrap();

    assert_eq!(
        writer.active_path().unwrap(),
        dir.path().join(format!("{}_2.log", today_stem()))
    );
    assert!(dir
        .path()
        .join(format!("{}.log.gz", today_stem()))
        .exists());
    assert!(dir
        .path()
        .join(format!("{}_1.log.gz", today_stem()))
        .exists());
}

#[test]
fn test_rotation_sweeps_leftover_logs() {
    let dir = TempDir::new().unwrap();
    // A stale active file left behind by a crashed session.
    fs::write(dir.path().join("15-03-2024.log"), "orphaned\n").unwrap();

    let writer = LogWriter::with_dir(dir.path()).unwrap();
    writer.rotate_now().unwrap();

    assert!(!dir.path().join("15-03-2024.log").exists());
    assert!(dir.path().join("15-03-2024.log.gz").exists());
}

// ============================================================
// Logger dispatch
// ============================================================

#[test]
fn test_logger_write_reaches_the_file() {
    let dir = TempDir::new().unwrap();
    let writer = Arc::new(LogWriter::with_dir(dir.path()).unwrap());
    let mut logger = Logger::new();
    logger.subscribe(writer.clone());

    logger.write("request served", "Http").unwrap();
    logger
        .write_with("disk almost full", "Storage", Severity::Warning)
        .unwrap();

    let content = fs::read_to_string(writer.active_path().unwrap()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("[Info]"));
    assert!(lines[0].contains("request served"));
    assert!(lines[1].contains("[Warning]"));
    assert!(lines[1].contains("disk almost full"));
}

#[test]
fn test_logger_to_dir_bootstraps_writer() {
    let dir = TempDir::new().unwrap();
    let logs = dir.path().join("Logs");

    let logger = Logger::to_dir(&logs).unwrap();
    logger.write("hello", "Boot").unwrap();

    let active = logs.join(format!("{}.log", today_stem()));
    assert!(fs::read_to_string(active).unwrap().contains("hello"));
}

#[test]
fn test_long_source_is_cut_to_nine_on_disk() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::to_dir(dir.path()).unwrap();

    logger.write("msg", "Subsystem42").unwrap();

    let active = dir.path().join(format!("{}.log", today_stem()));
    let content = fs::read_to_string(active).unwrap();
    assert!(content.contains(" Subsystem "));
    assert!(!content.contains("Subsystem4"));
}
