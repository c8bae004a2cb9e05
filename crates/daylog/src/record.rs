use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Severity of a log record, ordered from least to most important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

/// Widest severity display name ("Warning"); shorter names are padded to it.
const SEVERITY_COLUMN: usize = 7;

/// Sources wider than this are truncated.
const SOURCE_MAX: usize = 10;

/// Source column width in the rendered line.
const SOURCE_COLUMN: usize = 11;

impl Severity {
    /// Display name used in the rendered line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Fatal => "Fatal",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// A single log record, rendered once at construction.
///
/// The rendered form is exactly one line:
/// `[HH:MM:SS] [<severity>] <source> <message>`, with the severity and
/// source columns padded to fixed widths so messages line up regardless of
/// severity name or source length.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// Message text with control characters escaped.
    pub message: String,
    /// Origin tag. Sources longer than 10 characters keep their first 9.
    pub source: String,
    pub severity: Severity,
    pub timestamp: DateTime<Local>,
    rendered: String,
}

impl LogRecord {
    /// Build a record stamped with the current local time.
    pub fn new(message: &str, source: &str, severity: Severity) -> Self {
        Self::with_timestamp(message, source, severity, Local::now())
    }

    /// Build a record with an explicit timestamp.
    pub fn with_timestamp(
        message: &str,
        source: &str,
        severity: Severity,
        timestamp: DateTime<Local>,
    ) -> Self {
        let message = escape_control(message);
        let source = truncate_source(source);

        let time = timestamp.format("%H:%M:%S");
        let name = severity.as_str();
        let severity_pad = " ".repeat(SEVERITY_COLUMN.saturating_sub(name.len()));
        let source_pad = " ".repeat(SOURCE_COLUMN.saturating_sub(source.chars().count()));
        let rendered = format!("[{time}] [{name}]{severity_pad} {source}{source_pad} {message}");

        Self {
            message,
            source,
            severity,
            timestamp,
            rendered,
        }
    }

    /// The line written to the log file, without a trailing newline.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }
}

/// Replace `\n`, `\t`, `\b`, `\r` and `\0` with their two-character escape
/// sequences. Single pass, so backslashes inserted here are never re-escaped.
fn escape_control(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out
}

/// Sources longer than `SOURCE_MAX` keep their first 9 characters. The
/// keep-9-of-10 cutoff is long-standing observable behavior; callers relying
/// on exact 10-character sources must account for it.
fn truncate_source(source: &str) -> String {
    if source.chars().count() > SOURCE_MAX {
        source.chars().take(SOURCE_MAX - 1).collect()
    } else {
        source.to_string()
    }
}
