//! Terminal and file logging with per-record summary collection.

// This module owns all terminal output for the binary.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Final status of one manifest record, collected for the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// The record produced its output file.
    Succeeded,
    /// The record exhausted its retry budget or failed fatally.
    Failed,
    /// The record was never started (interrupted run).
    Skipped,
    /// The record was simulated without invoking external tools.
    DryRun,
}

/// Per-record outcome entry for summary reporting.
#[derive(Debug, Clone)]
pub struct RecordEntry {
    /// Record name from the manifest.
    pub name: String,
    /// Final status of the record.
    pub status: RecordStatus,
    /// Attempts made before the record resolved.
    pub attempts: u32,
    /// Last error detail for failed records, or the simulated action for
    /// dry runs.
    pub message: Option<String>,
}

/// Structured logger with dry-run awareness and summary collection.
///
/// All messages are always written to a persistent log file at
/// `$XDG_CACHE_HOME/batchdl/run.log` (default `~/.cache/batchdl/run.log`)
/// with timestamps and ANSI codes stripped, regardless of the verbose flag.
pub struct Logger {
    verbose: bool,
    records: std::cell::RefCell<Vec<RecordEntry>>,
    log_file: Option<PathBuf>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("verbose", &self.verbose)
            .field("records", &self.records.borrow().len())
            .field("log_file", &self.log_file)
            .finish()
    }
}

/// Return the log file path under `$XDG_CACHE_HOME/batchdl/` (or `~/.cache/batchdl/`).
fn log_file_path() -> Option<PathBuf> {
    let cache_dir = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cache")
        });
    let dir = cache_dir.join("batchdl");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join("run.log"))
}

/// Strip ANSI escape sequences from a string.
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm' (end of SGR sequence)
            for inner in chars.by_ref() {
                if inner == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl Logger {
    /// Create a logger, truncating the persistent log file for a fresh run.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        let log_file = log_file_path();

        // Write header to log file
        if let Some(ref path) = log_file {
            let header = format!(
                "==========================================\n\
                 batchdl {} {}\n\
                 ==========================================\n",
                env!("CARGO_PKG_VERSION"),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            );
            // Truncate and write header (new run = fresh log)
            let _ = fs::write(path, header);
        }

        Self {
            verbose,
            records: std::cell::RefCell::new(Vec::new()),
            log_file,
        }
    }

    /// Append a line to the persistent log file.
    fn write_to_file(&self, level: &str, msg: &str) {
        if let Some(ref path) = self.log_file
            && let Ok(mut f) = fs::OpenOptions::new().append(true).open(path)
        {
            let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let clean = strip_ansi(msg);
            let _ = writeln!(f, "{ts} {level} {clean}");
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    #[must_use]
    pub fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Print an error message to stderr.
    pub fn error(&self, msg: &str) {
        eprintln!("\x1b[31mERROR\x1b[0m {msg}");
        self.write_to_file("ERR", msg);
    }

    /// Print a warning to stderr.
    pub fn warn(&self, msg: &str) {
        eprintln!("\x1b[33mWARN\x1b[0m  {msg}");
        self.write_to_file("WRN", msg);
    }

    /// Print a stage header (bold arrow prefix).
    pub fn stage(&self, msg: &str) {
        println!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m");
        self.write_to_file("STG", msg);
    }

    /// Print an informational message.
    pub fn info(&self, msg: &str) {
        println!("  {msg}");
        self.write_to_file("INF", msg);
    }

    /// Print a debug message (terminal output only when verbose).
    pub fn debug(&self, msg: &str) {
        if self.verbose {
            println!("  \x1b[2m{msg}\x1b[0m");
        }
        // Always log debug to file, even when not verbose on terminal
        self.write_to_file("DBG", msg);
    }

    /// Print a dry-run action description.
    pub fn dry_run(&self, msg: &str) {
        println!("  \x1b[33m[DRY RUN]\x1b[0m {msg}");
        self.write_to_file("DRY", msg);
    }

    /// Record a resolved record's outcome for the summary.
    pub fn record_outcome(
        &self,
        name: &str,
        status: RecordStatus,
        attempts: u32,
        message: Option<&str>,
    ) {
        self.records.borrow_mut().push(RecordEntry {
            name: name.to_string(),
            status,
            attempts,
            message: message.map(String::from),
        });
    }

    /// Print the summary of all recorded records.
    pub fn print_summary(&self) {
        let records = self.records.borrow();
        if records.is_empty() {
            return;
        }

        println!();
        self.stage("Download summary");

        let mut succeeded = 0u32;
        let mut failed = 0u32;
        let mut skipped = 0u32;
        let mut dry_run = 0u32;

        for record in records.iter() {
            let (icon, color) = match record.status {
                RecordStatus::Succeeded => {
                    succeeded += 1;
                    ("✓", "\x1b[32m")
                }
                RecordStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
                RecordStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                RecordStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[33m")
                }
            };

            let attempts = match record.attempts {
                0 => String::new(),
                1 => " [1 attempt]".to_string(),
                n => format!(" [{n} attempts]"),
            };
            let suffix = record
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            let line = format!("{icon} {}{attempts}{suffix}", record.name);
            println!("  {color}{line}\x1b[0m");
            self.write_to_file("INF", &line);
        }

        println!();
        let total = succeeded + failed + skipped + dry_run;
        let totals = format!(
            "{total} records: {succeeded} succeeded, {failed} failed, {skipped} skipped, {dry_run} dry-run"
        );
        println!(
            "  {total} records: \x1b[32m{succeeded} succeeded\x1b[0m, \x1b[31m{failed} failed\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, {dry_run} dry-run"
        );
        self.write_to_file("INF", &totals);

        if let Some(path) = &self.log_file {
            println!("  \x1b[2mlog: {}\x1b[0m", path.display());
            self.write_to_file("INF", &format!("log: {}", path.display()));
        }
    }

    /// Ask a yes/no question on the terminal. Returns `true` for `y`/`yes`.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin or stdout cannot be used.
    pub fn confirm(&self, prompt: &str) -> io::Result<bool> {
        print!("{prompt} (y/n): ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let answer = input.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}
