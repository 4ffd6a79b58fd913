//! Domain-specific error types for the download orchestrator.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`ValidationError`]) while the CLI boundary converts them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! BatchdlError
//! ├── Config(ConfigError)         — missing input, declined dir creation, I/O
//! ├── Validation(ValidationError) — format/extension/manifest-shape violations
//! ├── Dependency(DependencyError) — missing external tool
//! └── Fetch(FetchError)           — per-attempt fetch/transcode failures
//! ```
//!
//! [`FetchError`] carries its own retryable/fatal classification, consumed by
//! the retry controller: transient network failures are retried up to the
//! configured ceiling, everything else terminates the record immediately.

use thiserror::Error;

/// Top-level error type for the download orchestrator.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at the CLI boundary.
#[derive(Error, Debug)]
pub enum BatchdlError {
    /// Configuration-related error (missing input file, declined directory
    /// creation, I/O).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation error (format token, extension compatibility, manifest
    /// shape, numeric bounds).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A required external tool is missing or not invocable.
    #[error("Dependency error: {0}")]
    Dependency(#[from] DependencyError),

    /// A fetch attempt failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// Errors that abort the run before any record is processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The manifest file given with `--input` does not exist.
    #[error("input file '{0}' does not exist")]
    InputNotFound(String),

    /// The manifest parsed cleanly but contained zero records.
    #[error("no entries found in '{0}'")]
    EmptyManifest(String),

    /// The user declined to create the missing output directory.
    #[error("output directory '{0}' does not exist and was not created")]
    DirectoryDeclined(String),

    /// An I/O error occurred while reading the manifest or creating the
    /// output directory.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path of the file or directory involved.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from validating CLI-resolved settings or manifest shape.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The format token is not one of the recognised audio/video selectors.
    #[error("invalid format code '{token}'. Valid formats: {valid}")]
    UnknownFormat {
        /// The rejected token as given on the command line.
        token: String,
        /// Comma-joined list of accepted tokens.
        valid: String,
    },

    /// The requested extension does not belong to the resolved format's
    /// allowed set.
    #[error("extension '{extension}' is incompatible with {format} format. Valid extensions: {allowed}")]
    IncompatibleExtension {
        /// The rejected extension.
        extension: String,
        /// Human-readable name of the resolved format.
        format: String,
        /// Comma-joined list of extensions the format accepts.
        allowed: String,
    },

    /// A manifest line does not follow the `name:url` shape.
    #[error("line {line}: {reason}")]
    MalformedLine {
        /// 1-based line number in the manifest file.
        line: usize,
        /// What is wrong with the line.
        reason: String,
    },

    /// A record name contains a path separator and would escape the output
    /// directory.
    #[error("line {line}: name '{name}' contains a path separator")]
    UnsafeName {
        /// 1-based line number in the manifest file.
        line: usize,
        /// The offending record name.
        name: String,
    },

    /// Two records resolve to the same output filename.
    #[error("duplicate name '{name}': lines {first} and {second} would write the same output file")]
    DuplicateName {
        /// The colliding record name.
        name: String,
        /// Line number of the first occurrence.
        first: usize,
        /// Line number of the second occurrence.
        second: usize,
    },

    /// `--num` was given a value that is not a positive integer.
    #[error("item limit must be a positive integer, got {0}")]
    InvalidItemLimit(u64),
}

/// A required external tool is missing.
#[derive(Error, Debug)]
pub enum DependencyError {
    /// One or more tools could not be found on PATH or failed their version
    /// query.
    #[error("missing dependencies: {tools}")]
    MissingTools {
        /// Comma-joined names of the tools that could not be probed.
        tools: String,
    },
}

/// A single fetch/transcode attempt failed.
///
/// Classification decides whether the retry controller re-attempts the
/// record: transient conditions are retryable, everything that needs user
/// action (bad URL, missing tool) is fatal.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The fetch tool timed out talking to the source platform.
    #[error("network timeout: {0}")]
    Timeout(String),

    /// The source platform is throttling or blocking requests (429, bot
    /// detection).
    #[error("request throttled by source: {0}")]
    Throttled(String),

    /// A transient network failure (connection reset, DNS hiccup).
    #[error("network error: {0}")]
    Network(String),

    /// The URL is malformed or points at a platform the fetch tool does not
    /// support.
    #[error("unsupported or invalid URL: {0}")]
    UnsupportedUrl(String),

    /// The fetch tool itself could not be spawned.
    #[error("fetch tool not invocable: {0}")]
    ToolMissing(String),

    /// The tool exited non-zero with output that matched no known pattern.
    #[error("fetch tool failed: {0}")]
    ToolFailure(String),
}

impl FetchError {
    /// Whether the retry controller should re-attempt after this failure.
    ///
    /// Unclassified tool failures are treated as retryable: the original
    /// behavior retries every non-zero exit, and a transcode failure after a
    /// successful fetch lands here as well.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Throttled(_) | Self::Network(_) | Self::ToolFailure(_) => true,
            Self::UnsupportedUrl(_) | Self::ToolMissing(_) => false,
        }
    }
}
