//! The fetch-tool boundary: building and classifying yt-dlp invocations.
//!
//! The orchestrator never talks to source platforms itself. One download
//! attempt is one `yt-dlp` invocation; ffmpeg runs inside yt-dlp's
//! post-processing hook to extract audio or merge streams, so a transcode
//! failure surfaces here as a failed attempt of the whole record.

use crate::config::RunConfig;
use crate::error::FetchError;
use crate::exec::Executor;
use crate::manifest::Record;

/// Binary name of the external fetch tool.
pub const FETCH_TOOL: &str = "yt-dlp";

/// Binary name of the external transcode/mux tool.
pub const TRANSCODE_TOOL: &str = "ffmpeg";

/// Capability interface for one download attempt.
///
/// Dry-run and test substitution are strategy swaps of this trait rather
/// than conditional branches in the driver.
pub trait Fetcher {
    /// Perform one attempt for `record`. Returns a human-readable success
    /// detail (the produced or simulated output path) or a classified
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] whose classification decides whether the
    /// retry controller re-attempts.
    fn attempt(
        &self,
        record: &Record,
        config: &RunConfig,
        attempt_number: u32,
    ) -> Result<String, FetchError>;
}

/// Real fetcher: one `yt-dlp` process per attempt.
pub struct YtDlpFetcher<'e> {
    executor: &'e dyn Executor,
}

impl std::fmt::Debug for YtDlpFetcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YtDlpFetcher")
            .field("executor", &"<dyn Executor>")
            .finish()
    }
}

impl<'e> YtDlpFetcher<'e> {
    /// Create a fetcher that spawns processes through `executor`.
    #[must_use]
    pub const fn new(executor: &'e dyn Executor) -> Self {
        Self { executor }
    }

    /// Build the yt-dlp argument list for one record.
    ///
    /// Audio-only runs extract-audio through ffmpeg; video and combined
    /// formats merge into the requested container.
    #[must_use]
    pub fn build_args(record: &Record, config: &RunConfig) -> Vec<String> {
        let mut args = vec!["-f".to_string(), config.format.selector().to_string()];

        if config.format.is_audio_only() {
            args.push("--extract-audio".to_string());
            args.push("--audio-format".to_string());
            args.push(config.extension.clone());
        } else {
            args.push("--merge-output-format".to_string());
            args.push(config.extension.clone());
        }

        args.push("-o".to_string());
        args.push(config.output_template(record));
        args.push(record.url.clone());
        args
    }
}

impl Fetcher for YtDlpFetcher<'_> {
    fn attempt(
        &self,
        record: &Record,
        config: &RunConfig,
        _attempt_number: u32,
    ) -> Result<String, FetchError> {
        let args = Self::build_args(record, config);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        let result = self
            .executor
            .run(FETCH_TOOL, &arg_refs)
            .map_err(|e| FetchError::ToolMissing(format!("{e:#}")))?;

        if result.success {
            Ok(config.output_path(record).display().to_string())
        } else {
            Err(classify_failure(&result.stderr, result.code))
        }
    }
}

/// Fetcher used in dry-run mode: describes the action without side effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedFetcher;

impl Fetcher for SimulatedFetcher {
    fn attempt(
        &self,
        record: &Record,
        config: &RunConfig,
        _attempt_number: u32,
    ) -> Result<String, FetchError> {
        Ok(format!(
            "would download {} [{} as {}] -> {}",
            record.url,
            config.format,
            config.extension,
            config.output_path(record).display()
        ))
    }
}

/// Classify a failed yt-dlp run from its stderr.
///
/// Pattern order matters: a throttling message often also mentions the
/// network, and an unsupported-URL message must never be retried, so the
/// fatal and specific patterns are checked before the generic ones.
pub(crate) fn classify_failure(stderr: &str, code: Option<i32>) -> FetchError {
    let detail = last_error_line(stderr, code);
    let lower = detail.to_lowercase();

    if lower.contains("unsupported url")
        || lower.contains("is not a valid url")
        || lower.contains("invalid url")
    {
        return FetchError::UnsupportedUrl(detail);
    }
    if lower.contains("404")
        || lower.contains("video unavailable")
        || lower.contains("does not exist")
        || lower.contains("private video")
    {
        // 404-equivalent: the target is gone, retrying cannot help
        return FetchError::UnsupportedUrl(detail);
    }
    if lower.contains("429")
        || lower.contains("too many requests")
        || lower.contains("not a bot")
        || lower.contains("sign in to confirm")
    {
        return FetchError::Throttled(detail);
    }
    if lower.contains("timeout") || lower.contains("timed out") {
        return FetchError::Timeout(detail);
    }
    if lower.contains("connection")
        || lower.contains("network")
        || lower.contains("temporary failure")
        || lower.contains("resolve")
        || lower.contains("503")
    {
        return FetchError::Network(detail);
    }

    FetchError::ToolFailure(detail)
}

/// The last non-empty stderr line, which is where yt-dlp puts its error.
fn last_error_line(stderr: &str, code: Option<i32>) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map_or_else(
            || format!("exit code {}", code.unwrap_or(-1)),
            ToString::to_string,
        )
}
