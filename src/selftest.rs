//! Self-test subsystem: dependency presence and URL reachability checks.
//!
//! Two independent checks, selectable individually or together. The
//! dependency check is fail-fast for the run as a whole but both checks use
//! collect-all reporting internally: every tool and every URL is probed
//! before the verdict, because the goal here is diagnostic completeness
//! rather than the manifest parser's abort-early policy.

use std::path::Path;

use anyhow::Result;

use crate::cli::TestMode;
use crate::error::DependencyError;
use crate::exec::Executor;
use crate::fetch::{FETCH_TOOL, TRANSCODE_TOOL, classify_failure};
use crate::logging::Logger;
use crate::manifest::{self, Record};

/// Probe result for one external tool.
#[derive(Debug)]
pub struct ToolStatus {
    /// Binary name of the tool.
    pub tool: &'static str,
    /// Whether the tool was found and answered its version query.
    pub ok: bool,
    /// Detected version, or the reason the probe failed.
    pub detail: String,
}

/// Merged result of probing all required tools.
#[derive(Debug)]
pub struct DependencyReport {
    /// One status per required tool, in probe order.
    pub tools: Vec<ToolStatus>,
}

impl DependencyReport {
    /// Whether every tool answered its probe.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.tools.iter().all(|t| t.ok)
    }

    /// The typed error naming every failed tool, or `None` when all passed.
    #[must_use]
    pub fn to_error(&self) -> Option<DependencyError> {
        let missing: Vec<&str> = self
            .tools
            .iter()
            .filter(|t| !t.ok)
            .map(|t| t.tool)
            .collect();
        if missing.is_empty() {
            None
        } else {
            Some(DependencyError::MissingTools {
                tools: missing.join(", "),
            })
        }
    }
}

/// Probe result for one manifest record's URL.
#[derive(Debug)]
pub struct UrlStatus {
    /// The record whose URL was probed.
    pub record: Record,
    /// `Ok(())` when reachable, otherwise the classified reason.
    pub reachable: Result<(), String>,
}

/// Merged result of the URL check: manifest shape issues plus one probe
/// status per parseable record.
#[derive(Debug)]
pub struct UrlReport {
    /// Manifest shape violations found by the collect-all scan.
    pub issues: Vec<String>,
    /// Probe outcomes in manifest order.
    pub statuses: Vec<UrlStatus>,
}

impl UrlReport {
    /// Number of unreachable URLs.
    #[must_use]
    pub fn unreachable_count(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| s.reachable.is_err())
            .count()
    }

    /// Whether the manifest parsed cleanly and every URL was reachable.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.issues.is_empty() && self.unreachable_count() == 0 && !self.statuses.is_empty()
    }
}

/// Probe the external fetch and transcode tools.
///
/// A tool passes when it is on PATH and answers its version query; the
/// report carries the detected version line or the absence reason.
#[must_use]
pub fn check_dependencies(executor: &dyn Executor) -> DependencyReport {
    // ffmpeg prints its version with a single dash
    let probes = [(FETCH_TOOL, "--version"), (TRANSCODE_TOOL, "-version")];

    let tools = probes
        .iter()
        .map(|&(tool, version_arg)| probe_tool(executor, tool, version_arg))
        .collect();
    DependencyReport { tools }
}

fn probe_tool(executor: &dyn Executor, tool: &'static str, version_arg: &str) -> ToolStatus {
    if executor.which(tool).is_none() {
        return ToolStatus {
            tool,
            ok: false,
            detail: "not found on PATH".to_string(),
        };
    }

    match executor.run(tool, &[version_arg]) {
        Ok(result) if result.success => {
            let version = result
                .stdout
                .lines()
                .next()
                .unwrap_or("unknown version")
                .trim()
                .to_string();
            ToolStatus {
                tool,
                ok: true,
                detail: version,
            }
        }
        Ok(result) => ToolStatus {
            tool,
            ok: false,
            detail: format!("version query failed (exit {})", result.code.unwrap_or(-1)),
        },
        Err(e) => ToolStatus {
            tool,
            ok: false,
            detail: format!("{e:#}"),
        },
    }
}

/// Probe every manifest URL for existence without downloading media.
///
/// Uses the fetch tool's simulate mode, so the probe exercises the same
/// extractor that a real download would. All URLs are probed even after a
/// failure (collect-all semantics).
///
/// # Errors
///
/// Returns an error only when the manifest file itself is missing or
/// unreadable; per-URL failures land in the report.
pub fn check_urls(input_path: &Path, executor: &dyn Executor) -> Result<UrlReport> {
    let scan = manifest::scan(input_path)?;

    let statuses = scan
        .records
        .into_iter()
        .map(|record| {
            let reachable = probe_url(executor, &record.url);
            UrlStatus { record, reachable }
        })
        .collect();

    Ok(UrlReport {
        issues: scan.issues.iter().map(ToString::to_string).collect(),
        statuses,
    })
}

fn probe_url(executor: &dyn Executor, url: &str) -> Result<(), String> {
    match executor.run(FETCH_TOOL, &["--simulate", "--no-warnings", url]) {
        Ok(result) if result.success => Ok(()),
        Ok(result) => Err(classify_failure(&result.stderr, result.code).to_string()),
        Err(e) => Err(format!("{e:#}")),
    }
}

/// Run the requested self-tests, printing a full report.
///
/// `all` runs both checks independently and merges the verdict: neither
/// check short-circuits the other.
///
/// # Errors
///
/// Returns an error when any requested check failed, after all results
/// have been reported.
pub fn run(mode: TestMode, input_path: &Path, executor: &dyn Executor, log: &Logger) -> Result<()> {
    let mut failures: Vec<String> = Vec::new();

    if matches!(mode, TestMode::Dep | TestMode::All) {
        log.stage("Checking dependencies");
        let report = check_dependencies(executor);
        for status in &report.tools {
            if status.ok {
                log.info(&format!("[ok] {} {}", status.tool, status.detail));
            } else {
                log.error(&format!("[missing] {}: {}", status.tool, status.detail));
            }
        }
        if let Some(e) = report.to_error() {
            log.info("install yt-dlp with pip, ffmpeg from https://ffmpeg.org/");
            failures.push(e.to_string());
        } else {
            log.info("all dependencies are installed");
        }
    }

    if matches!(mode, TestMode::Url | TestMode::All) {
        log.stage("Validating URLs");
        let report = check_urls(input_path, executor)?;

        for issue in &report.issues {
            log.error(&format!("manifest: {issue}"));
        }

        let total = report.statuses.len();
        for (i, status) in report.statuses.iter().enumerate() {
            match &status.reachable {
                Ok(()) => log.info(&format!(
                    "[{}/{total}] '{}': reachable",
                    i + 1,
                    status.record.name
                )),
                Err(reason) => log.error(&format!(
                    "[{}/{total}] '{}': unreachable ({reason})",
                    i + 1,
                    status.record.name
                )),
            }
        }

        if report.statuses.is_empty() {
            failures.push("no entries found in input file".to_string());
        } else if report.passed() {
            log.info(&format!("all {total} URL(s) are valid"));
        } else {
            let mut parts = Vec::new();
            if !report.issues.is_empty() {
                parts.push(format!("{} manifest format error(s)", report.issues.len()));
            }
            let unreachable = report.unreachable_count();
            if unreachable > 0 {
                parts.push(format!("{unreachable} unreachable URL(s)"));
            }
            failures.push(parts.join(", "));
        }
    }

    if failures.is_empty() {
        log.stage("All tests passed");
        Ok(())
    } else {
        anyhow::bail!("self-test failed: {}", failures.join("; "))
    }
}
