#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the self-test command.
//!
//! These tests exercise `selftest::run` with scripted executors and isolated
//! temporary manifests, verifying that:
//! - dependency and URL checks pass and fail for the right reasons
//! - `all` reports both checks before failing
//! - URL probes use the fetch tool's simulate mode and classify errors

mod common;

use batchdl::cli::TestMode;
use batchdl::logging::Logger;
use batchdl::selftest;

use common::{ManifestFixture, StubExecutor};

fn both_tools() -> Vec<&'static str> {
    vec!["yt-dlp", "ffmpeg"]
}

// ---------------------------------------------------------------------------
// Dependency mode
// ---------------------------------------------------------------------------

/// With both tools installed the dependency check passes cleanly.
#[test]
fn dep_mode_passes_with_both_tools() {
    let fixture = ManifestFixture::new("a:https://x/1\n");
    let executor = StubExecutor {
        on_path: both_tools(),
        failing_urls: vec![],
    };
    let log = Logger::new(false);
    assert!(selftest::run(TestMode::Dep, &fixture.manifest, &executor, &log).is_ok());
}

/// A missing transcode tool fails the check and names the tool.
#[test]
fn dep_mode_fails_naming_missing_tool() {
    let fixture = ManifestFixture::new("a:https://x/1\n");
    let executor = StubExecutor {
        on_path: vec!["yt-dlp"],
        failing_urls: vec![],
    };
    let log = Logger::new(false);
    let err = selftest::run(TestMode::Dep, &fixture.manifest, &executor, &log).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("ffmpeg"), "got: {msg}");
    assert!(!msg.contains("yt-dlp,"), "present tool must not be listed");
}

/// Dependency mode never touches the manifest, so a missing input file is
/// irrelevant to it.
#[test]
fn dep_mode_ignores_missing_manifest() {
    let fixture = ManifestFixture::new("");
    let missing = fixture.root.path().join("absent.txt");
    let executor = StubExecutor {
        on_path: both_tools(),
        failing_urls: vec![],
    };
    let log = Logger::new(false);
    assert!(selftest::run(TestMode::Dep, &missing, &executor, &log).is_ok());
}

// ---------------------------------------------------------------------------
// URL mode
// ---------------------------------------------------------------------------

/// Every URL reachable: the check passes.
#[test]
fn url_mode_passes_when_all_reachable() {
    let fixture = ManifestFixture::new("a:https://x/1\nb:https://x/2\n");
    let executor = StubExecutor {
        on_path: both_tools(),
        failing_urls: vec![],
    };
    let log = Logger::new(false);
    assert!(selftest::run(TestMode::Url, &fixture.manifest, &executor, &log).is_ok());
}

/// One unreachable URL fails the check but all URLs are still probed.
#[test]
fn url_mode_fails_with_unreachable_count() {
    let fixture = ManifestFixture::new("a:https://x/1\nb:https://x/2\n");
    let executor = StubExecutor {
        on_path: both_tools(),
        failing_urls: vec![("https://x/2", "ERROR: HTTP Error 404: Not Found\n")],
    };
    let log = Logger::new(false);
    let err = selftest::run(TestMode::Url, &fixture.manifest, &executor, &log).unwrap_err();
    assert!(err.to_string().contains("1 unreachable URL"), "got: {err}");
}

/// Manifest format problems are collected and fail the check alongside the
/// probes, rather than aborting the scan.
#[test]
fn url_mode_reports_manifest_format_errors() {
    let fixture = ManifestFixture::new("a:https://x/1\nbroken line\n");
    let executor = StubExecutor {
        on_path: both_tools(),
        failing_urls: vec![],
    };
    let log = Logger::new(false);
    let err = selftest::run(TestMode::Url, &fixture.manifest, &executor, &log).unwrap_err();
    assert!(
        err.to_string().contains("manifest format error"),
        "got: {err}"
    );
}

/// An effectively empty manifest fails URL mode.
#[test]
fn url_mode_fails_on_empty_manifest() {
    let fixture = ManifestFixture::new("# nothing here\n");
    let executor = StubExecutor {
        on_path: both_tools(),
        failing_urls: vec![],
    };
    let log = Logger::new(false);
    let err = selftest::run(TestMode::Url, &fixture.manifest, &executor, &log).unwrap_err();
    assert!(err.to_string().contains("no entries"), "got: {err}");
}

// ---------------------------------------------------------------------------
// Combined mode
// ---------------------------------------------------------------------------

/// `all` runs both suites; a failure in either fails the run, and the URL
/// suite still executes after a dependency failure.
#[test]
fn all_mode_merges_both_verdicts() {
    let fixture = ManifestFixture::new("a:https://x/1\n");
    let executor = StubExecutor {
        on_path: vec!["yt-dlp"],
        failing_urls: vec![("https://x/1", "ERROR: HTTP Error 404: Not Found\n")],
    };
    let log = Logger::new(false);
    let err = selftest::run(TestMode::All, &fixture.manifest, &executor, &log).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("ffmpeg"), "dependency failure reported: {msg}");
    assert!(msg.contains("unreachable"), "URL failure reported: {msg}");
}

/// `all` passes when both suites pass.
#[test]
fn all_mode_passes_clean() {
    let fixture = ManifestFixture::new("a:https://x/1\n");
    let executor = StubExecutor {
        on_path: both_tools(),
        failing_urls: vec![],
    };
    let log = Logger::new(false);
    assert!(selftest::run(TestMode::All, &fixture.manifest, &executor, &log).is_ok());
}
