// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed manifest fixture plus scripted
// fetcher, pacer, and executor stubs so each integration test can drive a
// full run without spawning external tools or sleeping.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use batchdl::config::RunConfig;
use batchdl::error::FetchError;
use batchdl::exec::{ExecResult, Executor};
use batchdl::fetch::Fetcher;
use batchdl::manifest::Record;
use batchdl::retry::Pacer;

/// An isolated manifest file backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct ManifestFixture {
    /// Temporary directory holding the manifest and output directory.
    pub root: tempfile::TempDir,
    /// Path of the manifest file inside `root`.
    pub manifest: PathBuf,
}

impl ManifestFixture {
    /// Write `content` as the manifest `urls.txt` inside a fresh tempdir.
    pub fn new(content: &str) -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let manifest = root.path().join("urls.txt");
        std::fs::write(&manifest, content).expect("write manifest");
        Self { root, manifest }
    }

    /// Path for an output directory inside the fixture (not created).
    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("output")
    }

    /// Build a validated run configuration pointing at this fixture.
    pub fn config(&self, retry_count: u32, delay_seconds: u64, dry_run: bool) -> RunConfig {
        RunConfig::build(
            self.manifest.clone(),
            self.output_dir(),
            "ba+bv",
            "mp4",
            retry_count,
            delay_seconds,
            None,
            dry_run,
        )
        .expect("valid run config")
    }
}

/// Fetcher scripted per record name: fail the first `n` attempts for a
/// record, then succeed. Records every call.
pub struct ScriptedFetcher {
    failures: HashMap<String, u32>,
    calls: RefCell<HashMap<String, u32>>,
}

impl ScriptedFetcher {
    /// `failures` lists `(record name, attempts that fail before success)`.
    pub fn new(failures: &[(&str, u32)]) -> Self {
        Self {
            failures: failures
                .iter()
                .map(|(n, f)| ((*n).to_string(), *f))
                .collect(),
            calls: RefCell::new(HashMap::new()),
        }
    }

    /// Number of attempts made for `name`.
    pub fn calls_for(&self, name: &str) -> u32 {
        self.calls.borrow().get(name).copied().unwrap_or(0)
    }
}

impl Fetcher for ScriptedFetcher {
    fn attempt(
        &self,
        record: &Record,
        config: &RunConfig,
        _attempt_number: u32,
    ) -> Result<String, FetchError> {
        let mut calls = self.calls.borrow_mut();
        let call = calls.entry(record.name.clone()).or_insert(0);
        *call += 1;
        if *call <= self.failures.get(&record.name).copied().unwrap_or(0) {
            Err(FetchError::Network("connection reset".to_string()))
        } else {
            Ok(config.output_path(record).display().to_string())
        }
    }
}

/// Pacer that records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    /// Every pause requested, in order.
    pub pauses: RefCell<Vec<Duration>>,
}

impl Pacer for RecordingPacer {
    fn pause(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}

/// Executor stub scripted per tool name and per URL, for self-test runs.
pub struct StubExecutor {
    /// Tools that `which` finds and that answer version queries.
    pub on_path: Vec<&'static str>,
    /// URLs whose simulate probe fails, with the stderr to report.
    pub failing_urls: Vec<(&'static str, &'static str)>,
}

impl Executor for StubExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        if !self.on_path.contains(&program) {
            anyhow::bail!("failed to execute: {program}");
        }
        let failed = args
            .last()
            .and_then(|url| {
                self.failing_urls
                    .iter()
                    .find(|(u, _)| u == url)
                    .map(|(_, stderr)| *stderr)
            })
            .filter(|_| args.contains(&"--simulate"));

        Ok(failed.map_or_else(
            || ExecResult {
                stdout: "2025.08.01\n".to_string(),
                stderr: String::new(),
                success: true,
                code: Some(0),
            },
            |stderr| ExecResult {
                stdout: String::new(),
                stderr: stderr.to_string(),
                success: false,
                code: Some(1),
            },
        ))
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        self.on_path
            .contains(&program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }
}
