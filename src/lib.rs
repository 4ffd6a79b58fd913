//! Batch media download orchestrator.
//!
//! Reads a plain-text manifest of `name:url` lines and drives the external
//! `yt-dlp` and `ffmpeg` tools to fetch each record sequentially, with
//! per-record retries, pacing between records, a dry-run preview mode, and
//! self-tests for tool availability and URL reachability.
//!
//! The public API is organised into four layers:
//!
//! - **[`manifest`]** and **[`config`]** — parse the input file and validate
//!   run options into a [`config::RunConfig`]
//! - **[`exec`]** and **[`fetch`]** — the process-spawning seam and the
//!   fetch strategies built on it
//! - **[`retry`]** and **[`driver`]** — the per-record retry state machine
//!   and the sequential run loop
//! - **[`selftest`]** — dependency and URL diagnostics
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod logging;
pub mod manifest;
pub mod retry;
pub mod selftest;
