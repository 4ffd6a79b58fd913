//! Binary entry point: argument parsing, dispatch, and exit-code mapping.
#![allow(clippy::print_stdout)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use clap::Parser;

use batchdl::cli::Cli;
use batchdl::config::RunConfig;
use batchdl::exec::SystemExecutor;
use batchdl::fetch::{SimulatedFetcher, YtDlpFetcher};
use batchdl::logging::Logger;
use batchdl::retry::SleepPacer;
use batchdl::{driver, manifest, selftest};

const REPO_URL: &str = "https://github.com/batchdl/batchdl";

const EXAMPLE_MANIFEST: &str = "\
# One record per line, first colon separates name from URL.
# Blank lines and lines starting with '#' are ignored.
intro:https://www.youtube.com/watch?v=dQw4w9WgXcQ
lecture 01:https://example.com/media/lecture-01";

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if args.license {
        println!("{}", include_str!("../LICENSE"));
        return Ok(());
    }
    if args.repo {
        println!("{REPO_URL}");
        return Ok(());
    }
    if args.examples {
        println!("{EXAMPLE_MANIFEST}");
        return Ok(());
    }

    let log = Logger::new(args.verbose);
    let executor = SystemExecutor;

    if let Some(mode) = args.test {
        return selftest::run(mode, &args.input, &executor, &log);
    }

    let config = RunConfig::build(
        args.input,
        args.output,
        &args.format,
        &args.ext,
        args.retry,
        args.delay,
        args.num,
        args.dry_run,
    )?;

    let records = manifest::parse(&config.input_path)?;

    if !config.dry_run {
        if let Some(missing) = selftest::check_dependencies(&executor).to_error() {
            return Err(missing.into());
        }
        config.ensure_output_dir(&log)?;
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupt);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let pacer = SleepPacer;
    let summary = if config.dry_run {
        driver::run(
            &records,
            &config,
            &SimulatedFetcher,
            &pacer,
            &log,
            &interrupt,
        )
    } else {
        let fetcher = YtDlpFetcher::new(&executor);
        driver::run(&records, &config, &fetcher, &pacer, &log, &interrupt)
    };

    if summary.failed > 0 {
        bail!("{} record(s) failed", summary.failed);
    }
    Ok(())
}
