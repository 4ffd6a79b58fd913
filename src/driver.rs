//! Execution driver: the sequential run loop, summary, and interrupts.
//!
//! Records are processed strictly one at a time, in manifest order, so the
//! configured delay is respected both within and between records. The only
//! suspension points are the pacer waits and the blocking fetch-tool calls.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::RunConfig;
use crate::fetch::Fetcher;
use crate::logging::{Logger, RecordStatus};
use crate::manifest::Record;
use crate::retry::{Pacer, Resolution, RetryController};

/// Final outcome of one record, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeEntry {
    /// Record name from the manifest.
    pub name: String,
    /// Attempts made before the record resolved.
    pub attempts: u32,
    /// Final status.
    pub status: RecordStatus,
    /// Output path on success, last error on failure, simulated action on
    /// dry run.
    pub detail: Option<String>,
}

/// Aggregated result of one orchestration run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Records selected for processing (after `--num` truncation).
    pub total: usize,
    /// Records that produced output (dry-run simulations included).
    pub succeeded: usize,
    /// Records that ended exhausted or fatally failed.
    pub failed: usize,
    /// Records never started because the run was interrupted.
    pub skipped: usize,
    /// Per-record final outcomes, in processing order.
    pub outcomes: Vec<OutcomeEntry>,
}

impl RunSummary {
    fn push(&mut self, log: &Logger, entry: OutcomeEntry) {
        match entry.status {
            RecordStatus::Succeeded | RecordStatus::DryRun => self.succeeded += 1,
            RecordStatus::Failed => self.failed += 1,
            RecordStatus::Skipped => self.skipped += 1,
        }
        log.record_outcome(
            &entry.name,
            entry.status,
            entry.attempts,
            entry.detail.as_deref(),
        );
        self.outcomes.push(entry);
    }
}

/// Process every selected record and aggregate the run summary.
///
/// With `dry_run` set the fetcher is expected to be a simulation: each
/// record resolves in a single synthesized attempt, with no retry machinery
/// and no pacing. Otherwise each record runs through the retry controller,
/// and the inter-record delay applies after every record except the last.
///
/// The interrupt flag stops the run at the next record boundary (the retry
/// controller also honors it between attempts); remaining records are
/// reported as skipped, never silently dropped.
#[must_use]
pub fn run(
    records: &[Record],
    config: &RunConfig,
    fetcher: &dyn Fetcher,
    pacer: &dyn Pacer,
    log: &Logger,
    interrupt: &AtomicBool,
) -> RunSummary {
    let selected: Vec<&Record> = records
        .iter()
        .take(config.item_limit.unwrap_or(records.len()))
        .collect();
    let total = selected.len();

    banner(config, total, log);

    let controller = RetryController::new(config, pacer);
    let mut summary = RunSummary {
        total,
        ..RunSummary::default()
    };

    let mut stopped_at: Option<usize> = None;
    for (i, record) in selected.iter().enumerate() {
        if interrupt.load(Ordering::SeqCst) {
            stopped_at = Some(i);
            break;
        }

        log.stage(&format!(
            "[{}/{total}] '{}': {}",
            i + 1,
            record.name,
            record.url
        ));

        if config.dry_run {
            summary.push(log, simulate(record, config, fetcher, log));
        } else {
            let outcome = controller.run_record(fetcher, record, config, log, interrupt);
            let entry = match outcome.resolution {
                Resolution::Succeeded { detail } => {
                    log.info(&format!("saved: {detail}"));
                    OutcomeEntry {
                        name: record.name.clone(),
                        attempts: outcome.attempts,
                        status: RecordStatus::Succeeded,
                        detail: Some(detail),
                    }
                }
                Resolution::Failed { detail } => OutcomeEntry {
                    name: record.name.clone(),
                    attempts: outcome.attempts,
                    status: RecordStatus::Failed,
                    detail: Some(detail),
                },
                Resolution::Interrupted => {
                    summary.push(
                        log,
                        OutcomeEntry {
                            name: record.name.clone(),
                            attempts: outcome.attempts,
                            status: RecordStatus::Skipped,
                            detail: Some("interrupted".to_string()),
                        },
                    );
                    stopped_at = Some(i + 1);
                    break;
                }
            };
            summary.push(log, entry);
        }

        // Pacing applies between records, not after the last one
        if i + 1 < total && !config.dry_run {
            controller.pace_between_records();
        }
    }

    if let Some(from) = stopped_at {
        log.warn("interrupted: skipping remaining records");
        for record in selected.iter().skip(from) {
            summary.push(
                log,
                OutcomeEntry {
                    name: record.name.clone(),
                    attempts: 0,
                    status: RecordStatus::Skipped,
                    detail: Some("interrupted".to_string()),
                },
            );
        }
    }

    log.print_summary();
    summary
}

/// Dry run: one synthesized attempt, reported as a would-be action.
fn simulate(
    record: &Record,
    config: &RunConfig,
    fetcher: &dyn Fetcher,
    log: &Logger,
) -> OutcomeEntry {
    match fetcher.attempt(record, config, 1) {
        Ok(detail) => {
            log.dry_run(&detail);
            OutcomeEntry {
                name: record.name.clone(),
                attempts: 1,
                status: RecordStatus::DryRun,
                detail: Some(detail),
            }
        }
        Err(e) => OutcomeEntry {
            name: record.name.clone(),
            attempts: 1,
            status: RecordStatus::Failed,
            detail: Some(e.to_string()),
        },
    }
}

fn banner(config: &RunConfig, total: usize, log: &Logger) {
    if config.dry_run {
        log.stage(&format!(
            "DRY RUN - simulating download of {total} record(s)"
        ));
    } else {
        log.stage(&format!("Starting download of {total} record(s)"));
    }
    log.info(&format!("format: {}", config.format));
    log.info(&format!("extension: {}", config.extension));
    log.info(&format!("output: {}", config.output_dir.display()));
    log.info(&format!("retry attempts: {}", config.retry_count));
    log.info(&format!("delay: {}s", config.delay_seconds));
}
