//! Per-record retry state machine with serialized pacing.
//!
//! Every record walks `Pending → Attempting → {Succeeded | Retrying |
//! Exhausted}`. The same `delay_seconds` knob spaces retries of one record
//! and the gap between records, so the controller and the driver share one
//! [`Pacer`]; with a single sequential worker this guarantees no two
//! network-facing attempts start closer together than the configured delay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::RunConfig;
use crate::fetch::Fetcher;
use crate::logging::Logger;
use crate::manifest::Record;

/// Tagged per-record state. Terminal states carry the attempt count so
/// exhaustion is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordState {
    /// Not yet started.
    Pending,
    /// Attempt `attempt` is in flight (1-based).
    Attempting {
        /// 1-based number of the attempt in flight.
        attempt: u32,
    },
    /// A retryable failure occurred; waiting before `next_attempt`.
    Retrying {
        /// The attempt number about to run after the pause.
        next_attempt: u32,
    },
    /// Terminal: the record produced its output.
    Succeeded {
        /// Total attempts made.
        attempts: u32,
    },
    /// Terminal: retry budget consumed or a fatal failure occurred.
    Exhausted {
        /// Total attempts made.
        attempts: u32,
    },
}

impl RecordState {
    /// Whether no further attempts will be made.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Exhausted { .. })
    }
}

/// How one record finally resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Output produced; `detail` is the output path (or simulated action).
    Succeeded {
        /// Success detail from the final attempt.
        detail: String,
    },
    /// Budget exhausted or fatal failure; `detail` is the last error.
    Failed {
        /// Error detail from the final attempt.
        detail: String,
    },
    /// An interrupt arrived before the next attempt could start.
    Interrupted,
}

/// Final per-record result consumed by the execution driver.
#[derive(Debug)]
pub struct RecordOutcome {
    /// Attempts actually made (0 when interrupted before the first).
    pub attempts: u32,
    /// Terminal resolution.
    pub resolution: Resolution,
}

/// Timed-wait seam so tests never sleep.
pub trait Pacer {
    /// Block the single worker for `duration`.
    fn pause(&self, duration: Duration);
}

/// [`Pacer`] backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Drives one record through the state machine, delegating each attempt to
/// the fetcher and pacing between attempts.
pub struct RetryController<'p> {
    retry_count: u32,
    delay: Duration,
    pacer: &'p dyn Pacer,
}

impl std::fmt::Debug for RetryController<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryController")
            .field("retry_count", &self.retry_count)
            .field("delay", &self.delay)
            .finish()
    }
}

impl<'p> RetryController<'p> {
    /// Build a controller from the run's retry/delay settings.
    #[must_use]
    pub fn new(config: &RunConfig, pacer: &'p dyn Pacer) -> Self {
        Self {
            retry_count: config.retry_count,
            delay: Duration::from_secs(config.delay_seconds),
            pacer,
        }
    }

    /// The inter-record pause, reusing the same knob as retry spacing.
    pub fn pace_between_records(&self) {
        self.pacer.pause(self.delay);
    }

    /// Resolve one record to a terminal state.
    ///
    /// Total attempts never exceed `retry_count + 1`. The interrupt flag is
    /// honored at the state boundary: a pending retry is abandoned before
    /// its attempt starts, never mid-invocation.
    #[must_use]
    pub fn run_record(
        &self,
        fetcher: &dyn Fetcher,
        record: &Record,
        config: &RunConfig,
        log: &Logger,
        interrupt: &AtomicBool,
    ) -> RecordOutcome {
        let max_attempts = self.retry_count.saturating_add(1);
        let mut state = RecordState::Pending;
        let mut last_detail = String::new();

        loop {
            state = match state {
                RecordState::Pending => {
                    if interrupt.load(Ordering::SeqCst) {
                        return RecordOutcome {
                            attempts: 0,
                            resolution: Resolution::Interrupted,
                        };
                    }
                    RecordState::Attempting { attempt: 1 }
                }
                RecordState::Retrying { next_attempt } => {
                    self.pacer.pause(self.delay);
                    if interrupt.load(Ordering::SeqCst) {
                        return RecordOutcome {
                            attempts: next_attempt - 1,
                            resolution: Resolution::Interrupted,
                        };
                    }
                    RecordState::Attempting {
                        attempt: next_attempt,
                    }
                }
                RecordState::Attempting { attempt } => {
                    log.debug(&format!("attempt {attempt}/{max_attempts}: {}", record.url));
                    match fetcher.attempt(record, config, attempt) {
                        Ok(detail) => {
                            last_detail = detail;
                            RecordState::Succeeded { attempts: attempt }
                        }
                        Err(e) if e.is_retryable() && attempt < max_attempts => {
                            log.warn(&format!(
                                "attempt {attempt}/{max_attempts} failed: {e}. Retrying in {}s",
                                self.delay.as_secs()
                            ));
                            last_detail = e.to_string();
                            RecordState::Retrying {
                                next_attempt: attempt + 1,
                            }
                        }
                        Err(e) => {
                            if e.is_retryable() {
                                log.error(&format!("giving up after {attempt} attempt(s): {e}"));
                            } else {
                                log.error(&format!("fatal, not retrying: {e}"));
                            }
                            last_detail = e.to_string();
                            RecordState::Exhausted { attempts: attempt }
                        }
                    }
                }
                RecordState::Succeeded { attempts } => {
                    return RecordOutcome {
                        attempts,
                        resolution: Resolution::Succeeded {
                            detail: last_detail,
                        },
                    };
                }
                RecordState::Exhausted { attempts } => {
                    return RecordOutcome {
                        attempts,
                        resolution: Resolution::Failed {
                            detail: last_detail,
                        },
                    };
                }
            };
        }
    }
}
