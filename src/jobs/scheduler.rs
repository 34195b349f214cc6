// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/scheduler.rs
// Version: 1.2.0
// Developer: Tari Faqqer Contributors
//
// This file drives the periodic jobs. A job is anything with a run-once
// entry point; a PeriodicTrigger sleeps until the next cron fire time and
// runs the job inline, so two runs of one job never overlap. Manual triggers
// go through the same JobRunner guard and are skipped while a run is active.
// Shutdown is observed only between runs.
//
// Tree Location:
// - src/jobs/scheduler.rs (cron schedule and periodic triggers)
// - Depends on: chrono, tokio, async-trait

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

const LOG_TARGET: &str = "tari::faqqer::jobs::scheduler";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Cron expression '{expr}' must have 5 fields")]
    FieldCount { expr: String },

    #[error("Invalid {field} field '{value}' in cron expression")]
    InvalidField { field: &'static str, value: String },

    #[error("Only '*' is supported for the {field} field, got '{value}'")]
    Unsupported { field: &'static str, value: String },
}

/// Minute/hour cron schedule evaluated in UTC; day fields must be `*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expr: String,
    minutes: BTreeSet<u32>,
    hours: BTreeSet<u32>,
}

impl CronSchedule {
    /// Parse "minute hour * * *". Minute and hour accept `*`, `*/n`, `n`,
    /// `a-b` and comma lists of those.
    pub fn parse(expr: &str) -> Result<Self, ScheduleError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        let [minute, hour, day, month, weekday] = fields.as_slice() else {
            return Err(ScheduleError::FieldCount {
                expr: expr.to_string(),
            });
        };

        for (field, value) in [("day-of-month", day), ("month", month), ("day-of-week", weekday)] {
            if *value != "*" {
                return Err(ScheduleError::Unsupported {
                    field,
                    value: value.to_string(),
                });
            }
        }

        Ok(Self {
            expr: fields.join(" "),
            minutes: parse_field(minute, "minute", 59)?,
            hours: parse_field(hour, "hour", 23)?,
        })
    }

    /// First fire time strictly after `after`, at a whole minute
    pub fn next_after(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        let whole_minute = after
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(after);
        let mut candidate = whole_minute + ChronoDuration::minutes(1);
        // Day fields are wildcards, so a match always exists within a day
        for _ in 0..(24 * 60) {
            if self.hours.contains(&candidate.hour()) && self.minutes.contains(&candidate.minute()) {
                return candidate;
            }
            candidate += ChronoDuration::minutes(1);
        }
        candidate
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

fn parse_field(value: &str, field: &'static str, max: u32) -> Result<BTreeSet<u32>, ScheduleError> {
    let invalid = || ScheduleError::InvalidField {
        field,
        value: value.to_string(),
    };
    let number = |s: &str| s.parse::<u32>().ok().filter(|n| *n <= max).ok_or_else(invalid);

    let mut set = BTreeSet::new();
    for part in value.split(',') {
        if part == "*" {
            set.extend(0..=max);
        } else if let Some(step) = part.strip_prefix("*/") {
            let step = number(step)?;
            if step == 0 {
                return Err(invalid());
            }
            set.extend((0..=max).step_by(step as usize));
        } else if let Some((start, end)) = part.split_once('-') {
            let (start, end) = (number(start)?, number(end)?);
            if start > end {
                return Err(invalid());
            }
            set.extend(start..=end);
        } else {
            set.insert(number(part)?);
        }
    }
    Ok(set)
}

/// A periodic job with a single run-once entry point
#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &str;

    async fn run_once(&self) -> crate::Result<()>;
}

/// Runs a job at most once at a time
#[derive(Clone)]
pub struct JobRunner {
    job: Arc<dyn Job>,
    guard: Arc<Mutex<()>>,
}

impl JobRunner {
    pub fn new(job: Arc<dyn Job>) -> Self {
        Self {
            job,
            guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn name(&self) -> &str {
        self.job.name()
    }

    /// Run now unless a run is already in progress. Returns whether it ran.
    pub async fn run_now(&self) -> bool {
        let Ok(_running) = self.guard.try_lock() else {
            warn!(target: LOG_TARGET, "Job '{}' is still running, skipping", self.job.name());
            return false;
        };

        let started = std::time::Instant::now();
        info!(target: LOG_TARGET, "Job '{}' started", self.job.name());
        match self.job.run_once().await {
            Ok(()) => info!(
                target: LOG_TARGET,
                "Job '{}' finished in {}",
                self.job.name(),
                crate::utils::FormatUtils::format_duration(started.elapsed())
            ),
            Err(e) => error!(target: LOG_TARGET, "Job '{}' failed: {}", self.job.name(), e),
        }
        true
    }
}

/// Fires a job on its cron schedule until shutdown
pub struct PeriodicTrigger {
    runner: JobRunner,
    schedule: CronSchedule,
}

impl PeriodicTrigger {
    pub fn new(runner: JobRunner, schedule: CronSchedule) -> Self {
        Self { runner, schedule }
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            target: LOG_TARGET,
            "Scheduled '{}' on '{}' (UTC)",
            self.runner.name(),
            self.schedule
        );
        loop {
            if *shutdown.borrow() {
                break;
            }
            let now = Utc::now();
            let next = self.schedule.next_after(now);
            let wait = (next - now).to_std().unwrap_or_default();
            debug!(target: LOG_TARGET, "Next '{}' run at {}", self.runner.name(), next);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    self.runner.run_now().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!(target: LOG_TARGET, "Trigger for '{}' stopped", self.runner.name());
    }
}

/// Owns the periodic triggers and their shared shutdown signal
pub struct JobScheduler {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl JobScheduler {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            shutdown,
            handles: Vec::new(),
        }
    }

    /// Receiver other long-running tasks can watch for shutdown
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub fn add(&mut self, runner: JobRunner, schedule: CronSchedule) {
        let trigger = PeriodicTrigger::new(runner, schedule);
        self.handles.push(trigger.spawn(self.shutdown.subscribe()));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Signal shutdown and wait for in-flight runs to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(target: LOG_TARGET, "Trigger task ended abnormally: {}", e);
            }
        }
    }
}


// Changelog:
// - v1.2.0 (2026-09-30): Manual triggers share the per-job guard with the schedule.
// - v1.1.0 (2026-08-12): Ranges and lists in minute and hour fields.
// - v1.0.0 (2026-07-01): Cron-driven triggers replacing fixed intervals.
