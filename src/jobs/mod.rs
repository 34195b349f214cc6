// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/mod.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file is the module declaration for the periodic jobs and the
// scheduler that drives them.
//
// Tree Location:
// - src/jobs/mod.rs (jobs module entry point)
// - Submodules: scheduler, broadcast, network_stats, customer_analysis

pub mod broadcast;
pub mod customer_analysis;
pub mod network_stats;
pub mod scheduler;

pub use broadcast::{BroadcastReport, broadcast};
pub use customer_analysis::{AnalysisRun, CustomerAnalysisJob};
pub use network_stats::{BlockHeightJob, HashPowerJob, Network};
pub use scheduler::{CronSchedule, Job, JobRunner, JobScheduler, PeriodicTrigger, ScheduleError};
