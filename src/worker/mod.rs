//! Background jobs: a thread-per-job scheduler and the recurring roll-forward.

pub mod recurring_job;
pub mod scheduler;

pub use recurring_job::{
    RecurringTransactionJob, RollForwardFailure, RollForwardReport, RECURRING_JOB_NAME,
};
pub use scheduler::{JobHandle, PeriodicJob, Schedule, Scheduler};
