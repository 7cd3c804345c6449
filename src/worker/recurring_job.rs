//! Daily roll-forward of recurring templates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    core::services::{CatchUpPolicy, PlannedOccurrence, RecurrenceService},
    domain::RecurringTransaction,
    errors::Result,
    repository::UserRepository,
    time::Clock,
};

use super::PeriodicJob;

pub const RECURRING_JOB_NAME: &str = "RecurringTransactionWorker";

/// Template whose occurrence could not be committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollForwardFailure {
    pub template_id: String,
    pub error: String,
}

/// Outcome of one roll-forward run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollForwardReport {
    pub run_at: DateTime<Utc>,
    /// Templates read from the store.
    pub processed: usize,
    /// Transactions written.
    pub generated: usize,
    /// Templates inactive, not due, or already generated today.
    pub skipped: usize,
    pub failures: Vec<RollForwardFailure>,
    pub load_error: Option<String>,
}

impl RollForwardReport {
    fn empty(run_at: DateTime<Utc>) -> Self {
        Self {
            run_at,
            processed: 0,
            generated: 0,
            skipped: 0,
            failures: Vec::new(),
            load_error: None,
        }
    }

    /// True when no template failed and the templates could be read.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.load_error.is_none()
    }
}

/// Materializes due templates for one user.
pub struct RecurringTransactionJob {
    repo: UserRepository,
    clock: Arc<dyn Clock>,
    policy: CatchUpPolicy,
}

impl RecurringTransactionJob {
    pub fn new(repo: UserRepository, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            policy: CatchUpPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CatchUpPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> CatchUpPolicy {
        self.policy
    }

    /// Runs at the clock's current time.
    pub fn run_now(&self) -> RollForwardReport {
        self.run_once(self.clock.now())
    }

    /// Each due template is committed in its own batch together with its advanced
    /// schedule, so a failing template leaves the others untouched.
    pub fn run_once(&self, now: DateTime<Utc>) -> RollForwardReport {
        let mut report = RollForwardReport::empty(now);
        let templates: Vec<RecurringTransaction> = match self.repo.list() {
            Ok(templates) => templates,
            Err(err) => {
                warn!(user = %self.repo.user_id(), error = %err, "failed to load recurring templates");
                report.load_error = Some(err.to_string());
                return report;
            }
        };
        report.processed = templates.len();

        let planned = RecurrenceService::plan(&templates, now, self.policy);
        report.skipped = templates.len() - planned.len();
        for occurrence in planned {
            let template_id = occurrence.template.id.clone();
            let count = occurrence.transactions.len();
            match self.commit(&occurrence) {
                Ok(()) => {
                    debug!(template = %template_id, generated = count, "template rolled forward");
                    report.generated += count;
                }
                Err(err) => {
                    warn!(template = %template_id, error = %err, "failed to roll template forward");
                    report.failures.push(RollForwardFailure {
                        template_id,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            user = %self.repo.user_id(),
            processed = report.processed,
            generated = report.generated,
            failed = report.failures.len(),
            "recurring roll-forward finished"
        );
        report
    }

    fn commit(&self, occurrence: &PlannedOccurrence) -> Result<()> {
        let mut batch = self.repo.batch();
        for transaction in &occurrence.transactions {
            batch = batch.put_transaction(transaction)?;
        }
        batch = batch.put(&occurrence.template)?;
        self.repo.apply(batch)
    }
}

impl PeriodicJob for RecurringTransactionJob {
    fn name(&self) -> &str {
        RECURRING_JOB_NAME
    }

    fn run(&self) {
        let report = self.run_now();
        if !report.is_success() {
            warn!(
                failures = report.failures.len(),
                load_error = report.load_error.as_deref().unwrap_or(""),
                "recurring roll-forward completed with errors"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Expense, Frequency, TransactionKind},
        store::MemoryStore,
        time::FixedClock,
    };
    use chrono::TimeZone;

    #[test]
    fn run_once_reports_counts() {
        let repo = UserRepository::new(Arc::new(MemoryStore::new()), "job").unwrap();
        let due = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        repo.save(&RecurringTransaction::new(
            "Gym",
            40.0,
            TransactionKind::Expense,
            Frequency::Monthly,
            due,
        ))
        .unwrap();
        repo.save(&RecurringTransaction::new(
            "Later",
            10.0,
            TransactionKind::Expense,
            Frequency::Monthly,
            later,
        ))
        .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap();
        let job = RecurringTransactionJob::new(repo.clone(), Arc::new(FixedClock::new(now)));
        let report = job.run_now();
        assert!(report.is_success());
        assert_eq!(report.processed, 2);
        assert_eq!(report.generated, 1);
        assert_eq!(report.skipped, 1);
        let expenses: Vec<Expense> = repo.list().unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].category, crate::domain::RECURRING_LABEL);
    }
}
