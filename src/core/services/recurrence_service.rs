//! Roll-forward of recurring templates into realized transactions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        new_id, Expense, Income, RecurringTransaction, Transaction, TransactionKind,
        RECURRING_LABEL,
    },
    time::{start_of_date, start_of_day},
};

/// Upper bound on occurrences materialized for a single template in one run.
pub const MAX_CATCH_UP_OCCURRENCES: usize = 366;

/// How many missed periods a single run materializes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatchUpPolicy {
    /// One transaction per run, dated now, and a single advance of the due date.
    #[default]
    AdvanceOnce,
    /// One transaction per missed period, each dated at its own due date.
    CatchUp,
}

/// What a run will write for one due template.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedOccurrence {
    pub transactions: Vec<Transaction>,
    /// Template with `last_generated_at` and `next_due_at` already advanced.
    pub template: RecurringTransaction,
}

pub struct RecurrenceService;

impl RecurrenceService {
    /// Active and due on or before the start of `today`.
    pub fn is_due(template: &RecurringTransaction, today: NaiveDate) -> bool {
        template.is_active && template.next_due_at <= start_of_date(today)
    }

    /// True when the template already produced a transaction on `today`.
    pub fn generated_on(template: &RecurringTransaction, today: NaiveDate) -> bool {
        template
            .last_generated_at
            .map(|ts| ts.date_naive() == today)
            .unwrap_or(false)
    }

    /// Builds the transaction for one occurrence dated `date`.
    pub fn realize(template: &RecurringTransaction, date: DateTime<Utc>) -> Transaction {
        match template.kind {
            TransactionKind::Income => {
                let source = template
                    .source
                    .clone()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| RECURRING_LABEL.to_string());
                let mut income =
                    Income::new(template.amount, date, template.name.clone()).with_source(source);
                income.id = new_id("auto_inc");
                income.into()
            }
            TransactionKind::Expense => {
                let category = template
                    .category
                    .clone()
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| RECURRING_LABEL.to_string());
                let mut expense =
                    Expense::new(template.amount, date, template.name.clone(), category);
                expense.id = new_id("auto_exp");
                expense.into()
            }
        }
    }

    /// One occurrence dated `now` plus the template advanced by a single period.
    pub fn materialize(
        template: &RecurringTransaction,
        now: DateTime<Utc>,
    ) -> (Transaction, RecurringTransaction) {
        let transaction = Self::realize(template, now);
        let mut advanced = template.clone();
        advanced.last_generated_at = Some(now);
        advanced.next_due_at = template.frequency.advance(template.next_due_at);
        (transaction, advanced)
    }

    /// Pure planning step for a run at `now`. Inactive, not yet due and already
    /// generated templates are left out.
    pub fn plan(
        templates: &[RecurringTransaction],
        now: DateTime<Utc>,
        policy: CatchUpPolicy,
    ) -> Vec<PlannedOccurrence> {
        let today = now.date_naive();
        templates
            .iter()
            .filter(|template| Self::is_due(template, today))
            .filter(|template| !Self::generated_on(template, today))
            .map(|template| match policy {
                CatchUpPolicy::AdvanceOnce => {
                    let (transaction, template) = Self::materialize(template, now);
                    PlannedOccurrence {
                        transactions: vec![transaction],
                        template,
                    }
                }
                CatchUpPolicy::CatchUp => Self::catch_up(template, now),
            })
            .collect()
    }

    fn catch_up(template: &RecurringTransaction, now: DateTime<Utc>) -> PlannedOccurrence {
        let cutoff = start_of_day(now);
        let mut advanced = template.clone();
        let mut transactions = Vec::new();
        while advanced.next_due_at <= cutoff && transactions.len() < MAX_CATCH_UP_OCCURRENCES {
            transactions.push(Self::realize(template, advanced.next_due_at));
            match advanced.frequency.checked_advance(advanced.next_due_at) {
                Some(next) if next > advanced.next_due_at => advanced.next_due_at = next,
                _ => break,
            }
        }
        advanced.last_generated_at = Some(now);
        PlannedOccurrence {
            transactions,
            template: advanced,
        }
    }
}
