mod common;

use std::sync::Arc;

use common::{memory_repo, ts, FailingStore};
use oikos_core::{
    core::services::CatchUpPolicy,
    domain::{Expense, Frequency, Income, RecurringTransaction, TransactionKind},
    repository::UserRepository,
    time::FixedClock,
    worker::RecurringTransactionJob,
};

fn job(repo: &UserRepository, now: chrono::DateTime<chrono::Utc>) -> RecurringTransactionJob {
    RecurringTransactionJob::new(repo.clone(), Arc::new(FixedClock::new(now)))
}

#[test]
fn due_template_generates_one_transaction_and_advances() {
    let repo = memory_repo("alice");
    let salary = RecurringTransaction::new(
        "Salary",
        4200.0,
        TransactionKind::Income,
        Frequency::Monthly,
        ts(2024, 1, 31, 0),
    )
    .with_source("ACME");
    repo.save(&salary).unwrap();

    let now = ts(2024, 1, 31, 7);
    let report = job(&repo, now).run_now();
    assert_eq!(report.generated, 1);

    let incomes: Vec<Income> = repo.list().unwrap();
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0].amount, 4200.0);
    assert_eq!(incomes[0].source, "ACME");
    assert_eq!(incomes[0].date, now);

    let stored: RecurringTransaction = repo.get(&salary.id).unwrap().unwrap();
    assert_eq!(stored.next_due_at, ts(2024, 2, 29, 0));
    assert_eq!(stored.last_generated_at, Some(now));
}

#[test]
fn future_and_inactive_templates_are_untouched() {
    let repo = memory_repo("bob");
    let future = RecurringTransaction::new(
        "Insurance",
        80.0,
        TransactionKind::Expense,
        Frequency::Yearly,
        ts(2024, 6, 1, 0),
    );
    let paused = RecurringTransaction::new(
        "Gym",
        30.0,
        TransactionKind::Expense,
        Frequency::Monthly,
        ts(2024, 1, 1, 0),
    )
    .paused();
    repo.save(&future).unwrap();
    repo.save(&paused).unwrap();

    let report = job(&repo, ts(2024, 3, 1, 12)).run_now();
    assert_eq!(report.generated, 0);
    assert_eq!(report.skipped, 2);
    assert!(repo.expenses().unwrap().is_empty());
    assert_eq!(repo.get::<RecurringTransaction>(&future.id).unwrap(), Some(future));
    assert_eq!(repo.get::<RecurringTransaction>(&paused.id).unwrap(), Some(paused));
}

#[test]
fn second_run_on_the_same_day_generates_nothing() {
    let repo = memory_repo("carol");
    // Far behind, so the advanced due date is still in the past after one run.
    repo.save(&RecurringTransaction::new(
        "Rent",
        900.0,
        TransactionKind::Expense,
        Frequency::Weekly,
        ts(2024, 1, 1, 0),
    ))
    .unwrap();

    let first = job(&repo, ts(2024, 3, 1, 6)).run_now();
    let second = job(&repo, ts(2024, 3, 1, 18)).run_now();
    assert_eq!(first.generated, 1);
    assert_eq!(second.generated, 0);
    assert_eq!(repo.expenses().unwrap().len(), 1);

    let next_day = job(&repo, ts(2024, 3, 2, 6)).run_now();
    assert_eq!(next_day.generated, 1);
}

#[test]
fn catch_up_policy_backfills_missed_periods() {
    let repo = memory_repo("dan");
    let template = RecurringTransaction::new(
        "Streaming",
        15.0,
        TransactionKind::Expense,
        Frequency::Monthly,
        ts(2024, 1, 10, 0),
    )
    .with_category("Leisure");
    repo.save(&template).unwrap();

    let report = job(&repo, ts(2024, 4, 12, 9))
        .with_policy(CatchUpPolicy::CatchUp)
        .run_now();
    assert_eq!(report.generated, 4);

    let mut dates: Vec<_> = repo
        .list::<Expense>()
        .unwrap()
        .into_iter()
        .map(|expense| expense.date)
        .collect();
    dates.sort();
    assert_eq!(
        dates,
        vec![
            ts(2024, 1, 10, 0),
            ts(2024, 2, 10, 0),
            ts(2024, 3, 10, 0),
            ts(2024, 4, 10, 0)
        ]
    );
    let stored: RecurringTransaction = repo.get(&template.id).unwrap().unwrap();
    assert_eq!(stored.next_due_at, ts(2024, 5, 10, 0));
}

#[test]
fn failing_template_does_not_block_the_others() {
    let store = FailingStore::new();
    let repo = UserRepository::new(store.clone(), "erin").unwrap();
    let broken = RecurringTransaction::new(
        "Broken",
        10.0,
        TransactionKind::Expense,
        Frequency::Daily,
        ts(2024, 5, 1, 0),
    );
    let healthy = RecurringTransaction::new(
        "Healthy",
        20.0,
        TransactionKind::Expense,
        Frequency::Daily,
        ts(2024, 5, 1, 0),
    );
    repo.save(&broken).unwrap();
    repo.save(&healthy).unwrap();
    store.poison(&broken.id);

    let report = job(&repo, ts(2024, 5, 1, 9)).run_now();
    assert_eq!(report.generated, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].template_id, broken.id);

    let expenses = repo.expenses().unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, 20.0);

    store.heal();
    let unchanged: RecurringTransaction = repo.get(&broken.id).unwrap().unwrap();
    assert_eq!(unchanged.next_due_at, ts(2024, 5, 1, 0));
    assert_eq!(unchanged.last_generated_at, None);
}

#[test]
fn unreadable_templates_are_reported() {
    let store = FailingStore::new();
    let repo = UserRepository::new(store.clone(), "frank").unwrap();
    store.poison("recurringTransactions");

    let report = job(&repo, ts(2024, 5, 1, 9)).run_now();
    assert!(!report.is_success());
    assert!(report.load_error.is_some());
    assert_eq!(report.generated, 0);
}
