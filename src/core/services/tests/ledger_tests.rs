use super::{at, repo};
use crate::{
    core::services::{
        budget_service::ExpenseAlert, ledger_service::UNCATEGORIZED, EngagementService,
        LedgerService,
    },
    domain::{
        notification::{BUDGET_ALERT, EXPENSE_ALERT},
        Allocation, AllocationRule, Expense, Income, Notification,
    },
    errors::OikosError,
};

#[test]
fn income_is_saved_with_its_allocations() {
    let repo = repo();
    let rules = vec![AllocationRule::percentage("Savings", 20.0)];
    let allocations =
        LedgerService::record_income(&repo, Income::new(1000.0, at(3, 1), "Salary"), &rules)
            .unwrap();
    assert_eq!(allocations.len(), 1);
    assert_eq!(repo.incomes().unwrap().len(), 1);
    let stored: Vec<Allocation> = repo.list().unwrap();
    assert_eq!(stored[0].amount, 200.0);
}

#[test]
fn non_positive_amounts_are_rejected() {
    let repo = repo();
    let err = LedgerService::record_income(&repo, Income::new(0.0, at(3, 1), "Nothing"), &[])
        .unwrap_err();
    assert!(matches!(err, OikosError::InvalidInput(_)));
    let err =
        LedgerService::record_expense(&repo, Expense::new(f64::NAN, at(3, 1), "?", "Food"), at(3, 1))
            .unwrap_err();
    assert!(matches!(err, OikosError::InvalidInput(_)));
}

#[test]
fn expense_over_balance_raises_expense_alert_but_is_saved() {
    let repo = repo();
    LedgerService::record_income(&repo, Income::new(100.0, at(3, 1), "Gift"), &[]).unwrap();
    let recorded = LedgerService::record_expense(
        &repo,
        Expense::new(150.0, at(3, 2), "Shoes", "Shopping"),
        at(3, 2),
    )
    .unwrap();
    assert!(matches!(
        recorded.alert,
        Some(ExpenseAlert::NegativeBalance { .. })
    ));
    assert_eq!(repo.expenses().unwrap().len(), 1);
    let inbox = EngagementService::inbox(&repo).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, EXPENSE_ALERT);
}

#[test]
fn nearing_category_limit_raises_budget_alert() {
    let repo = repo();
    LedgerService::record_income(&repo, Income::new(5000.0, at(3, 1), "Salary"), &[]).unwrap();
    repo.set_category_limit("Food", 500.0).unwrap();
    LedgerService::record_expense(&repo, Expense::new(300.0, at(3, 2), "Market", "Food"), at(3, 2))
        .unwrap();
    let recorded = LedgerService::record_expense(
        &repo,
        Expense::new(120.0, at(3, 5), "Market", "Food"),
        at(3, 5),
    )
    .unwrap();
    let alert = recorded.alert.unwrap();
    assert_eq!(alert.kind(), BUDGET_ALERT);
    let notifications: Vec<Notification> = repo.list().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].related_id.as_deref(), Some("Food"));
}

#[test]
fn blank_category_is_replaced() {
    let repo = repo();
    LedgerService::record_income(&repo, Income::new(500.0, at(3, 1), "Salary"), &[]).unwrap();
    let recorded =
        LedgerService::record_expense(&repo, Expense::new(10.0, at(3, 2), "Gum", " "), at(3, 2))
            .unwrap();
    assert_eq!(recorded.expense.category, UNCATEGORIZED);
    assert!(recorded.alert.is_none());
}

#[test]
fn notifications_can_be_marked_read() {
    let repo = repo();
    let first = Notification::new("a", "insight", at(3, 1));
    let second = Notification::new("b", "insight", at(3, 2));
    EngagementService::notify(&repo, &first).unwrap();
    EngagementService::notify(&repo, &second).unwrap();
    EngagementService::mark_read(&repo, &first.id).unwrap();
    let inbox = EngagementService::inbox(&repo).unwrap();
    assert_eq!(inbox[0].id, second.id);
    assert_eq!(EngagementService::unread_count(&inbox), 1);
    assert_eq!(EngagementService::mark_all_read(&repo).unwrap(), 1);
    assert_eq!(
        EngagementService::unread_count(&EngagementService::inbox(&repo).unwrap()),
        0
    );
    assert!(matches!(
        EngagementService::mark_read(&repo, "missing"),
        Err(OikosError::NotFound(_))
    ));
}

#[test]
fn achievement_progress_is_clamped() {
    let repo = repo();
    let achievement =
        EngagementService::update_progress(&repo, "saver", "First savings", 1.7).unwrap();
    assert!(achievement.achieved);
    assert_eq!(achievement.progress, 1.0);
}
