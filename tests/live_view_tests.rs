mod common;

use std::sync::{Arc, Mutex};

use common::{memory_repo, ts};
use oikos_core::{
    core::{
        services::{BudgetLevel, CategoryBudget, FinancialSnapshot, LedgerService},
        BudgetView, DashboardView,
    },
    domain::{Debt, Expense, Income, SavingsBox},
    time::{Clock, FixedClock},
};

fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(ts(2024, 6, 15, 12)))
}

#[test]
fn dashboard_recomputes_on_every_collection_change() {
    let repo = memory_repo("dash");
    let snapshots: Arc<Mutex<Vec<FinancialSnapshot>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&snapshots);
    let view = DashboardView::watch(&repo, clock(), move |snapshot| {
        sink.lock().unwrap().push(snapshot)
    })
    .unwrap();
    assert_eq!(view.input_count(), 7);
    assert_eq!(snapshots.lock().unwrap().len(), 1);

    repo.save(&Income::new(3000.0, ts(2024, 6, 1, 9), "Salary"))
        .unwrap();
    repo.save(&Expense::new(500.0, ts(2024, 6, 2, 9), "Groceries", "Food"))
        .unwrap();
    repo.save(&Debt::new("Card", 1200.0, 19.0, 60.0)).unwrap();
    let mut savings = SavingsBox::new("Trip", 2000.0);
    savings.current_amount = 300.0;
    repo.save(&savings).unwrap();

    let latest = snapshots.lock().unwrap().last().cloned().unwrap();
    assert_eq!(latest.current_balance, 2500.0);
    assert_eq!(latest.total_debt, 1200.0);
    assert_eq!(latest.total_savings, 300.0);
    assert_eq!(latest.net_worth, 2500.0 + 300.0 - 1200.0);
    assert_eq!(latest.expenses_by_category.get("Food"), Some(&500.0));
    assert_eq!(snapshots.lock().unwrap().len(), 5);
}

#[test]
fn cancelled_dashboard_stops_emitting() {
    let repo = memory_repo("dash-cancel");
    let count = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&count);
    let view = DashboardView::watch(&repo, clock(), move |_| *sink.lock().unwrap() += 1).unwrap();
    repo.save(&Income::new(10.0, ts(2024, 6, 1, 9), "Gift")).unwrap();
    assert_eq!(*count.lock().unwrap(), 2);

    view.cancel();
    repo.save(&Income::new(10.0, ts(2024, 6, 2, 9), "Gift")).unwrap();
    assert_eq!(*count.lock().unwrap(), 2);
}

#[test]
fn budget_view_tracks_limits_and_month_spending() {
    let repo = memory_repo("budget");
    let latest: Arc<Mutex<Vec<CategoryBudget>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&latest);
    let _view = BudgetView::watch(&repo, clock(), move |budgets| {
        *sink.lock().unwrap() = budgets
    })
    .unwrap();
    assert!(latest.lock().unwrap().is_empty());

    repo.set_category_limit("Food", 100.0).unwrap();
    LedgerService::record_income(&repo, Income::new(1000.0, ts(2024, 6, 1, 9), "Salary"), &[])
        .unwrap();
    // Last month's spending does not count.
    repo.save(&Expense::new(90.0, ts(2024, 5, 20, 9), "Old", "Food"))
        .unwrap();
    repo.save(&Expense::new(85.0, ts(2024, 6, 3, 9), "Market", "Food"))
        .unwrap();
    repo.save(&Expense::new(12.0, ts(2024, 6, 4, 9), "Bus", "Transport"))
        .unwrap();

    let budgets = latest.lock().unwrap().clone();
    assert_eq!(budgets.len(), 2);
    let food = budgets.iter().find(|b| b.category == "Food").unwrap();
    assert_eq!(food.spent, 85.0);
    assert_eq!(food.level, BudgetLevel::Nearing);
    let transport = budgets.iter().find(|b| b.category == "Transport").unwrap();
    assert_eq!(transport.level, BudgetLevel::NoLimit);
}
