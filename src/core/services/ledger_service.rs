//! Recording incomes and expenses against a user's repository.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    domain::{Allocation, AllocationRule, Expense, Income, Transaction},
    errors::{OikosError, Result},
    repository::UserRepository,
};

use super::{
    allocation_service::AllocationService,
    budget_service::{BudgetService, ExpenseAlert},
    summary_service::{FinancialInputs, SummaryService},
};

/// Category used when an expense is recorded without one.
pub const UNCATEGORIZED: &str = "Other";

/// Result of recording an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedExpense {
    pub expense: Expense,
    pub alert: Option<ExpenseAlert>,
}

pub struct LedgerService;

impl LedgerService {
    /// Saves the income together with the allocations produced by `rules`.
    pub fn record_income(
        repo: &UserRepository,
        income: Income,
        rules: &[AllocationRule],
    ) -> Result<Vec<Allocation>> {
        validate_amount(income.amount)?;
        let allocations = AllocationService::allocate(&income, rules);
        let mut batch = repo.batch().put(&income)?;
        for allocation in &allocations {
            batch = batch.put(allocation)?;
        }
        repo.apply(batch)?;
        info!(
            income = %income.id,
            amount = income.amount,
            allocations = allocations.len(),
            "income recorded"
        );
        Ok(allocations)
    }

    /// Runs the balance and category limit pre-check, stores a notification when it
    /// raises an alert, then saves the expense. Alerts never block the expense.
    pub fn record_expense(
        repo: &UserRepository,
        mut expense: Expense,
        now: DateTime<Utc>,
    ) -> Result<RecordedExpense> {
        validate_amount(expense.amount)?;
        if expense.category.trim().is_empty() {
            expense.category = UNCATEGORIZED.to_string();
        }

        let inputs = FinancialInputs {
            incomes: repo.incomes()?,
            expenses: repo.expenses()?,
            allocations: repo.list()?,
            ..FinancialInputs::default()
        };
        let balance = SummaryService::current_balance(&inputs);
        let limits = repo.category_limits()?;
        let spent = BudgetService::month_spending(&inputs.expenses, now)
            .get(&expense.category)
            .copied()
            .unwrap_or(0.0);

        let alert = BudgetService::check_expense(
            balance,
            &expense.category,
            expense.amount,
            limits.get(&expense.category).copied(),
            spent,
        );
        if let Some(alert) = &alert {
            warn!(category = %expense.category, kind = alert.kind(), "expense alert raised");
            repo.save(&alert.to_notification(now))?;
        }

        repo.save(&expense)?;
        info!(expense = %expense.id, amount = expense.amount, "expense recorded");
        Ok(RecordedExpense { expense, alert })
    }

    pub fn delete_transaction(repo: &UserRepository, transaction: &Transaction) -> Result<()> {
        match transaction {
            Transaction::Income(income) => repo.delete::<Income>(&income.id),
            Transaction::Expense(expense) => repo.delete::<Expense>(&expense.id),
        }
    }
}

pub(crate) fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(OikosError::InvalidInput(format!(
            "amount must be a positive number, got {amount}"
        )));
    }
    Ok(())
}
