//! Dashboard metrics derived from the user's collections.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    domain::{
        common::sum_amounts, Allocation, Debt, Expense, Income, Investment, SavingsBox,
        Subscription,
    },
    errors::Result,
    repository::UserRepository,
    time::same_month,
};

use super::status_service::{FinancialStatus, StatusMetrics, StatusService};

/// Latest value of every collection a dashboard depends on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialInputs {
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
    pub allocations: Vec<Allocation>,
    pub savings_boxes: Vec<SavingsBox>,
    pub investments: Vec<Investment>,
    pub debts: Vec<Debt>,
    pub subscriptions: Vec<Subscription>,
}

impl FinancialInputs {
    /// One-shot read of every input collection.
    pub fn load(repo: &UserRepository) -> Result<Self> {
        Ok(Self {
            incomes: repo.list()?,
            expenses: repo.list()?,
            allocations: repo.list()?,
            savings_boxes: repo.list()?,
            investments: repo.list()?,
            debts: repo.list()?,
            subscriptions: repo.list()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingPayment {
    pub name: String,
    pub amount: f64,
    pub due: DateTime<Utc>,
}

/// All-time dashboard figures plus the current-month status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSnapshot {
    pub total_income: f64,
    pub total_expense: f64,
    pub total_allocated: f64,
    pub current_balance: f64,
    pub total_savings: f64,
    pub investment_value: f64,
    pub investment_profit_loss: f64,
    pub total_debt: f64,
    pub net_worth: f64,
    pub expenses_by_category: BTreeMap<String, f64>,
    pub subscriptions_total: f64,
    pub next_subscription: Option<UpcomingPayment>,
    pub status: FinancialStatus,
}

pub struct SummaryService;

impl SummaryService {
    pub fn snapshot(inputs: &FinancialInputs, now: DateTime<Utc>) -> FinancialSnapshot {
        let total_income = sum_amounts(inputs.incomes.iter().map(|i| i.amount));
        let total_expense = sum_amounts(inputs.expenses.iter().map(|e| e.amount));
        let total_allocated = sum_amounts(inputs.allocations.iter().map(|a| a.amount));
        let current_balance = Self::balance(total_income, total_expense, total_allocated);
        let total_savings = Self::total_savings(&inputs.savings_boxes);
        let investment_value = Self::investment_value(&inputs.investments);
        let total_debt = Self::total_debt(&inputs.debts);

        FinancialSnapshot {
            total_income,
            total_expense,
            total_allocated,
            current_balance,
            total_savings,
            investment_value,
            investment_profit_loss: Self::investment_profit_loss(&inputs.investments),
            total_debt,
            net_worth: Self::net_worth(current_balance, total_savings, investment_value, total_debt),
            expenses_by_category: Self::expenses_by_category(&inputs.expenses),
            subscriptions_total: Self::subscriptions_total(&inputs.subscriptions),
            next_subscription: Self::next_subscription(&inputs.subscriptions, now),
            status: StatusService::classify(&StatusMetrics::for_month(inputs, now)),
        }
    }

    pub fn balance(income: f64, expense: f64, allocated: f64) -> f64 {
        income - expense - allocated
    }

    /// All-time balance: income minus expenses minus allocations.
    pub fn current_balance(inputs: &FinancialInputs) -> f64 {
        Self::balance(
            sum_amounts(inputs.incomes.iter().map(|i| i.amount)),
            sum_amounts(inputs.expenses.iter().map(|e| e.amount)),
            sum_amounts(inputs.allocations.iter().map(|a| a.amount)),
        )
    }

    pub fn net_worth(balance: f64, savings: f64, investments: f64, debt: f64) -> f64 {
        balance + savings + investments - debt
    }

    pub fn total_savings(boxes: &[SavingsBox]) -> f64 {
        sum_amounts(boxes.iter().map(|b| b.current_amount))
    }

    pub fn investment_value(investments: &[Investment]) -> f64 {
        sum_amounts(investments.iter().map(Investment::market_value))
    }

    pub fn investment_profit_loss(investments: &[Investment]) -> f64 {
        sum_amounts(investments.iter().map(Investment::profit_loss))
    }

    pub fn total_debt(debts: &[Debt]) -> f64 {
        sum_amounts(debts.iter().map(|d| d.total_amount))
    }

    pub fn expenses_by_category<'a, I>(expenses: I) -> BTreeMap<String, f64>
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let mut totals = BTreeMap::new();
        for expense in expenses {
            if !expense.amount.is_finite() {
                continue;
            }
            *totals.entry(expense.category.clone()).or_insert(0.0) += expense.amount;
        }
        totals
    }

    /// Sum over active subscriptions.
    pub fn subscriptions_total(subscriptions: &[Subscription]) -> f64 {
        sum_amounts(
            subscriptions
                .iter()
                .filter(|s| s.is_active)
                .map(|s| s.amount),
        )
    }

    /// Active subscription billed soonest on or after `now`.
    pub fn next_subscription(
        subscriptions: &[Subscription],
        now: DateTime<Utc>,
    ) -> Option<UpcomingPayment> {
        subscriptions
            .iter()
            .filter(|s| s.is_active)
            .map(|s| UpcomingPayment {
                name: s.name.clone(),
                amount: s.amount,
                due: s.next_billing_date(now),
            })
            .min_by_key(|payment| payment.due)
    }

    pub fn month_income(incomes: &[Income], now: DateTime<Utc>) -> f64 {
        sum_amounts(
            incomes
                .iter()
                .filter(|i| same_month(i.date, now))
                .map(|i| i.amount),
        )
    }

    pub fn month_expense(expenses: &[Expense], now: DateTime<Utc>) -> f64 {
        sum_amounts(
            expenses
                .iter()
                .filter(|e| same_month(e.date, now))
                .map(|e| e.amount),
        )
    }
}
