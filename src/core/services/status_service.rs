//! Traffic-light classification of the user's financial health.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::sum_amounts;

use super::summary_service::{FinancialInputs, SummaryService};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinancialStatus {
    Bad,
    Warning,
    #[default]
    Neutral,
    Good,
    Excellent,
}

impl fmt::Display for FinancialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FinancialStatus::Bad => "BAD",
            FinancialStatus::Warning => "WARNING",
            FinancialStatus::Neutral => "NEUTRAL",
            FinancialStatus::Good => "GOOD",
            FinancialStatus::Excellent => "EXCELLENT",
        };
        f.write_str(label)
    }
}

/// Figures the classifier looks at. Income and expense cover the current month only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusMetrics {
    pub monthly_income: f64,
    pub monthly_expense: f64,
    pub allocated: f64,
    pub balance: f64,
    pub debt: f64,
    pub savings: f64,
    pub investments: f64,
    pub subscriptions: f64,
}

impl StatusMetrics {
    pub fn for_month(inputs: &FinancialInputs, now: DateTime<Utc>) -> Self {
        let monthly_income = SummaryService::month_income(&inputs.incomes, now);
        let monthly_expense = SummaryService::month_expense(&inputs.expenses, now);
        let allocated = sum_amounts(inputs.allocations.iter().map(|a| a.amount));
        Self {
            monthly_income,
            monthly_expense,
            allocated,
            balance: SummaryService::balance(monthly_income, monthly_expense, allocated),
            debt: SummaryService::total_debt(&inputs.debts),
            savings: SummaryService::total_savings(&inputs.savings_boxes),
            investments: SummaryService::investment_value(&inputs.investments),
            subscriptions: SummaryService::subscriptions_total(&inputs.subscriptions),
        }
    }

    fn outgoing(&self) -> f64 {
        self.monthly_expense + self.subscriptions
    }
}

pub struct StatusService;

impl StatusService {
    /// Checks run in order BAD, WARNING, EXCELLENT, GOOD; the first match wins.
    pub fn classify(m: &StatusMetrics) -> FinancialStatus {
        let reserves = m.savings + m.investments;
        if m.balance < 0.0
            || m.outgoing() > m.monthly_income
            || m.debt > m.monthly_income * 3.0
            || (reserves > 0.0 && m.debt > reserves * 0.5)
        {
            return FinancialStatus::Bad;
        }
        if m.debt > m.monthly_income * 1.5
            || m.outgoing() > m.monthly_income * 0.9
            || m.investments < m.debt * 0.5
        {
            return FinancialStatus::Warning;
        }
        if m.savings >= m.monthly_income * 6.0
            && m.debt == 0.0
            && m.monthly_income > m.outgoing()
            && m.investments > m.monthly_income * 12.0
        {
            return FinancialStatus::Excellent;
        }
        if m.monthly_income > m.outgoing()
            && m.savings > 0.0
            && m.debt <= m.monthly_income
            && m.investments > 0.0
        {
            return FinancialStatus::Good;
        }
        FinancialStatus::Neutral
    }
}
