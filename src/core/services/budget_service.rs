//! Category limits: monthly progress and the pre-check run before saving an expense.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    domain::{
        notification::{BUDGET_ALERT, EXPENSE_ALERT},
        CategoryLimits, Expense, Notification,
    },
    time::same_month,
};

use super::summary_service::SummaryService;

/// Share of a limit at which spending counts as nearing the limit.
pub const NEARING_LIMIT_PERCENT: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    NoLimit,
    Within,
    Nearing,
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBudget {
    pub category: String,
    pub limit: Option<f64>,
    pub spent: f64,
    pub level: BudgetLevel,
}

impl CategoryBudget {
    /// Percentage of the limit used, `None` without a positive limit.
    pub fn percent_used(&self) -> Option<f64> {
        self.limit
            .filter(|limit| *limit > 0.0)
            .map(|limit| self.spent / limit * 100.0)
    }

    pub fn remaining(&self) -> Option<f64> {
        self.limit.map(|limit| limit - self.spent)
    }
}

/// Warning raised while recording an expense.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseAlert {
    NegativeBalance {
        amount: f64,
        balance: f64,
    },
    LimitExceeded {
        category: String,
        amount: f64,
        limit: f64,
        spent: f64,
    },
    NearingLimit {
        category: String,
        amount: f64,
        limit: f64,
        spent: f64,
        percent: f64,
    },
}

impl ExpenseAlert {
    /// Notification type tag.
    pub fn kind(&self) -> &'static str {
        match self {
            ExpenseAlert::NegativeBalance { .. } => EXPENSE_ALERT,
            ExpenseAlert::LimitExceeded { .. } | ExpenseAlert::NearingLimit { .. } => {
                BUDGET_ALERT
            }
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            ExpenseAlert::NegativeBalance { .. } => None,
            ExpenseAlert::LimitExceeded { category, .. }
            | ExpenseAlert::NearingLimit { category, .. } => Some(category),
        }
    }

    pub fn message(&self) -> String {
        match self {
            ExpenseAlert::NegativeBalance { amount, balance } => format!(
                "An expense of {amount:.2} exceeds your current balance of {balance:.2} and will leave it negative."
            ),
            ExpenseAlert::LimitExceeded {
                category,
                amount,
                limit,
                spent,
            } => format!(
                "An expense of {amount:.2} in '{category}' goes over its limit of {limit:.2} ({spent:.2} already spent)."
            ),
            ExpenseAlert::NearingLimit {
                category,
                amount,
                limit,
                spent,
                percent,
            } => format!(
                "An expense of {amount:.2} in '{category}' brings spending to {percent:.0}% of its {limit:.2} limit ({spent:.2} already spent)."
            ),
        }
    }

    pub fn to_notification(&self, now: DateTime<Utc>) -> Notification {
        let notification = Notification::new(self.message(), self.kind(), now);
        match self.category() {
            Some(category) => notification.related_to(category),
            None => notification,
        }
    }
}

pub struct BudgetService;

impl BudgetService {
    /// Spending per category for the month containing `now`, joined with the limits.
    /// Categories with spending but no limit are reported as `NoLimit`.
    pub fn progress(
        limits: &CategoryLimits,
        expenses: &[Expense],
        now: DateTime<Utc>,
    ) -> Vec<CategoryBudget> {
        let spending = Self::month_spending(expenses, now);
        let categories: BTreeSet<&String> = limits.keys().chain(spending.keys()).collect();
        categories
            .into_iter()
            .map(|category| {
                let limit = limits.get(category).copied();
                let spent = spending.get(category).copied().unwrap_or(0.0);
                CategoryBudget {
                    category: category.clone(),
                    limit,
                    spent,
                    level: Self::level(spent, limit),
                }
            })
            .collect()
    }

    pub fn month_spending(expenses: &[Expense], now: DateTime<Utc>) -> BTreeMap<String, f64> {
        SummaryService::expenses_by_category(expenses.iter().filter(|e| same_month(e.date, now)))
    }

    pub fn level(spent: f64, limit: Option<f64>) -> BudgetLevel {
        match limit {
            None => BudgetLevel::NoLimit,
            Some(limit) if spent > limit => BudgetLevel::Exceeded,
            Some(limit) if limit > 0.0 && spent / limit * 100.0 >= NEARING_LIMIT_PERCENT => {
                BudgetLevel::Nearing
            }
            Some(_) => BudgetLevel::Within,
        }
    }

    /// Balance check first; the category limit is only consulted when the balance covers
    /// the expense.
    pub fn check_expense(
        balance: f64,
        category: &str,
        amount: f64,
        limit: Option<f64>,
        spent_in_category: f64,
    ) -> Option<ExpenseAlert> {
        if balance < amount {
            return Some(ExpenseAlert::NegativeBalance { amount, balance });
        }
        let limit = limit?;
        let new_spent = spent_in_category + amount;
        match Self::level(new_spent, Some(limit)) {
            BudgetLevel::Exceeded => Some(ExpenseAlert::LimitExceeded {
                category: category.to_string(),
                amount,
                limit,
                spent: spent_in_category,
            }),
            BudgetLevel::Nearing => Some(ExpenseAlert::NearingLimit {
                category: category.to_string(),
                amount,
                limit,
                spent: spent_in_category,
                percent: new_spent / limit * 100.0,
            }),
            BudgetLevel::Within | BudgetLevel::NoLimit => None,
        }
    }
}
