use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{new_id, Displayable, Identifiable};

/// Direction of a realized or templated money movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: String,
    pub amount: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
}

impl Income {
    pub fn new(amount: f64, date: DateTime<Utc>, description: impl Into<String>) -> Self {
        Self {
            id: new_id("inc"),
            amount,
            date,
            description: description.into(),
            source: String::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Free-form label such as "Credit Card", "Pix" or "Cash".
    #[serde(default)]
    pub payment_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_savings_box_id: Option<String>,
}

impl Expense {
    pub fn new(
        amount: f64,
        date: DateTime<Utc>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id("exp"),
            amount,
            date,
            description: description.into(),
            category: category.into(),
            payment_method: String::new(),
            related_savings_box_id: None,
        }
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }
}

/// A realized money movement: exactly one of income or expense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transaction {
    Income(Income),
    Expense(Expense),
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Income(_) => TransactionKind::Income,
            Transaction::Expense(_) => TransactionKind::Expense,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            Transaction::Income(income) => income.amount,
            Transaction::Expense(expense) => expense.amount,
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        match self {
            Transaction::Income(income) => income.date,
            Transaction::Expense(expense) => expense.date,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Transaction::Income(income) => &income.description,
            Transaction::Expense(expense) => &expense.description,
        }
    }

    /// Category for expenses, source for incomes.
    pub fn label(&self) -> &str {
        match self {
            Transaction::Income(income) => &income.source,
            Transaction::Expense(expense) => &expense.category,
        }
    }

    pub fn as_income(&self) -> Option<&Income> {
        match self {
            Transaction::Income(income) => Some(income),
            Transaction::Expense(_) => None,
        }
    }

    pub fn as_expense(&self) -> Option<&Expense> {
        match self {
            Transaction::Expense(expense) => Some(expense),
            Transaction::Income(_) => None,
        }
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> &str {
        match self {
            Transaction::Income(income) => &income.id,
            Transaction::Expense(expense) => &expense.id,
        }
    }
}

impl Identifiable for Income {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identifiable for Expense {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!(
            "{} {:.2} {} ({})",
            self.kind(),
            self.amount(),
            self.description(),
            self.date().format("%Y-%m-%d")
        )
    }
}

impl From<Income> for Transaction {
    fn from(income: Income) -> Self {
        Transaction::Income(income)
    }
}

impl From<Expense> for Transaction {
    fn from(expense: Expense) -> Self {
        Transaction::Expense(expense)
    }
}
