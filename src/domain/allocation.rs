use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{new_id, Identifiable, NamedEntity};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationType {
    #[default]
    Percentage,
    FixedAmount,
}

/// Rule describing how part of every income is set aside.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: AllocationType,
    /// Percent for `Percentage` rules, currency amount for `FixedAmount` rules.
    #[serde(default)]
    pub value: f64,
}

impl AllocationRule {
    pub fn percentage(name: impl Into<String>, percent: f64) -> Self {
        Self {
            id: new_id("rule"),
            name: name.into(),
            kind: AllocationType::Percentage,
            value: percent,
        }
    }

    pub fn fixed(name: impl Into<String>, amount: f64) -> Self {
        Self {
            id: new_id("rule"),
            name: name.into(),
            kind: AllocationType::FixedAmount,
            value: amount,
        }
    }

    /// Human readable value, e.g. `10%` or `R$ 250.00`-style fixed amounts.
    pub fn value_label(&self) -> String {
        match self.kind {
            AllocationType::Percentage => format!("{}%", self.value),
            AllocationType::FixedAmount => format!("{:.2}", self.value),
        }
    }
}

impl Identifiable for AllocationRule {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for AllocationRule {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Money set aside by a rule when an income was recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub id: String,
    #[serde(default)]
    pub rule_name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
}

impl Allocation {
    pub fn new(rule_name: impl Into<String>, amount: f64, date: DateTime<Utc>) -> Self {
        Self {
            id: new_id("alloc"),
            rule_name: rule_name.into(),
            amount,
            date,
        }
    }
}

impl Identifiable for Allocation {
    fn id(&self) -> &str {
        &self.id
    }
}
