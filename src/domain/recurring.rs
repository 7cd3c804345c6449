use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        common::{new_id, Displayable, Identifiable, NamedEntity},
        transaction::TransactionKind,
    },
    time::{checked_add_months, checked_add_years},
};

/// Repetition cadence of a recurring template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the occurrence one unit after `from`, keeping the time of day.
    ///
    /// Monthly and yearly steps keep the day of month where the target month has it
    /// and otherwise land on the target month's last day (Jan 31 -> Feb 28/29).
    /// Saturates at `DateTime::<Utc>::MAX_UTC` past the end of the calendar.
    pub fn advance(self, from: DateTime<Utc>) -> DateTime<Utc> {
        self.checked_advance(from).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// One unit after `from`, or `None` when that is not representable.
    pub fn checked_advance(self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Frequency::Daily => from.checked_add_signed(Duration::days(1)),
            Frequency::Weekly => from.checked_add_signed(Duration::weeks(1)),
            Frequency::Monthly => checked_add_months(from, 1),
            Frequency::Yearly => checked_add_years(from, 1),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Template that the daily roll-forward job turns into realized transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTransaction {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub amount: f64,
    #[serde(rename = "type", default)]
    pub kind: TransactionKind,
    /// Used for expenses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Used for incomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(
        rename = "lastGeneratedDate",
        default,
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub last_generated_at: Option<DateTime<Utc>>,
    #[serde(rename = "nextDueDate", with = "chrono::serde::ts_milliseconds")]
    pub next_due_at: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl RecurringTransaction {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        kind: TransactionKind,
        frequency: Frequency,
        next_due_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id("rt"),
            name: name.into(),
            amount,
            kind,
            category: None,
            source: None,
            frequency,
            last_generated_at: None,
            next_due_at,
            is_active: true,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn paused(mut self) -> Self {
        self.is_active = false;
        self
    }
}

impl Identifiable for RecurringTransaction {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for RecurringTransaction {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for RecurringTransaction {
    fn display_label(&self) -> String {
        format!(
            "{} {} {:.2} (next {})",
            self.frequency,
            self.name,
            self.amount,
            self.next_due_at.format("%Y-%m-%d")
        )
    }
}
