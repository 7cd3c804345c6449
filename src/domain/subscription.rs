use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::common::{new_id, Displayable, Identifiable, NamedEntity},
    time::{add_months, add_years},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn advance(self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            BillingCycle::Monthly => add_months(from, 1),
            BillingCycle::Yearly => add_years(from, 1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub billing_cycle: BillingCycle,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub first_bill_date: DateTime<Utc>,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Subscription {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        billing_cycle: BillingCycle,
        first_bill_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id("sub"),
            name: name.into(),
            amount,
            billing_cycle,
            first_bill_date,
            category: String::new(),
            is_active: true,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// First billing date that is not before `now`.
    pub fn next_billing_date(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut next = self.first_bill_date;
        while next < now {
            let advanced = self.billing_cycle.advance(next);
            if advanced <= next {
                break;
            }
            next = advanced;
        }
        next
    }

    /// Cost normalized to one month.
    pub fn monthly_cost(&self) -> f64 {
        match self.billing_cycle {
            BillingCycle::Monthly => self.amount,
            BillingCycle::Yearly => self.amount / 12.0,
        }
    }
}

impl Identifiable for Subscription {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Subscription {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Subscription {
    fn display_label(&self) -> String {
        let cycle = match self.billing_cycle {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        };
        format!("{} {:.2} {}", self.name, self.amount, cycle)
    }
}
