use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    domain::common::{new_id, Displayable, Identifiable, NamedEntity},
    errors::OikosError,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub total_amount: f64,
    /// Annual percentage rate, e.g. `24.9` for 24.9 %.
    #[serde(rename = "interestRate", default)]
    pub annual_interest_rate: f64,
    #[serde(rename = "minimumPayment", default)]
    pub minimum_monthly_payment: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_offer_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_offer_details: Option<String>,
}

impl Debt {
    pub fn new(
        name: impl Into<String>,
        total_amount: f64,
        annual_interest_rate: f64,
        minimum_monthly_payment: f64,
    ) -> Self {
        Self {
            id: new_id("debt"),
            name: name.into(),
            total_amount,
            annual_interest_rate,
            minimum_monthly_payment,
            settlement_offer_amount: None,
            settlement_offer_details: None,
        }
    }

    pub fn with_settlement_offer(mut self, amount: f64, details: Option<String>) -> Self {
        self.settlement_offer_amount = Some(amount);
        self.settlement_offer_details = details;
        self
    }

    pub fn has_settlement_offer(&self) -> bool {
        self.settlement_offer_amount.is_some()
    }
}

impl Identifiable for Debt {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Debt {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Debt {
    fn display_label(&self) -> String {
        let mut label = format!(
            "{}: {:.2} at {:.2}% (min {:.2})",
            self.name, self.total_amount, self.annual_interest_rate, self.minimum_monthly_payment
        );
        if let Some(offer) = self.settlement_offer_amount {
            label.push_str(&format!(", settlement offer {:.2}", offer));
            if let Some(details) = &self.settlement_offer_details {
                label.push_str(&format!(" ({details})"));
            }
        }
        label
    }
}

/// Payoff prioritisation strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtStrategy {
    /// Highest interest rate first.
    #[default]
    Avalanche,
    /// Smallest balance first.
    Snowball,
}

impl fmt::Display for DebtStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebtStrategy::Avalanche => f.write_str("avalanche"),
            DebtStrategy::Snowball => f.write_str("snowball"),
        }
    }
}

impl FromStr for DebtStrategy {
    type Err = OikosError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "avalanche" => Ok(DebtStrategy::Avalanche),
            "snowball" => Ok(DebtStrategy::Snowball),
            other => Err(OikosError::InvalidInput(format!(
                "unknown debt strategy `{other}` (expected avalanche or snowball)"
            ))),
        }
    }
}
