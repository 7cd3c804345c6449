use serde::{Deserialize, Serialize};

use crate::domain::common::{new_id, Displayable, Identifiable, NamedEntity};

/// Savings goal funded by transfers out of the available balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavingsBox {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(default)]
    pub monthly_contribution_target: f64,
}

impl SavingsBox {
    pub fn new(name: impl Into<String>, target_amount: f64) -> Self {
        Self {
            id: new_id("box"),
            name: name.into(),
            target_amount,
            current_amount: 0.0,
            monthly_contribution_target: 0.0,
        }
    }

    pub fn with_monthly_target(mut self, amount: f64) -> Self {
        self.monthly_contribution_target = amount;
        self
    }

    /// Fraction of the target reached, in `0.0..=1.0`. Zero targets report zero.
    pub fn progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }
        (self.current_amount / self.target_amount).clamp(0.0, 1.0)
    }

    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }
}

impl Identifiable for SavingsBox {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for SavingsBox {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for SavingsBox {
    fn display_label(&self) -> String {
        format!(
            "{}: {:.2} / {:.2} ({:.0}%)",
            self.name,
            self.current_amount,
            self.target_amount,
            self.progress() * 100.0
        )
    }
}
