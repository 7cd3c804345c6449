use serde::{Deserialize, Serialize};

use crate::domain::common::{new_id, Displayable, Identifiable, NamedEntity};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestmentType {
    Stock,
    Crypto,
    Fund,
    #[default]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(rename = "type", default)]
    pub kind: InvestmentType,
    #[serde(default)]
    pub quantity: f64,
    /// Average price paid per unit.
    #[serde(default)]
    pub purchase_price: f64,
    /// Last price entered by the user.
    #[serde(default)]
    pub current_price: f64,
}

impl Investment {
    pub fn new(
        name: impl Into<String>,
        kind: InvestmentType,
        quantity: f64,
        purchase_price: f64,
    ) -> Self {
        Self {
            id: new_id("inv"),
            name: name.into(),
            ticker: String::new(),
            kind,
            quantity,
            purchase_price,
            current_price: purchase_price,
        }
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = ticker.into();
        self
    }

    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = price;
        self
    }

    pub fn market_value(&self) -> f64 {
        self.quantity * self.current_price
    }

    pub fn profit_loss(&self) -> f64 {
        (self.current_price - self.purchase_price) * self.quantity
    }
}

impl Identifiable for Investment {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Investment {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Investment {
    fn display_label(&self) -> String {
        if self.ticker.is_empty() {
            format!("{} x{}", self.name, self.quantity)
        } else {
            format!("{} ({}) x{}", self.name, self.ticker, self.quantity)
        }
    }
}
