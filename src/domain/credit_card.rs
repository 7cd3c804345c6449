use serde::{Deserialize, Serialize};

use crate::domain::common::{new_id, Displayable, Identifiable, NamedEntity};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Elo,
    Amex,
    Hipercard,
    #[default]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub limit: f64,
    /// Day of month the invoice closes.
    #[serde(default = "default_closing_day")]
    pub closing_day: u32,
    /// Day of month the invoice is due.
    #[serde(rename = "dueDate", default = "default_due_day")]
    pub due_day: u32,
    #[serde(default)]
    pub brand: CardBrand,
}

fn default_closing_day() -> u32 {
    1
}

fn default_due_day() -> u32 {
    10
}

impl CreditCard {
    pub fn new(name: impl Into<String>, limit: f64, brand: CardBrand) -> Self {
        Self {
            id: new_id("card"),
            name: name.into(),
            limit,
            closing_day: default_closing_day(),
            due_day: default_due_day(),
            brand,
        }
    }

    pub fn with_cycle(mut self, closing_day: u32, due_day: u32) -> Self {
        self.closing_day = closing_day.clamp(1, 31);
        self.due_day = due_day.clamp(1, 31);
        self
    }
}

impl Identifiable for CreditCard {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for CreditCard {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for CreditCard {
    fn display_label(&self) -> String {
        format!(
            "{} limit {:.2} (closes {}, due {})",
            self.name, self.limit, self.closing_day, self.due_day
        )
    }
}
