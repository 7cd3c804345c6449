//! Spending categories and the per-category limits kept in settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::common::{new_id, Displayable, Identifiable, NamedEntity};

/// Category label used for expenses materialized from recurring templates
/// and for the income source of recurring incomes.
pub const RECURRING_LABEL: &str = "Recurring";

/// Category label attached to transfers into savings boxes.
pub const TRANSFER_CATEGORY: &str = "Transfer";

/// Spending limit per category name, stored under `settings/category_limits`.
pub type CategoryLimits = BTreeMap<String, f64>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// False for the predefined set seeded on first use.
    #[serde(default = "default_custom")]
    pub is_custom: bool,
}

fn default_custom() -> bool {
    true
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id("cat"),
            name: name.into(),
            is_custom: true,
        }
    }

    pub fn predefined(name: impl Into<String>) -> Self {
        Self {
            is_custom: false,
            ..Self::new(name)
        }
    }
}

impl Identifiable for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        if self.is_custom {
            format!("{} (custom)", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Names offered before the user creates any category.
pub fn default_category_names() -> &'static [&'static str] {
    &[
        "Food",
        "Housing",
        "Transport",
        "Health",
        "Education",
        "Leisure",
        "Shopping",
        "Bills",
        "Other",
    ]
}
