//! Financial plan documents that can be applied over the current rules.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeductionType {
    Percentage,
    #[serde(alias = "FIXED_AMOUNT")]
    Fixed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationCategory {
    Savings,
    Spending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanDeduction {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeductionType,
    /// Percent or fixed value as entered.
    pub value: f64,
    /// Currency amount this deduction takes from the monthly income.
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanAllocation {
    pub name: String,
    pub key: String,
    pub category: AllocationCategory,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanProjection {
    #[serde(default)]
    pub twelve_months_savings: f64,
    #[serde(default)]
    pub projection_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialPlan {
    pub monthly_income: f64,
    #[serde(default)]
    pub plan_summary: String,
    #[serde(default)]
    pub deductions: Vec<PlanDeduction>,
    #[serde(default)]
    pub allocations: Vec<PlanAllocation>,
    #[serde(default)]
    pub projections: PlanProjection,
}

impl FinancialPlan {
    pub fn spending_allocations(&self) -> impl Iterator<Item = &PlanAllocation> {
        self.allocations
            .iter()
            .filter(|allocation| allocation.category == AllocationCategory::Spending)
    }

    pub fn total_deductions(&self) -> f64 {
        self.deductions.iter().map(|d| d.amount).sum()
    }

    pub fn total_allocated(&self) -> f64 {
        self.allocations.iter().map(|a| a.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_document() {
        let json = r#"{
            "monthlyIncome": 5000.0,
            "planSummary": "Balanced",
            "deductions": [{"name": "Tithe", "type": "PERCENTAGE", "value": 10.0, "amount": 500.0}],
            "allocations": [
                {"name": "Groceries", "key": "Food", "category": "SPENDING", "amount": 1200.0},
                {"name": "Emergency", "key": "emergency", "category": "SAVINGS", "amount": 800.0}
            ],
            "projections": {"twelveMonthsSavings": 9600.0, "projectionSummary": "ok"}
        }"#;
        let plan: FinancialPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.deductions[0].kind, DeductionType::Percentage);
        assert_eq!(plan.spending_allocations().count(), 1);
        assert_eq!(plan.total_allocated(), 2000.0);
    }
}
