//! Applying a financial plan over the user's rules, limits and savings boxes.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    domain::{AllocationRule, AllocationType, CategoryLimits, DeductionType, FinancialPlan},
    errors::Result,
    repository::{Collection, UserRepository},
};

/// Rules and limits derived from a plan, before they are written.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanChanges {
    pub rules: Vec<AllocationRule>,
    pub category_limits: CategoryLimits,
}

pub struct PlanService;

impl PlanService {
    /// Deductions keep their type; percentage deductions store the percent, fixed ones the
    /// amount. Every allocation becomes a fixed rule and spending allocations also become
    /// the new category limits.
    pub fn changes(plan: &FinancialPlan, now: DateTime<Utc>) -> PlanChanges {
        let stamp = now.timestamp_millis();
        let mut taken = HashSet::new();
        let mut rules = Vec::with_capacity(plan.deductions.len() + plan.allocations.len());

        for deduction in &plan.deductions {
            let (kind, value) = match deduction.kind {
                DeductionType::Percentage => (AllocationType::Percentage, deduction.value),
                DeductionType::Fixed => (AllocationType::FixedAmount, deduction.amount),
            };
            rules.push(AllocationRule {
                id: unique_rule_id(&deduction.name, stamp, &mut taken),
                name: deduction.name.clone(),
                kind,
                value,
            });
        }
        for allocation in &plan.allocations {
            rules.push(AllocationRule {
                id: unique_rule_id(&allocation.key, stamp, &mut taken),
                name: allocation.name.clone(),
                kind: AllocationType::FixedAmount,
                value: allocation.amount,
            });
        }

        let category_limits = plan
            .spending_allocations()
            .map(|allocation| (allocation.key.clone(), allocation.amount))
            .collect();

        PlanChanges {
            rules,
            category_limits,
        }
    }

    /// Replaces rules and category limits and clears savings boxes in one update.
    pub fn apply(
        repo: &UserRepository,
        plan: &FinancialPlan,
        now: DateTime<Utc>,
    ) -> Result<PlanChanges> {
        let changes = Self::changes(plan, now);
        let batch = repo
            .batch()
            .replace_all(&changes.rules)?
            .category_limits(&changes.category_limits)?
            .clear(Collection::SavingsBoxes)?;
        repo.apply(batch)?;
        info!(
            rules = changes.rules.len(),
            limits = changes.category_limits.len(),
            "financial plan applied"
        );
        Ok(changes)
    }
}

fn unique_rule_id(label: &str, stamp: i64, taken: &mut HashSet<String>) -> String {
    let mut base: String = label.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if base.is_empty() {
        base.push_str("rule");
    }
    let mut id = format!("{}_{}", base, stamp);
    let mut counter = 2;
    while !taken.insert(id.clone()) {
        id = format!("{}_{}_{}", base, stamp, counter);
        counter += 1;
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AllocationCategory, PlanAllocation, PlanDeduction, PlanProjection};
    use chrono::TimeZone;

    fn plan() -> FinancialPlan {
        FinancialPlan {
            monthly_income: 5000.0,
            plan_summary: "Balanced".into(),
            deductions: vec![
                PlanDeduction {
                    name: "Tithe (10%)".into(),
                    kind: DeductionType::Percentage,
                    value: 10.0,
                    amount: 500.0,
                },
                PlanDeduction {
                    name: "Rent".into(),
                    kind: DeductionType::Fixed,
                    value: 1500.0,
                    amount: 1500.0,
                },
            ],
            allocations: vec![
                PlanAllocation {
                    name: "Groceries".into(),
                    key: "Food".into(),
                    category: AllocationCategory::Spending,
                    amount: 900.0,
                },
                PlanAllocation {
                    name: "Reserve".into(),
                    key: "Food".into(),
                    category: AllocationCategory::Savings,
                    amount: 300.0,
                },
            ],
            projections: PlanProjection::default(),
        }
    }

    #[test]
    fn builds_rules_and_limits() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let changes = PlanService::changes(&plan(), now);
        let stamp = now.timestamp_millis();

        assert_eq!(changes.rules.len(), 4);
        assert_eq!(changes.rules[0].id, format!("Tithe10_{stamp}"));
        assert_eq!(changes.rules[0].kind, AllocationType::Percentage);
        assert_eq!(changes.rules[0].value, 10.0);
        assert_eq!(changes.rules[1].kind, AllocationType::FixedAmount);
        assert_eq!(changes.rules[1].value, 1500.0);
        assert_eq!(changes.rules[2].id, format!("Food_{stamp}"));
        assert_eq!(changes.rules[3].id, format!("Food_{stamp}_2"));
        assert_eq!(changes.category_limits.len(), 1);
        assert_eq!(changes.category_limits.get("Food"), Some(&900.0));
    }
}
