use super::{at, repo};
use crate::{
    core::services::PlanService,
    domain::{
        AllocationCategory, AllocationRule, DeductionType, FinancialPlan, PlanAllocation,
        PlanDeduction, PlanProjection, SavingsBox,
    },
};

#[test]
fn apply_replaces_rules_limits_and_clears_boxes() {
    let repo = repo();
    repo.save(&AllocationRule::fixed("Old rule", 50.0)).unwrap();
    repo.save(&SavingsBox::new("Old box", 100.0)).unwrap();
    repo.set_category_limit("Leisure", 200.0).unwrap();

    let plan = FinancialPlan {
        monthly_income: 4000.0,
        plan_summary: String::new(),
        deductions: vec![PlanDeduction {
            name: "Tax".into(),
            kind: DeductionType::Percentage,
            value: 15.0,
            amount: 600.0,
        }],
        allocations: vec![PlanAllocation {
            name: "Groceries".into(),
            key: "Food".into(),
            category: AllocationCategory::Spending,
            amount: 800.0,
        }],
        projections: PlanProjection::default(),
    };
    PlanService::apply(&repo, &plan, at(5, 1)).unwrap();

    let rules: Vec<AllocationRule> = repo.list().unwrap();
    assert_eq!(rules.len(), 2);
    assert!(rules.iter().all(|r| r.name != "Old rule"));
    let limits = repo.category_limits().unwrap();
    assert_eq!(limits.len(), 1);
    assert_eq!(limits.get("Food"), Some(&800.0));
    assert!(repo.list::<SavingsBox>().unwrap().is_empty());
}
