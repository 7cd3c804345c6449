use crate::domain::{Allocation, AllocationRule, AllocationType, Income};

pub struct AllocationService;

impl AllocationService {
    /// Amount a rule sets aside from `income_amount`.
    pub fn amount_for(rule: &AllocationRule, income_amount: f64) -> f64 {
        match rule.kind {
            AllocationType::Percentage => income_amount * rule.value / 100.0,
            AllocationType::FixedAmount => rule.value,
        }
    }

    /// One allocation per rule that yields a positive amount, dated like the income.
    pub fn allocate(income: &Income, rules: &[AllocationRule]) -> Vec<Allocation> {
        rules
            .iter()
            .filter_map(|rule| {
                let amount = Self::amount_for(rule, income.amount);
                if !amount.is_finite() || amount <= 0.0 {
                    return None;
                }
                Some(Allocation::new(rule.name.clone(), amount, income.date))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn percentage_and_fixed_rules() {
        let date = Utc.with_ymd_and_hms(2024, 5, 5, 0, 0, 0).unwrap();
        let income = Income::new(2000.0, date, "Salary");
        let rules = vec![
            AllocationRule::percentage("Tithe", 10.0),
            AllocationRule::fixed("Emergency", 150.0),
            AllocationRule::fixed("Disabled", 0.0),
        ];
        let allocations = AllocationService::allocate(&income, &rules);
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].rule_name, "Tithe");
        assert_eq!(allocations[0].amount, 200.0);
        assert_eq!(allocations[1].amount, 150.0);
        assert!(allocations.iter().all(|a| a.date == date));
    }
}
