use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::{common::sum_amounts, Debt, DebtStrategy};

/// Aggregate view over all debts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DebtSummary {
    pub count: usize,
    pub total_owed: f64,
    pub total_minimum_payment: f64,
    /// Interest rate weighted by outstanding balance.
    pub weighted_average_rate: f64,
    pub with_settlement_offers: usize,
    /// Sum of `total_amount - settlement_offer_amount` over debts with an offer.
    pub potential_settlement_savings: f64,
}

pub struct DebtService;

impl DebtService {
    /// Payoff order under `strategy`. The sort is stable and NaN keys compare equal.
    pub fn order(debts: &[Debt], strategy: DebtStrategy) -> Vec<Debt> {
        let mut ordered = debts.to_vec();
        match strategy {
            DebtStrategy::Avalanche => ordered.sort_by(|a, b| {
                compare(b.annual_interest_rate, a.annual_interest_rate)
            }),
            DebtStrategy::Snowball => {
                ordered.sort_by(|a, b| compare(a.total_amount, b.total_amount))
            }
        }
        ordered
    }

    pub fn summary(debts: &[Debt]) -> DebtSummary {
        let total_owed = sum_amounts(debts.iter().map(|d| d.total_amount));
        let weighted_rate = if total_owed > 0.0 {
            sum_amounts(
                debts
                    .iter()
                    .map(|d| d.total_amount * d.annual_interest_rate),
            ) / total_owed
        } else {
            0.0
        };
        DebtSummary {
            count: debts.len(),
            total_owed,
            total_minimum_payment: sum_amounts(debts.iter().map(|d| d.minimum_monthly_payment)),
            weighted_average_rate: weighted_rate,
            with_settlement_offers: debts.iter().filter(|d| d.has_settlement_offer()).count(),
            potential_settlement_savings: sum_amounts(
                debts.iter().filter_map(Self::settlement_savings),
            ),
        }
    }

    /// Amount saved by accepting the settlement offer, when one exists and is lower.
    pub fn settlement_savings(debt: &Debt) -> Option<f64> {
        let offer = debt.settlement_offer_amount?;
        let saved = debt.total_amount - offer;
        (saved > 0.0).then_some(saved)
    }
}

fn compare(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
