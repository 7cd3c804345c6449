mod common;

use common::memory_repo;
use oikos_core::{
    core::services::DebtService,
    domain::{Debt, DebtStrategy},
};

fn sample() -> Vec<Debt> {
    vec![
        Debt::new("Car loan", 12_000.0, 7.5, 320.0),
        Debt::new("Store card", 800.0, 29.9, 40.0),
        Debt::new("Overdraft", 2_500.0, 12.0, 90.0),
        Debt::new("Student loan", 18_000.0, 3.1, 150.0),
    ]
}

#[test]
fn avalanche_is_non_increasing_in_rate() {
    let ordered = DebtService::order(&sample(), DebtStrategy::Avalanche);
    let rates: Vec<f64> = ordered.iter().map(|d| d.annual_interest_rate).collect();
    assert!(rates.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(ordered[0].name, "Store card");
}

#[test]
fn snowball_is_non_decreasing_in_balance() {
    let ordered = DebtService::order(&sample(), DebtStrategy::Snowball);
    let totals: Vec<f64> = ordered.iter().map(|d| d.total_amount).collect();
    assert!(totals.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(ordered.last().unwrap().name, "Student loan");
}

#[test]
fn ordering_reads_stored_debts() {
    let repo = memory_repo("debtor");
    for debt in sample() {
        repo.save(&debt).unwrap();
    }
    let stored: Vec<Debt> = repo.list().unwrap();
    assert_eq!(stored.len(), 4);
    let ordered = DebtService::order(&stored, "snowball".parse().unwrap());
    assert_eq!(ordered[0].name, "Store card");
}

#[test]
fn summary_counts_settlement_savings() {
    let debts = vec![
        Debt::new("Card", 1_000.0, 20.0, 50.0).with_settlement_offer(600.0, None),
        Debt::new("Loan", 3_000.0, 10.0, 100.0),
    ];
    let summary = DebtService::summary(&debts);
    assert_eq!(summary.count, 2);
    assert_eq!(summary.total_owed, 4_000.0);
    assert_eq!(summary.with_settlement_offers, 1);
    assert_eq!(summary.potential_settlement_savings, 400.0);
    assert!((summary.weighted_average_rate - 12.5).abs() < 1e-9);
}
