use super::{at, repo};
use crate::{
    core::services::{LedgerService, SavingsService, SummaryService},
    domain::{Income, SavingsBox, TRANSFER_CATEGORY},
    errors::OikosError,
};

#[test]
fn add_funds_moves_balance_into_box() {
    let repo = repo();
    LedgerService::record_income(&repo, Income::new(1000.0, at(4, 1), "Salary"), &[]).unwrap();
    let savings_box = SavingsBox::new("Trip", 2000.0);
    repo.save(&savings_box).unwrap();

    let (updated, transfer) =
        SavingsService::add_funds(&repo, &savings_box.id, 400.0, at(4, 2)).unwrap();
    assert_eq!(updated.current_amount, 400.0);
    assert_eq!(transfer.category, TRANSFER_CATEGORY);
    assert_eq!(
        transfer.related_savings_box_id.as_deref(),
        Some(savings_box.id.as_str())
    );

    let stored = repo.get::<SavingsBox>(&savings_box.id).unwrap().unwrap();
    assert_eq!(stored.current_amount, 400.0);
    let inputs = crate::core::services::FinancialInputs {
        incomes: repo.incomes().unwrap(),
        expenses: repo.expenses().unwrap(),
        ..Default::default()
    };
    assert_eq!(SummaryService::current_balance(&inputs), 600.0);
}

#[test]
fn add_funds_rejects_more_than_balance() {
    let repo = repo();
    LedgerService::record_income(&repo, Income::new(100.0, at(4, 1), "Salary"), &[]).unwrap();
    let savings_box = SavingsBox::new("Trip", 2000.0);
    repo.save(&savings_box).unwrap();

    let err = SavingsService::add_funds(&repo, &savings_box.id, 150.0, at(4, 2)).unwrap_err();
    assert!(matches!(
        err,
        OikosError::InsufficientBalance { requested, available }
            if requested == 150.0 && available == 100.0
    ));
    assert!(repo.expenses().unwrap().is_empty());
}

#[test]
fn add_funds_validates_input() {
    let repo = repo();
    assert!(matches!(
        SavingsService::add_funds(&repo, "nope", 10.0, at(4, 2)),
        Err(OikosError::NotFound(_))
    ));
    assert!(matches!(
        SavingsService::add_funds(&repo, "nope", -1.0, at(4, 2)),
        Err(OikosError::InvalidInput(_))
    ));
}
