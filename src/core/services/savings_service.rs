use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    domain::{new_id, Expense, SavingsBox, TRANSFER_CATEGORY},
    errors::{OikosError, Result},
    repository::UserRepository,
};

use super::{
    ledger_service::validate_amount,
    summary_service::{FinancialInputs, SummaryService},
};

pub struct SavingsService;

impl SavingsService {
    /// Moves `amount` from the available balance into the box. The transfer expense
    /// and the updated box are written in one update.
    pub fn add_funds(
        repo: &UserRepository,
        box_id: &str,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<(SavingsBox, Expense)> {
        validate_amount(amount)?;
        let savings_box = repo
            .get::<SavingsBox>(box_id)?
            .ok_or_else(|| OikosError::NotFound(format!("savings box `{box_id}`")))?;

        let inputs = FinancialInputs {
            incomes: repo.incomes()?,
            expenses: repo.expenses()?,
            allocations: repo.list()?,
            ..FinancialInputs::default()
        };
        let available = SummaryService::current_balance(&inputs);
        if available < amount {
            return Err(OikosError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let (updated, transfer) = Self::transfer(&savings_box, amount, now);
        let batch = repo.batch().put(&transfer)?.put(&updated)?;
        repo.apply(batch)?;
        info!(
            savings_box = %updated.id,
            amount,
            total = updated.current_amount,
            "funds added to savings box"
        );
        Ok((updated, transfer))
    }

    /// Pure part of [`SavingsService::add_funds`].
    pub fn transfer(
        savings_box: &SavingsBox,
        amount: f64,
        now: DateTime<Utc>,
    ) -> (SavingsBox, Expense) {
        let mut expense = Expense::new(
            amount,
            now,
            format!("Transfer to savings box '{}'", savings_box.name),
            TRANSFER_CATEGORY,
        );
        expense.id = new_id("exp_transfer");
        expense.related_savings_box_id = Some(savings_box.id.clone());

        let mut updated = savings_box.clone();
        updated.current_amount += amount;
        (updated, expense)
    }
}
