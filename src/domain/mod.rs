pub mod allocation;
pub mod category;
pub mod common;
pub mod credit_card;
pub mod debt;
pub mod investment;
pub mod notification;
pub mod plan;
pub mod recurring;
pub mod savings;
pub mod subscription;
pub mod transaction;

pub use allocation::{Allocation, AllocationRule, AllocationType};
pub use category::{Category, CategoryLimits, RECURRING_LABEL, TRANSFER_CATEGORY};
pub use common::{new_id, Displayable, Identifiable, NamedEntity};
pub use credit_card::{CardBrand, CreditCard};
pub use debt::{Debt, DebtStrategy};
pub use investment::{Investment, InvestmentType};
pub use notification::{Achievement, Notification};
pub use plan::{
    AllocationCategory, DeductionType, FinancialPlan, PlanAllocation, PlanDeduction, PlanProjection,
};
pub use recurring::{Frequency, RecurringTransaction};
pub use savings::SavingsBox;
pub use subscription::{BillingCycle, Subscription};
pub use transaction::{Expense, Income, Transaction, TransactionKind};
