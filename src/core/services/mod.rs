pub mod allocation_service;
pub mod budget_service;
pub mod debt_service;
pub mod engagement_service;
pub mod ledger_service;
pub mod plan_service;
pub mod recurrence_service;
pub mod report_service;
pub mod savings_service;
pub mod status_service;
pub mod summary_service;

#[cfg(test)]
mod tests;

pub use allocation_service::AllocationService;
pub use budget_service::{BudgetLevel, BudgetService, CategoryBudget, ExpenseAlert};
pub use debt_service::{DebtService, DebtSummary};
pub use engagement_service::EngagementService;
pub use ledger_service::{LedgerService, RecordedExpense};
pub use plan_service::{PlanChanges, PlanService};
pub use recurrence_service::{CatchUpPolicy, PlannedOccurrence, RecurrenceService};
pub use report_service::{MonthlyReport, ReportService};
pub use savings_service::SavingsService;
pub use status_service::{FinancialStatus, StatusMetrics, StatusService};
pub use summary_service::{FinancialInputs, FinancialSnapshot, SummaryService, UpcomingPayment};
