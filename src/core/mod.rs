pub mod live;
pub mod services;

pub use live::{BudgetView, DashboardView, LiveView, LiveViewBuilder};
