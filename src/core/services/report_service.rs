//! Monthly reports and CSV export.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::{
    domain::{Expense, Income, Transaction},
    errors::Result,
    time::{add_months, same_month},
};

use super::summary_service::SummaryService;

pub const CSV_HEADER: [&str; 5] = ["Type", "Description", "Amount", "Date", "Category/Source"];
const CSV_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    /// `month/year`, e.g. `3/2024`.
    pub month: String,
    pub previous_month: String,
    pub expenses_by_category: BTreeMap<String, f64>,
    pub income: f64,
    pub expense: f64,
    pub previous_income: f64,
    pub previous_expense: f64,
}

impl MonthlyReport {
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }

    /// Change in spending against the previous month, `None` when it had none.
    pub fn expense_change_percent(&self) -> Option<f64> {
        (self.previous_expense > 0.0)
            .then(|| (self.expense - self.previous_expense) / self.previous_expense * 100.0)
    }
}

pub struct ReportService;

impl ReportService {
    /// Category totals cover all expenses; income and expense totals cover the month
    /// containing `now` and the one before it.
    pub fn monthly(incomes: &[Income], expenses: &[Expense], now: DateTime<Utc>) -> MonthlyReport {
        let previous = add_months(now, -1);
        MonthlyReport {
            month: month_label(now),
            previous_month: month_label(previous),
            expenses_by_category: SummaryService::expenses_by_category(expenses),
            income: SummaryService::month_income(incomes, now),
            expense: SummaryService::month_expense(expenses, now),
            previous_income: SummaryService::month_income(incomes, previous),
            previous_expense: SummaryService::month_expense(expenses, previous),
        }
    }

    /// Transactions whose date falls in the same month as `at`.
    pub fn in_month(transactions: &[Transaction], at: DateTime<Utc>) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|t| same_month(t.date(), at))
            .cloned()
            .collect()
    }

    /// CSV document with the header `Type,Description,Amount,Date,Category/Source`.
    pub fn export_csv(transactions: &[Transaction]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for transaction in transactions {
            writer.write_record([
                transaction.kind().to_string(),
                transaction.description().to_string(),
                transaction.amount().to_string(),
                transaction.date().format(CSV_DATE_FORMAT).to_string(),
                transaction.label().to_string(),
            ])?;
        }
        let bytes = writer.into_inner()?;
        Ok(String::from_utf8(bytes)?)
    }
}

fn month_label(at: DateTime<Utc>) -> String {
    format!("{}/{}", at.month(), at.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        let transactions: Vec<Transaction> = vec![
            Income::new(3000.0, at(3, 1), "Salary").with_source("Acme").into(),
            Expense::new(12.5, at(3, 2), "Coffee, cake", "Food").into(),
        ];
        let csv = ReportService::export_csv(&transactions).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Type,Description,Amount,Date,Category/Source");
        assert_eq!(lines[1], "Income,Salary,3000,2024-03-01 09:30:00,Acme");
        assert_eq!(lines[2], "Expense,\"Coffee, cake\",12.5,2024-03-02 09:30:00,Food");
    }

    #[test]
    fn monthly_report_compares_with_previous_month() {
        let incomes = vec![
            Income::new(1000.0, at(3, 1), "Salary"),
            Income::new(800.0, at(2, 1), "Salary"),
        ];
        let expenses = vec![
            Expense::new(300.0, at(3, 3), "Market", "Food"),
            Expense::new(200.0, at(2, 3), "Market", "Food"),
            Expense::new(50.0, at(1, 3), "Bus", "Transport"),
        ];
        let report = ReportService::monthly(&incomes, &expenses, at(3, 15));
        assert_eq!(report.month, "3/2024");
        assert_eq!(report.previous_month, "2/2024");
        assert_eq!(report.income, 1000.0);
        assert_eq!(report.previous_expense, 200.0);
        assert_eq!(report.expenses_by_category["Food"], 500.0);
        assert_eq!(report.expense_change_percent(), Some(50.0));
        assert_eq!(report.net(), 700.0);
    }
}
