//! Clock abstraction and calendar arithmetic shared by the services.

use std::sync::Mutex;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Clock abstracts access to the current timestamp so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Midnight at the start of the current day.
    fn start_of_today(&self) -> DateTime<Utc> {
        start_of_day(self.now())
    }
}

/// Real-time clock backed by the system UTC time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and dry runs.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(now),
        }
    }

    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(start_of_date(date))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.current.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.current.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Truncates a timestamp to 00:00:00.000 of the same UTC day.
pub fn start_of_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    start_of_date(ts.date_naive())
}

pub fn start_of_date(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Shifts a timestamp by whole calendar months, keeping the time of day.
/// Days past the end of the target month clamp to its last day.
/// Returns `ts` unchanged when the target lies outside chrono's range.
pub fn add_months(ts: DateTime<Utc>, months: i32) -> DateTime<Utc> {
    checked_add_months(ts, months).unwrap_or(ts)
}

/// Shifts a timestamp by whole calendar years; Feb 29 clamps to Feb 28.
pub fn add_years(ts: DateTime<Utc>, years: i32) -> DateTime<Utc> {
    checked_add_years(ts, years).unwrap_or(ts)
}

/// Like [`add_months`], but `None` when the result is not representable.
pub fn checked_add_months(ts: DateTime<Utc>, months: i32) -> Option<DateTime<Utc>> {
    let date = shift_month(ts.date_naive(), months)?;
    Some(Utc.from_utc_datetime(&date.and_time(ts.time())))
}

/// Like [`add_years`], but `None` when the result is not representable.
pub fn checked_add_years(ts: DateTime<Utc>, years: i32) -> Option<DateTime<Utc>> {
    let date = shift_year(ts.date_naive(), years)?;
    Some(Utc.from_utc_datetime(&date.and_time(ts.time())))
}

/// Returns true when both timestamps fall in the same calendar month.
pub fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = (date.year() * 12 + date.month0() as i32).checked_add(months)?;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

fn shift_year(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = date.year().checked_add(years)?;
    let day = date.day().min(days_in_month(year, date.month()));
    NaiveDate::from_ymd_opt(year, date.month(), day)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first_next| (first_next - Duration::days(1)).day())
        .unwrap_or(28)
}
