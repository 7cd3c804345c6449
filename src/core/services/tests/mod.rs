mod ledger_tests;
mod plan_tests;
mod savings_tests;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::{repository::UserRepository, store::MemoryStore};

pub(super) fn repo() -> UserRepository {
    UserRepository::new(Arc::new(MemoryStore::new()), "tester").unwrap()
}

pub(super) fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 10, 0, 0).unwrap()
}
