use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{
    Achievement, Allocation, AllocationRule, Category, CreditCard, Debt, Expense, Identifiable,
    Income, Investment, Notification, RecurringTransaction, SavingsBox, Subscription,
};

pub const USERS_ROOT: &str = "users";
pub const SETTINGS: &str = "settings";

/// Per-user collections under `users/{uid}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Incomes,
    Expenses,
    Allocations,
    Rules,
    SavingsBoxes,
    Subscriptions,
    Debts,
    Investments,
    CreditCards,
    Categories,
    Notifications,
    Achievements,
    RecurringTransactions,
}

impl Collection {
    pub const ALL: [Collection; 13] = [
        Collection::Incomes,
        Collection::Expenses,
        Collection::Allocations,
        Collection::Rules,
        Collection::SavingsBoxes,
        Collection::Subscriptions,
        Collection::Debts,
        Collection::Investments,
        Collection::CreditCards,
        Collection::Categories,
        Collection::Notifications,
        Collection::Achievements,
        Collection::RecurringTransactions,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Collection::Incomes => "incomes",
            Collection::Expenses => "expenses",
            Collection::Allocations => "allocations",
            Collection::Rules => "rules",
            Collection::SavingsBoxes => "savingsBoxes",
            Collection::Subscriptions => "subscriptions",
            Collection::Debts => "debts",
            Collection::Investments => "investments",
            Collection::CreditCards => "creditCards",
            Collection::Categories => "categories",
            Collection::Notifications => "notifications",
            Collection::Achievements => "achievements",
            Collection::RecurringTransactions => "recurringTransactions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Entries under `users/{uid}/settings/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsKey {
    CategoryLimits,
    VisualMode,
    ApiKey,
}

impl SettingsKey {
    pub fn key(self) -> &'static str {
        match self {
            SettingsKey::CategoryLimits => "category_limits",
            SettingsKey::VisualMode => "visual_mode",
            SettingsKey::ApiKey => "gemini_api_key",
        }
    }
}

/// Entity stored as one keyed child of a user collection.
pub trait Record: Serialize + DeserializeOwned + Identifiable + Send + 'static {
    const COLLECTION: Collection;
}

macro_rules! record {
    ($($ty:ty => $collection:ident),+ $(,)?) => {
        $(
            impl Record for $ty {
                const COLLECTION: Collection = Collection::$collection;
            }
        )+
    };
}

record! {
    Income => Incomes,
    Expense => Expenses,
    Allocation => Allocations,
    AllocationRule => Rules,
    SavingsBox => SavingsBoxes,
    Subscription => Subscriptions,
    Debt => Debts,
    Investment => Investments,
    CreditCard => CreditCards,
    Category => Categories,
    Notification => Notifications,
    Achievement => Achievements,
    RecurringTransaction => RecurringTransactions,
}
