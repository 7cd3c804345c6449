#![doc(test(attr(deny(warnings))))]

//! Oikos Core is the personal-finance engine behind the Oikos apps: recurring
//! transaction roll-forward, debt ordering, budgets and live financial summaries
//! over a user-scoped document store.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod repository;
pub mod store;
pub mod time;
pub mod utils;
pub mod worker;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    init_with_filter(utils::DEFAULT_LOG_DIRECTIVE);
}

/// Like [`init`], with the default log directive taken from configuration.
pub fn init_with_filter(directive: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing_with(directive);
        tracing::info!(build = %utils::build_info::summary(), "Oikos Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
