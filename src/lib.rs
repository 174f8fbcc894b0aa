#![doc(test(attr(deny(warnings))))]

//! Obligation Core turns recurring financial commitments (billers, installment
//! loans) into dated payment schedules, records payments against them
//! atomically with ledger entries, reconciles stored payment state against the
//! ledger, and projects period-level income versus allocated spend.

pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod period;
pub mod store;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes the global tracing subscriber and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("obligation_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
        tracing::info!("Obligation Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
