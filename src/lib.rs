#![doc(test(attr(deny(warnings))))]

//! Balance Forecast projects a future cash balance from recurring and one-off
//! transactions, then derives a safe-spending floor from committed obligations.

pub mod cli;
pub mod config;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod report;
pub mod simulation;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Balance Forecast tracing initialized.");
    });
}
