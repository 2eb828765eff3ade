use rayon::prelude::*;

use super::{run_projection, Projection, ProjectionParams};
use crate::ledger::Transaction;

/// Runs one projection per parameter set in parallel. Results keep the order
/// of `scenarios`.
pub fn run_scenarios(transactions: &[Transaction], scenarios: &[ProjectionParams]) -> Vec<Projection> {
    tracing::debug!(scenarios = scenarios.len(), "running projection scenarios");
    scenarios
        .par_iter()
        .map(|params| run_projection(transactions, params))
        .collect()
}
