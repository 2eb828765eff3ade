//! Projection pipeline: daily diffs, forward balance simulation and the
//! backward lower-limit scan.

pub mod balance;
pub mod lower_limit;
pub mod projector;
pub mod scenarios;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyCode;
use crate::ledger::{DateRange, Transaction};

pub use balance::{simulate, BalanceSeries};
pub use lower_limit::{compute_lower_limit, lowest_point};
pub use projector::{project_diffs, project_diffs_in, DailySeries};
pub use scenarios::run_scenarios;

/// Inputs of a single projection run besides the transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    pub range: DateRange,
    pub start_amount: f64,
    /// Fraction of each positive daily diff withheld as savings; expected in `[0, 1]`.
    pub save_proportion: f64,
    #[serde(default)]
    pub currency: CurrencyCode,
}

impl ProjectionParams {
    pub fn new(range: DateRange, start_amount: f64, save_proportion: f64) -> Self {
        Self {
            range,
            start_amount,
            save_proportion,
            currency: CurrencyCode::default(),
        }
    }

    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }
}

/// All series of a completed run, index-aligned by day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub params: ProjectionParams,
    pub days: Vec<NaiveDate>,
    pub diffs: Vec<f64>,
    pub labels: Vec<String>,
    pub balance: Vec<f64>,
    pub save_balance: Vec<f64>,
    pub lower_limit: Vec<f64>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Lowest savings-adjusted balance over the horizon and the day it occurs.
    pub fn lowest_point(&self) -> Option<(NaiveDate, f64)> {
        lowest_point(&self.save_balance).map(|(idx, value)| (self.days[idx], value))
    }
}

/// Runs project → simulate → lower limit over `transactions`.
pub fn run_projection(transactions: &[Transaction], params: &ProjectionParams) -> Projection {
    let DailySeries {
        days,
        diffs,
        labels,
    } = project_diffs_in(transactions, params.range, &params.currency);
    let BalanceSeries {
        balance,
        save_balance,
    } = simulate(&diffs, params.start_amount, params.save_proportion);
    let lower_limit = compute_lower_limit(&save_balance);

    tracing::info!(
        from = %params.range.from,
        to = %params.range.to,
        days = days.len(),
        "projection complete"
    );

    Projection {
        params: params.clone(),
        days,
        diffs,
        labels,
        balance,
        save_balance,
        lower_limit,
    }
}
