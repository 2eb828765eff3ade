use serde::{Deserialize, Serialize};

/// Running balances produced by a forward pass over daily diffs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSeries {
    pub balance: Vec<f64>,
    /// Balance where `save_proportion` of each non-negative diff is withheld.
    pub save_balance: Vec<f64>,
}

/// Accumulates `diffs` on top of `start_amount`. Outflows hit both tracks in
/// full; inflows reach the savings-adjusted track scaled by
/// `1 - save_proportion`. The proportion is not validated here.
pub fn simulate(diffs: &[f64], start_amount: f64, save_proportion: f64) -> BalanceSeries {
    let mut balance = Vec::with_capacity(diffs.len());
    let mut save_balance = Vec::with_capacity(diffs.len());
    let mut current = start_amount;
    let mut current_save = start_amount;

    for diff in diffs {
        current += diff;
        balance.push(current);

        current_save += if *diff < 0.0 {
            *diff
        } else {
            diff * (1.0 - save_proportion)
        };
        save_balance.push(current_save);
    }

    BalanceSeries {
        balance,
        save_balance,
    }
}
