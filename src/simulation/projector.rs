use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyCode;
use crate::ledger::{DateRange, Schedule, Transaction};

/// Per-day net amounts and labels, index-aligned to the days of a range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub days: Vec<NaiveDate>,
    pub diffs: Vec<f64>,
    pub labels: Vec<String>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.diffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }
}

pub fn project_diffs(transactions: &[Transaction], range: DateRange) -> DailySeries {
    project_diffs_in(transactions, range, &CurrencyCode::default())
}

/// Sums every transaction's amount for each day of `range` and joins the
/// labels of the transactions firing that day with `","`, in input order.
pub fn project_diffs_in(
    transactions: &[Transaction],
    range: DateRange,
    currency: &CurrencyCode,
) -> DailySeries {
    let schedules: Vec<Schedule> = transactions.iter().map(Transaction::schedule).collect();
    let labels_by_txn: Vec<String> = transactions
        .iter()
        .map(|txn| txn.formatted_name_in(currency))
        .collect();

    let capacity = range.len();
    let mut series = DailySeries {
        days: Vec::with_capacity(capacity),
        diffs: Vec::with_capacity(capacity),
        labels: Vec::with_capacity(capacity),
    };

    for day in range.days() {
        let mut total = 0.0;
        let mut names = Vec::new();
        for ((txn, schedule), label) in transactions.iter().zip(&schedules).zip(&labels_by_txn) {
            if schedule.contains(day) {
                total += txn.amount();
                if !label.is_empty() {
                    names.push(label.as_str());
                }
            }
        }
        series.days.push(day);
        series.diffs.push(total);
        series.labels.push(names.join(","));
    }

    tracing::debug!(
        transactions = transactions.len(),
        days = series.len(),
        "projected daily diffs"
    );
    series
}
