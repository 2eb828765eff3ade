//! Hand-off structures for whatever draws the projection: a serializable
//! chart payload and a terminal table.

pub mod table;

use chrono::NaiveDate;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::currency::{format_currency_value, CurrencyCode};
use crate::errors::ProjectionError;
use crate::simulation::Projection;
use table::{Alignment, Table, TableColumn};

pub const BALANCE_SERIES: &str = "Balance";
pub const LOWER_LIMIT_SERIES: &str = "Maximum Unplanned Expenditures";
const DAY_LABEL_FORMAT: &str = "%a, %b %d";
const LABEL_COLUMN_WIDTH: usize = 60;

pub fn day_label(day: NaiveDate) -> String {
    day.format(DAY_LABEL_FORMAT).to_string()
}

pub fn save_balance_series_name(save_proportion: f64) -> String {
    format!("Balance with {:.2}% savings", save_proportion * 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
    /// Per-point hover text, index-aligned with `values`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub day_labels: Vec<String>,
    pub save_proportion: f64,
    pub currency_symbol: String,
    pub series: Vec<ChartSeries>,
}

impl BalanceReport {
    /// Series are ordered lower limit, savings-adjusted balance, balance so
    /// filled areas stack from the floor up.
    pub fn from_projection(projection: &Projection) -> Self {
        let save_proportion = projection.params.save_proportion;
        Self {
            day_labels: projection.days.iter().copied().map(day_label).collect(),
            save_proportion,
            currency_symbol: projection.params.currency.symbol(),
            series: vec![
                ChartSeries {
                    name: LOWER_LIMIT_SERIES.into(),
                    values: projection.lower_limit.clone(),
                    hover: None,
                },
                ChartSeries {
                    name: save_balance_series_name(save_proportion),
                    values: projection.save_balance.clone(),
                    hover: None,
                },
                ChartSeries {
                    name: BALANCE_SERIES.into(),
                    values: projection.balance.clone(),
                    hover: Some(projection.labels.clone()),
                },
            ],
        }
    }

    pub fn series(&self, name: &str) -> Option<&ChartSeries> {
        self.series.iter().find(|series| series.name == name)
    }

    pub fn to_json(&self) -> Result<String, ProjectionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Disable colors and box-drawing characters.
    pub plain: bool,
    /// Only list days on which at least one transaction fires.
    pub active_only: bool,
}

/// Renders the projection as a day-per-row table followed by a summary line.
pub fn render_table(projection: &Projection, options: TableOptions) -> String {
    let currency = &projection.params.currency;
    let money = |value: f64| format_money(value, currency, options.plain);

    let rows: Vec<Vec<String>> = (0..projection.len())
        .filter(|idx| !options.active_only || !projection.labels[*idx].is_empty())
        .map(|idx| {
            vec![
                day_label(projection.days[idx]),
                money(projection.diffs[idx]),
                money(projection.balance[idx]),
                money(projection.save_balance[idx]),
                money(projection.lower_limit[idx]),
                projection.labels[idx].clone(),
            ]
        })
        .collect();

    let table = Table {
        columns: vec![
            TableColumn::new("Day", Alignment::Left),
            TableColumn::new("Change", Alignment::Right),
            TableColumn::new(BALANCE_SERIES, Alignment::Right),
            TableColumn::new("With savings", Alignment::Right),
            TableColumn::new("Safe floor", Alignment::Right),
            TableColumn::new("Transactions", Alignment::Left).max_width(LABEL_COLUMN_WIDTH),
        ],
        rows,
        padding: 0,
        plain: options.plain,
    };

    let mut out = table.render();
    out.push('\n');
    out.push_str(&summary_line(projection, options.plain));
    out
}

fn summary_line(projection: &Projection, plain: bool) -> String {
    let currency = &projection.params.currency;
    match projection.lowest_point() {
        Some((day, value)) => format!(
            "Lowest {} of {} on {}",
            save_balance_series_name(projection.params.save_proportion).to_lowercase(),
            format_money(value, currency, plain),
            day_label(day)
        ),
        None => "Empty projection range".to_string(),
    }
}

fn format_money(value: f64, currency: &CurrencyCode, plain: bool) -> String {
    let text = format_currency_value(value, currency);
    if !plain && value < 0.0 {
        text.red().to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{DateRange, Transaction};
    use crate::simulation::{run_projection, ProjectionParams};

    fn projection() -> Projection {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let txns = [Transaction::new(end, -150.0).named("Rent")];
        run_projection(
            &txns,
            &ProjectionParams::new(DateRange::new(start, end), 100.0, 0.3),
        )
    }

    #[test]
    fn legend_uses_two_decimal_percentage() {
        assert_eq!(save_balance_series_name(0.3), "Balance with 30.00% savings");
    }

    #[test]
    fn day_labels_use_short_weekday_and_month() {
        let day = NaiveDate::from_ymd_opt(2012, 12, 20).unwrap();
        assert_eq!(day_label(day), "Thu, Dec 20");
    }

    #[test]
    fn report_carries_all_series() {
        let report = BalanceReport::from_projection(&projection());
        assert_eq!(report.day_labels.len(), 3);
        let balance = report.series(BALANCE_SERIES).unwrap();
        assert_eq!(balance.values, vec![100.0, 100.0, -50.0]);
        assert_eq!(
            balance.hover.as_ref().unwrap()[2],
            "Rent: -$150".to_string()
        );
        let floor = report.series(LOWER_LIMIT_SERIES).unwrap();
        assert_eq!(floor.values, vec![-50.0, -50.0, -50.0]);
        assert!(report.to_json().unwrap().contains("\"day_labels\""));
    }

    #[test]
    fn plain_table_lists_active_days_only() {
        let rendered = render_table(
            &projection(),
            TableOptions {
                plain: true,
                active_only: true,
            },
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("Rent: -$150"));
        assert!(lines[3].starts_with("Lowest balance with 30.00% savings of -$50.00"));
    }
}
