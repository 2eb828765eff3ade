//! Command-line front end: builds run parameters from config and flags, then
//! prints a table or a JSON chart payload.

use std::{io::Write, path::PathBuf};

use chrono::{Local, NaiveDate, NaiveTime};
use clap::Parser;

use crate::{
    config::{Config, ConfigManager},
    errors::ProjectionError,
    ledger::{DateRange, RecurrenceRule, TimeUnit, Transaction, When},
    report::{render_table, BalanceReport, TableOptions},
    simulation::run_projection,
};

#[derive(Debug, Parser)]
#[command(
    name = "balance_forecast_cli",
    version,
    about = "Project a future balance and the safe-spending floor under it"
)]
pub struct Cli {
    /// Configuration file (defaults to `config.json` in the app data directory).
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long, allow_negative_numbers = true)]
    pub start_amount: Option<f64>,
    /// Percentage of every inflow set aside as savings.
    #[arg(long)]
    pub save_percentage: Option<f64>,
    /// Number of days projected after the first day.
    #[arg(long)]
    pub days: Option<u32>,
    /// First projected day, `YYYY-MM-DD` (defaults to today).
    #[arg(long, value_parser = parse_day)]
    pub from: Option<NaiveDate>,
    /// One-off transaction, e.g. `2024-06-01,-120,Car service`. Repeatable.
    #[arg(long = "once", value_name = "DATE,AMOUNT[,NAME]", value_parser = parse_once)]
    pub once: Vec<Transaction>,
    /// Include the sample budget (bi-weekly salary and monthly charges). Without
    /// a config file it starts from 1800 with 30% savings.
    #[arg(long)]
    pub demo: bool,
    /// Emit the chart payload as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
    /// Disable colors in table output.
    #[arg(long)]
    pub plain: bool,
    /// Only list days with transactions.
    #[arg(long)]
    pub active_only: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(amount) = self.start_amount {
            config.start_amount = amount;
        }
        if let Some(percentage) = self.save_percentage {
            config.save_percentage = percentage;
        }
        if let Some(days) = self.days {
            config.horizon_days = days;
        }
        if let Some(from) = self.from {
            config.start_date = Some(from);
        }
    }
}

pub fn run_cli() -> Result<(), ProjectionError> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    run(&cli, Local::now().date_naive(), &mut handle)
}

/// Executes one invocation, writing the rendered projection to `out`.
pub fn run(cli: &Cli, today: NaiveDate, out: &mut impl Write) -> Result<(), ProjectionError> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let mut config = if cli.demo && !manager.path().exists() {
        Config::sample()
    } else {
        manager.load()?
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    let params = config.projection_params(today);
    let mut transactions = cli.once.clone();
    if cli.demo {
        transactions.extend(demo_transactions(params.range)?);
    }
    if transactions.is_empty() {
        tracing::warn!("no transactions supplied; the balance stays flat");
    }

    let projection = run_projection(&transactions, &params);
    if cli.json {
        writeln!(out, "{}", BalanceReport::from_projection(&projection).to_json()?)?;
    } else {
        let options = TableOptions {
            plain: cli.plain,
            active_only: cli.active_only,
        };
        writeln!(out, "{}", render_table(&projection, options))?;
    }
    Ok(())
}

/// Sample budget: salary every other Friday since 2017-02-17 and a set of
/// yearly, half-yearly and monthly charges, all bounded by `range`.
pub fn demo_transactions(range: DateRange) -> Result<Vec<Transaction>, ProjectionError> {
    let start = range.from.and_time(NaiveTime::MIN);
    let salary_start = NaiveDate::from_ymd_opt(2017, 2, 17)
        .ok_or_else(|| ProjectionError::InvalidRecurrence("invalid salary start".into()))?
        .and_time(NaiveTime::MIN);
    let monthly = |day: i32| {
        RecurrenceRule::builder(TimeUnit::Month, start)
            .on_month_days([day])
            .until(range.to)
            .build()
    };

    Ok(vec![
        Transaction::new(
            RecurrenceRule::builder(TimeUnit::Week, salary_start)
                .every(2)
                .until(range.to)
                .build()?,
            1500.0,
        )
        .named("SALARY"),
        Transaction::new(
            RecurrenceRule::builder(TimeUnit::Year, start)
                .in_months([1])
                .on_month_days([9])
                .until(range.to)
                .build()?,
            -50.0,
        )
        .named("CHARGE 1"),
        Transaction::new(
            RecurrenceRule::builder(TimeUnit::Month, start)
                .in_months([6, 12])
                .on_month_days([10])
                .until(range.to)
                .build()?,
            -5000.0,
        )
        .named("CHARGE 2"),
        Transaction::new(monthly(9)?, -100.0).named("CHARGE 3"),
        Transaction::new(monthly(1)?, -40.0).named("CHARGE 4"),
        Transaction::new(monthly(-1)?, -50.0).named("CHARGE 5"),
        Transaction::new(monthly(22)?, -228.0).named("CHARGE 6"),
    ])
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn parse_once(raw: &str) -> Result<Transaction, String> {
    let mut parts = raw.splitn(3, ',');
    let when = parts
        .next()
        .filter(|part| !part.trim().is_empty())
        .ok_or_else(|| ProjectionError::MissingField("when").to_string())?
        .parse::<When>()
        .map_err(|err| err.to_string())?;
    let amount = parts
        .next()
        .filter(|part| !part.trim().is_empty())
        .ok_or_else(|| ProjectionError::MissingField("amount").to_string())?
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid amount: {err}"))?;
    let mut builder = Transaction::builder().when(when).amount(amount);
    if let Some(name) = parts.next().map(str::trim).filter(|name| !name.is_empty()) {
        builder = builder.name(name);
    }
    builder.build().map_err(|err| err.to_string())
}
