use std::{collections::HashSet, fmt, str::FromStr, sync::Arc};

use chrono::{NaiveDate, NaiveDateTime};

use super::date_range::CalendarDate;
use super::recurrence::{FixedDates, RecurrenceRule, RecurrenceSource};
use crate::currency::{format_signed_amount, CurrencyCode};
use crate::errors::ProjectionError;

/// When a transaction fires: once on a calendar date, or on every date a
/// recurrence source enumerates.
#[derive(Clone)]
pub enum When {
    Date(NaiveDate),
    Recurring(Arc<dyn RecurrenceSource>),
}

impl When {
    pub fn occurs_on(&self, day: impl CalendarDate) -> bool {
        let day = day.calendar_date();
        match self {
            When::Date(date) => *date == day,
            When::Recurring(source) => source.occurs_on(day),
        }
    }

    /// Every calendar day this fires on, in ascending order without repeats.
    pub fn dates(&self) -> Vec<NaiveDate> {
        match self {
            When::Date(date) => vec![*date],
            When::Recurring(source) => {
                let mut days: Vec<_> = source
                    .occurrences()
                    .iter()
                    .map(|occurrence| occurrence.date())
                    .collect();
                days.sort_unstable();
                days.dedup();
                days
            }
        }
    }
}

impl fmt::Debug for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            When::Date(date) => f.debug_tuple("Date").field(date).finish(),
            When::Recurring(source) => f.debug_tuple("Recurring").field(source).finish(),
        }
    }
}

impl From<NaiveDate> for When {
    fn from(date: NaiveDate) -> Self {
        When::Date(date)
    }
}

impl From<NaiveDateTime> for When {
    fn from(timestamp: NaiveDateTime) -> Self {
        When::Date(timestamp.date())
    }
}

impl From<RecurrenceRule> for When {
    fn from(rule: RecurrenceRule) -> Self {
        When::Recurring(Arc::new(rule))
    }
}

impl From<FixedDates> for When {
    fn from(dates: FixedDates) -> Self {
        When::Recurring(Arc::new(dates))
    }
}

impl From<Arc<dyn RecurrenceSource>> for When {
    fn from(source: Arc<dyn RecurrenceSource>) -> Self {
        When::Recurring(source)
    }
}

impl FromStr for When {
    type Err = ProjectionError;

    /// Accepts an ISO calendar date (`2024-01-09`) or date-time
    /// (`2024-01-09T08:00:00`); the time-of-day is dropped.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(When::Date(date));
        }
        for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
            if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, pattern) {
                return Ok(When::Date(timestamp.date()));
            }
        }
        Err(ProjectionError::InvalidWhenType(raw.to_string()))
    }
}

/// A signed amount charged on a date or a recurring schedule. Negative
/// amounts are outflows. Immutable once built.
#[derive(Debug, Clone)]
pub struct Transaction {
    when: When,
    amount: f64,
    name: Option<String>,
}

impl Transaction {
    pub fn new(when: impl Into<When>, amount: f64) -> Self {
        Self {
            when: when.into(),
            amount,
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn builder() -> TransactionBuilder {
        TransactionBuilder::default()
    }

    pub fn when(&self) -> &When {
        &self.when
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn does_transact_for_day(&self, day: impl CalendarDate) -> bool {
        self.when.occurs_on(day)
    }

    pub fn amount_for_day(&self, day: impl CalendarDate) -> f64 {
        if self.does_transact_for_day(day) {
            self.amount
        } else {
            0.0
        }
    }

    /// `"<name>: "` when named, then the signed amount, e.g. `Rent: -$20`.
    pub fn formatted_name(&self) -> String {
        self.formatted_name_in(&CurrencyCode::default())
    }

    pub fn formatted_name_in(&self, currency: &CurrencyCode) -> String {
        let amount = format_signed_amount(self.amount, currency);
        match &self.name {
            Some(name) if !name.is_empty() => format!("{}: {}", name, amount),
            _ => amount,
        }
    }

    /// Same as [`Transaction::formatted_name`], or empty when the transaction
    /// does not fire on `day`.
    pub fn formatted_name_for_day(&self, day: impl CalendarDate) -> String {
        self.formatted_name_for_day_in(day, &CurrencyCode::default())
    }

    pub fn formatted_name_for_day_in(
        &self,
        day: impl CalendarDate,
        currency: &CurrencyCode,
    ) -> String {
        if !self.does_transact_for_day(day) {
            return String::new();
        }
        self.formatted_name_in(currency)
    }

    /// Enumerates the schedule once so repeated day lookups stay cheap.
    pub fn schedule(&self) -> Schedule {
        Schedule {
            days: self.when.dates().into_iter().collect(),
        }
    }
}

/// Pre-enumerated set of days a transaction fires on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    days: HashSet<NaiveDate>,
}

impl Schedule {
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.days.contains(&day)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Assembles a [`Transaction`] from parts that may be missing.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    when: Option<When>,
    amount: Option<f64>,
    name: Option<String>,
}

impl TransactionBuilder {
    pub fn when(mut self, when: impl Into<When>) -> Self {
        self.when = Some(when.into());
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn build(self) -> Result<Transaction, ProjectionError> {
        let when = self.when.ok_or(ProjectionError::MissingField("when"))?;
        let amount = self.amount.ok_or(ProjectionError::MissingField("amount"))?;
        Ok(Transaction {
            when,
            amount,
            name: self.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 12, d).unwrap()
    }

    #[test]
    fn single_date_ignores_time_of_day() {
        let t = Transaction::new(day(20).and_hms_opt(18, 45, 0).unwrap(), 20.0);
        assert!(t.does_transact_for_day(day(20)));
        assert!(t.does_transact_for_day(day(20).and_hms_opt(1, 0, 0).unwrap()));
        assert!(!t.does_transact_for_day(day(21)));
    }

    #[test]
    fn amount_for_day_is_zero_when_inactive() {
        let t = Transaction::new(day(20), -7.5);
        assert_eq!(t.amount_for_day(day(20)), -7.5);
        assert_eq!(t.amount_for_day(day(19)), 0.0);
    }

    #[test]
    fn formatted_names() {
        let t = Transaction::new(day(20), 20.0);
        assert_eq!(t.formatted_name(), "$20");
        let t3 = Transaction::new(day(20), -20.0).named("Wowe");
        assert_eq!(t3.formatted_name(), "Wowe: -$20");
        assert_eq!(t.formatted_name_for_day(day(20)), "$20");
        assert_eq!(t.formatted_name_for_day(day(21)), "");
    }

    #[test]
    fn builder_reports_missing_fields() {
        let missing_when = Transaction::builder().amount(5.0).build();
        assert!(matches!(
            missing_when,
            Err(ProjectionError::MissingField("when"))
        ));
        let missing_amount = Transaction::builder().when(day(20)).build();
        assert!(matches!(
            missing_amount,
            Err(ProjectionError::MissingField("amount"))
        ));
        let built = Transaction::builder()
            .when(day(20))
            .amount(5.0)
            .name("Gift")
            .build()
            .unwrap();
        assert_eq!(built.name(), Some("Gift"));
    }

    #[test]
    fn when_parses_iso_text() {
        assert!(matches!("2012-12-20".parse::<When>(), Ok(When::Date(d)) if d == day(20)));
        assert!(
            matches!("2012-12-20T08:15:00".parse::<When>(), Ok(When::Date(d)) if d == day(20))
        );
        assert!(matches!(
            "every friday".parse::<When>(),
            Err(ProjectionError::InvalidWhenType(raw)) if raw == "every friday"
        ));
    }

    #[test]
    fn schedule_matches_per_day_queries() {
        let t = Transaction::new(FixedDates::from_days([day(21), day(22), day(21)]), 20.0);
        let schedule = t.schedule();
        assert_eq!(schedule.len(), 2);
        for d in 18..=25 {
            assert_eq!(schedule.contains(day(d)), t.does_transact_for_day(day(d)));
        }
    }
}
