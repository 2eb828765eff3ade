use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use super::date_range::CalendarDate;
use super::time_interval::{days_in_month, TimeInterval, TimeUnit};
use crate::errors::ProjectionError;

/// Consecutive periods without an occurrence a count-bounded rule may walk
/// before its filters are treated as unsatisfiable.
const MAX_BARREN_PERIODS: usize = 50_000;

/// A finite, ordered generator of occurrence timestamps.
///
/// Only the calendar date of each occurrence is significant to the projection
/// engine; sources are free to carry a time-of-day.
pub trait RecurrenceSource: fmt::Debug + Send + Sync {
    fn occurrences(&self) -> Vec<NaiveDateTime>;

    fn occurs_on(&self, day: NaiveDate) -> bool {
        self.occurrences()
            .iter()
            .any(|occurrence| occurrence.date() == day)
    }
}

/// An explicit list of occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixedDates(Vec<NaiveDateTime>);

impl FixedDates {
    pub fn new(dates: impl IntoIterator<Item = NaiveDateTime>) -> Self {
        let mut dates: Vec<_> = dates.into_iter().collect();
        dates.sort();
        Self(dates)
    }

    pub fn from_days(days: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self::new(days.into_iter().map(|day| day.and_time(chrono::NaiveTime::MIN)))
    }
}

impl RecurrenceSource for FixedDates {
    fn occurrences(&self) -> Vec<NaiveDateTime> {
        self.0.clone()
    }

    fn occurs_on(&self, day: NaiveDate) -> bool {
        self.0.iter().any(|occurrence| occurrence.date() == day)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecurrenceEnd {
    /// Last day (inclusive) an occurrence may fall on.
    OnDate(NaiveDate),
    AfterOccurrences(u32),
}

/// Repeating calendar rule in the spirit of RFC 5545 `RRULE`, restricted to
/// the month, month-day and weekday filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    interval: TimeInterval,
    start: NaiveDateTime,
    end: RecurrenceEnd,
    by_month: Vec<u32>,
    by_month_day: Vec<i32>,
    by_weekday: Vec<Weekday>,
}

impl RecurrenceRule {
    pub fn builder(unit: TimeUnit, start: NaiveDateTime) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder {
            interval: TimeInterval::new(1, unit),
            start,
            end: None,
            by_month: Vec::new(),
            by_month_day: Vec::new(),
            by_weekday: Vec::new(),
        }
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> RecurrenceEnd {
        self.end
    }

    fn until(&self) -> Option<NaiveDate> {
        match self.end {
            RecurrenceEnd::OnDate(date) => Some(date),
            RecurrenceEnd::AfterOccurrences(_) => None,
        }
    }

    fn limit(&self) -> Option<usize> {
        match self.end {
            RecurrenceEnd::OnDate(_) => None,
            RecurrenceEnd::AfterOccurrences(count) => Some(count as usize),
        }
    }

    /// Filters in effect once defaults derived from the start are applied:
    /// with no day filter, yearly rules repeat on the start's month and day,
    /// monthly rules on the start's day and weekly rules on the start's weekday.
    fn effective_filters(&self) -> (Vec<u32>, Vec<i32>, Vec<Weekday>) {
        let mut months = self.by_month.clone();
        let mut month_days = self.by_month_day.clone();
        let mut weekdays = self.by_weekday.clone();
        let start = self.start.date();
        if month_days.is_empty() && weekdays.is_empty() {
            match self.interval.unit {
                TimeUnit::Year => {
                    if months.is_empty() {
                        months.push(start.month());
                    }
                    month_days.push(start.day() as i32);
                }
                TimeUnit::Month => month_days.push(start.day() as i32),
                TimeUnit::Week => weekdays.push(start.weekday()),
                TimeUnit::Day => {}
            }
        }
        (months, month_days, weekdays)
    }

    fn enumerate(&self) -> Vec<NaiveDateTime> {
        let (months, month_days, weekdays) = self.effective_filters();
        let matches = |day: NaiveDate| {
            let month_ok = months.is_empty() || months.contains(&day.month());
            let month_day_ok = month_days.is_empty() || {
                let forward = day.day() as i32;
                let backward = forward - days_in_month(day.year(), day.month()) as i32 - 1;
                month_days.contains(&forward) || month_days.contains(&backward)
            };
            let weekday_ok = weekdays.is_empty() || weekdays.contains(&day.weekday());
            month_ok && month_day_ok && weekday_ok
        };

        let start_date = self.start.date();
        let until = self.until();
        let limit = self.limit();
        let mut result = Vec::new();
        if limit == Some(0) {
            return result;
        }

        let mut period = self.interval.period_start(start_date);
        let mut barren = 0;
        loop {
            if until.is_some_and(|until| period > until) {
                return result;
            }
            let before = result.len();
            for day in self.interval.period_days(period) {
                if day < start_date || !matches(day) {
                    continue;
                }
                if until.is_some_and(|until| day > until) {
                    return result;
                }
                result.push(day.and_time(self.start.time()));
                if limit.is_some_and(|limit| result.len() >= limit) {
                    return result;
                }
            }
            barren = if result.len() == before { barren + 1 } else { 0 };
            // An `until` bound always terminates; only count-bounded rules need the guard.
            if until.is_none() && barren >= MAX_BARREN_PERIODS {
                break;
            }
            period = match self.interval.next_date(period) {
                Some(next) => next,
                None => return result,
            };
        }

        tracing::warn!(
            interval = %self.interval.label(),
            start = %self.start,
            generated = result.len(),
            "recurrence filters stopped matching; enumeration cut short"
        );
        result
    }
}

impl RecurrenceSource for RecurrenceRule {
    fn occurrences(&self) -> Vec<NaiveDateTime> {
        self.enumerate()
    }

    fn occurs_on(&self, day: NaiveDate) -> bool {
        if day < self.start.date() || self.until().is_some_and(|until| day > until) {
            return false;
        }
        self.enumerate()
            .iter()
            .any(|occurrence| occurrence.date() == day)
    }
}

#[derive(Debug, Clone)]
pub struct RecurrenceRuleBuilder {
    interval: TimeInterval,
    start: NaiveDateTime,
    end: Option<RecurrenceEnd>,
    by_month: Vec<u32>,
    by_month_day: Vec<i32>,
    by_weekday: Vec<Weekday>,
}

impl RecurrenceRuleBuilder {
    pub fn every(mut self, every: u32) -> Self {
        self.interval.every = every;
        self
    }

    /// Last calendar day an occurrence may fall on. Time-of-day is ignored.
    pub fn until(mut self, until: impl CalendarDate) -> Self {
        self.end = Some(RecurrenceEnd::OnDate(until.calendar_date()));
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.end = Some(RecurrenceEnd::AfterOccurrences(count));
        self
    }

    pub fn in_months(mut self, months: impl IntoIterator<Item = u32>) -> Self {
        self.by_month.extend(months);
        self
    }

    /// Days of the month; negative values count back from the month end.
    pub fn on_month_days(mut self, days: impl IntoIterator<Item = i32>) -> Self {
        self.by_month_day.extend(days);
        self
    }

    pub fn on_weekdays(mut self, weekdays: impl IntoIterator<Item = Weekday>) -> Self {
        self.by_weekday.extend(weekdays);
        self
    }

    pub fn build(self) -> Result<RecurrenceRule, ProjectionError> {
        let end = self.end.ok_or_else(|| {
            ProjectionError::InvalidRecurrence(
                "rule needs an end date or an occurrence count".into(),
            )
        })?;
        if self.interval.every == 0 {
            return Err(ProjectionError::InvalidRecurrence(
                "interval must be at least 1".into(),
            ));
        }
        if let Some(month) = self.by_month.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(ProjectionError::InvalidRecurrence(format!(
                "month {} is outside 1..=12",
                month
            )));
        }
        if let Some(day) = self
            .by_month_day
            .iter()
            .find(|d| **d == 0 || d.abs() > 31)
        {
            return Err(ProjectionError::InvalidRecurrence(format!(
                "month day {} is outside ±1..=31",
                day
            )));
        }
        let mut by_month = self.by_month;
        by_month.sort_unstable();
        by_month.dedup();
        Ok(RecurrenceRule {
            interval: self.interval,
            start: self.start,
            end,
            by_month,
            by_month_day: self.by_month_day,
            by_weekday: self.by_weekday,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn days(rule: &RecurrenceRule) -> Vec<NaiveDate> {
        rule.occurrences().iter().map(|o| o.date()).collect()
    }

    #[test]
    fn daily_rule_runs_from_start_to_until() {
        let rule = RecurrenceRule::builder(TimeUnit::Day, at(2012, 12, 21))
            .until(at(2012, 12, 22))
            .build()
            .unwrap();
        assert_eq!(
            days(&rule),
            vec![at(2012, 12, 21).date(), at(2012, 12, 22).date()]
        );
        assert!(rule
            .occurrences()
            .iter()
            .all(|o| o.time() == at(2012, 12, 21).time()));
    }

    #[test]
    fn biweekly_rule_keeps_start_weekday() {
        // 2017-02-17 is a Friday.
        let rule = RecurrenceRule::builder(TimeUnit::Week, at(2017, 2, 17))
            .every(2)
            .count(3)
            .build()
            .unwrap();
        assert_eq!(
            days(&rule),
            vec![
                at(2017, 2, 17).date(),
                at(2017, 3, 3).date(),
                at(2017, 3, 17).date()
            ]
        );
    }

    #[test]
    fn negative_month_day_means_last_day() {
        let rule = RecurrenceRule::builder(TimeUnit::Month, at(2024, 1, 5))
            .on_month_days([-1])
            .count(3)
            .build()
            .unwrap();
        assert_eq!(
            days(&rule),
            vec![
                at(2024, 1, 31).date(),
                at(2024, 2, 29).date(),
                at(2024, 3, 31).date()
            ]
        );
    }

    #[test]
    fn monthly_rule_filters_months() {
        let rule = RecurrenceRule::builder(TimeUnit::Month, at(2024, 1, 1))
            .in_months([6, 12])
            .on_month_days([10])
            .until(at(2025, 12, 31))
            .build()
            .unwrap();
        assert_eq!(
            days(&rule),
            vec![
                at(2024, 6, 10).date(),
                at(2024, 12, 10).date(),
                at(2025, 6, 10).date(),
                at(2025, 12, 10).date()
            ]
        );
    }

    #[test]
    fn monthly_default_skips_short_months() {
        let rule = RecurrenceRule::builder(TimeUnit::Month, at(2023, 1, 31))
            .count(3)
            .build()
            .unwrap();
        assert_eq!(
            days(&rule),
            vec![
                at(2023, 1, 31).date(),
                at(2023, 3, 31).date(),
                at(2023, 5, 31).date()
            ]
        );
    }

    #[test]
    fn yearly_rule_with_month_and_day() {
        let rule = RecurrenceRule::builder(TimeUnit::Year, at(2024, 3, 1))
            .in_months([1])
            .on_month_days([9])
            .until(at(2026, 12, 31))
            .build()
            .unwrap();
        assert_eq!(
            days(&rule),
            vec![at(2025, 1, 9).date(), at(2026, 1, 9).date()]
        );
    }

    #[test]
    fn occurs_on_respects_bounds() {
        let rule = RecurrenceRule::builder(TimeUnit::Day, at(2012, 12, 21))
            .until(at(2012, 12, 22))
            .build()
            .unwrap();
        assert!(!rule.occurs_on(at(2012, 12, 20).date()));
        assert!(rule.occurs_on(at(2012, 12, 21).date()));
        assert!(!rule.occurs_on(at(2012, 12, 23).date()));
    }

    #[test]
    fn long_daily_rule_reaches_its_until_date() {
        let rule = RecurrenceRule::builder(TimeUnit::Day, at(1900, 1, 1))
            .until(at(2100, 1, 1))
            .build()
            .unwrap();
        let all = days(&rule);
        assert_eq!(all.len(), 73_050);
        assert_eq!(all.last(), Some(&at(2100, 1, 1).date()));
        assert!(rule.occurs_on(at(2060, 1, 1).date()));
    }

    #[test]
    fn sparse_count_rule_is_not_cut_short() {
        // Feb 29 falls at most eight years apart, so no barren run comes near the guard.
        let rule = RecurrenceRule::builder(TimeUnit::Day, at(2024, 1, 1))
            .in_months([2])
            .on_month_days([29])
            .count(30)
            .build()
            .unwrap();
        let all = days(&rule);
        assert_eq!(all.len(), 30);
        assert!(all.iter().all(|d| d.month() == 2 && d.day() == 29));
    }

    #[test]
    fn impossible_filters_stop_at_guard() {
        let rule = RecurrenceRule::builder(TimeUnit::Month, at(2024, 1, 1))
            .in_months([2])
            .on_month_days([30])
            .count(1)
            .build()
            .unwrap();
        assert!(rule.occurrences().is_empty());
    }

    #[test]
    fn builder_rejects_invalid_rules() {
        let start = at(2024, 1, 1);
        assert!(matches!(
            RecurrenceRule::builder(TimeUnit::Day, start).build(),
            Err(ProjectionError::InvalidRecurrence(_))
        ));
        assert!(RecurrenceRule::builder(TimeUnit::Day, start)
            .every(0)
            .count(1)
            .build()
            .is_err());
        assert!(RecurrenceRule::builder(TimeUnit::Month, start)
            .in_months([13])
            .count(1)
            .build()
            .is_err());
        assert!(RecurrenceRule::builder(TimeUnit::Month, start)
            .on_month_days([0])
            .count(1)
            .build()
            .is_err());
    }

    #[test]
    fn fixed_dates_are_sorted() {
        let source = FixedDates::new([at(2024, 1, 3), at(2024, 1, 1)]);
        assert_eq!(source.occurrences(), vec![at(2024, 1, 1), at(2024, 1, 3)]);
        assert!(source.occurs_on(at(2024, 1, 3).date()));
        assert!(!source.occurs_on(at(2024, 1, 2).date()));
    }
}
