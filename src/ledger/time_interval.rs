use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

/// A step of `every` calendar units, used to walk recurrence periods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeInterval {
    pub every: u32,
    pub unit: TimeUnit,
}

impl TimeInterval {
    pub fn new(every: u32, unit: TimeUnit) -> Self {
        Self { every, unit }
    }

    /// Advances `from` by one interval. Month and year steps clamp the day to
    /// the end of the target month. Returns `None` past the supported calendar.
    pub fn next_date(&self, from: NaiveDate) -> Option<NaiveDate> {
        let every = self.every as u64;
        match self.unit {
            TimeUnit::Day => from.checked_add_days(Days::new(every)),
            TimeUnit::Week => from.checked_add_days(Days::new(every * 7)),
            TimeUnit::Month => from.checked_add_months(Months::new(self.every)),
            TimeUnit::Year => from.checked_add_months(Months::new(self.every.checked_mul(12)?)),
        }
    }

    pub fn label(&self) -> String {
        match (self.every, &self.unit) {
            (1, TimeUnit::Day) => "Daily".into(),
            (1, TimeUnit::Week) => "Weekly".into(),
            (1, TimeUnit::Month) => "Monthly".into(),
            (1, TimeUnit::Year) => "Yearly".into(),
            (n, unit) => format!("Every {} {:?}{}", n, unit, if n > 1 { "s" } else { "" }),
        }
    }

    /// First day of the single-unit period containing `date`. Weeks start on Monday.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self.unit {
            TimeUnit::Day => date,
            TimeUnit::Week => {
                let delta = date.weekday().num_days_from_monday() as u64;
                date.checked_sub_days(Days::new(delta)).unwrap_or(date)
            }
            TimeUnit::Month => date.with_day(1).unwrap_or(date),
            TimeUnit::Year => date.with_ordinal(1).unwrap_or(date),
        }
    }

    /// Last day of the single-unit period that begins at `start`.
    pub fn period_end(&self, start: NaiveDate) -> NaiveDate {
        match self.unit {
            TimeUnit::Day => start,
            TimeUnit::Week => start.checked_add_days(Days::new(6)).unwrap_or(start),
            TimeUnit::Month => NaiveDate::from_ymd_opt(
                start.year(),
                start.month(),
                days_in_month(start.year(), start.month()),
            )
            .unwrap_or(start),
            TimeUnit::Year => NaiveDate::from_ymd_opt(start.year(), 12, 31).unwrap_or(start),
        }
    }

    /// Every calendar day of the single-unit period that begins at `start`.
    pub fn period_days(&self, start: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        let end = self.period_end(start);
        start.iter_days().take_while(move |day| *day <= end)
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn next_date_steps_each_unit() {
        let start = date(2025, 1, 1);
        assert_eq!(
            TimeInterval::new(3, TimeUnit::Day).next_date(start),
            Some(date(2025, 1, 4))
        );
        assert_eq!(
            TimeInterval::new(2, TimeUnit::Week).next_date(start),
            Some(date(2025, 1, 15))
        );
        assert_eq!(
            TimeInterval::new(1, TimeUnit::Month).next_date(start),
            Some(date(2025, 2, 1))
        );
        assert_eq!(
            TimeInterval::new(1, TimeUnit::Year).next_date(start),
            Some(date(2026, 1, 1))
        );
    }

    #[test]
    fn month_step_clamps_to_month_end() {
        let monthly = TimeInterval::new(1, TimeUnit::Month);
        assert_eq!(monthly.next_date(date(2024, 1, 31)), Some(date(2024, 2, 29)));
    }

    #[test]
    fn period_bounds_cover_whole_unit() {
        let weekly = TimeInterval::new(1, TimeUnit::Week);
        // 2024-12-20 is a Friday.
        let start = weekly.period_start(date(2024, 12, 20));
        assert_eq!(start, date(2024, 12, 16));
        assert_eq!(weekly.period_days(start).count(), 7);

        let monthly = TimeInterval::new(1, TimeUnit::Month);
        let feb = monthly.period_start(date(2024, 2, 17));
        assert_eq!(monthly.period_end(feb), date(2024, 2, 29));

        let yearly = TimeInterval::new(1, TimeUnit::Year);
        assert_eq!(yearly.period_days(date(2023, 1, 1)).count(), 365);
    }

    #[test]
    fn labels() {
        assert_eq!(TimeInterval::new(1, TimeUnit::Month).label(), "Monthly");
        assert_eq!(TimeInterval::new(2, TimeUnit::Week).label(), "Every 2 Weeks");
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 12), 31);
    }
}
