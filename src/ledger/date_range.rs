use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Anything that can be reduced to a calendar day. Time-of-day is discarded.
pub trait CalendarDate {
    fn calendar_date(&self) -> NaiveDate;
}

impl CalendarDate for NaiveDate {
    fn calendar_date(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDate for NaiveDateTime {
    fn calendar_date(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDate for DateTime<Tz> {
    fn calendar_date(&self) -> NaiveDate {
        self.date_naive()
    }
}

impl<T: CalendarDate + ?Sized> CalendarDate for &T {
    fn calendar_date(&self) -> NaiveDate {
        (**self).calendar_date()
    }
}

/// Inclusive range of calendar days. A range whose `from` lies after `to` is
/// empty rather than invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: impl CalendarDate, to: impl CalendarDate) -> Self {
        Self {
            from: from.calendar_date(),
            to: to.calendar_date(),
        }
    }

    /// `horizon_days` days after `from`, both ends included.
    pub fn with_horizon(from: impl CalendarDate, horizon_days: u32) -> Self {
        let from = from.calendar_date();
        let to = from
            .checked_add_days(Days::new(horizon_days as u64))
            .unwrap_or(NaiveDate::MAX);
        Self { from, to }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let to = self.to;
        let from = self.from;
        from.iter_days().take_while(move |day| *day <= to)
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.to - self.from).num_days() as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }

    pub fn contains(&self, date: impl CalendarDate) -> bool {
        let date = date.calendar_date();
        date >= self.from && date <= self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_are_inclusive_and_ascending() {
        let range = DateRange::new(date(2012, 12, 20), date(2012, 12, 24));
        let days: Vec<_> = range.days().collect();
        assert_eq!(days.len(), 5);
        assert_eq!(range.len(), 5);
        assert_eq!(days.first(), Some(&date(2012, 12, 20)));
        assert_eq!(days.last(), Some(&date(2012, 12, 24)));
    }

    #[test]
    fn reversed_bounds_are_empty() {
        let range = DateRange::new(date(2024, 3, 2), date(2024, 3, 1));
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.days().count(), 0);
    }

    #[test]
    fn time_of_day_is_dropped() {
        let from = date(2024, 1, 1).and_hms_opt(23, 59, 0).unwrap();
        let to = date(2024, 1, 2).and_hms_opt(0, 1, 0).unwrap();
        let range = DateRange::new(from, to);
        assert_eq!(range.len(), 2);
        assert!(range.contains(date(2024, 1, 2).and_hms_opt(12, 0, 0).unwrap()));
    }

    #[test]
    fn horizon_adds_days_after_start() {
        let range = DateRange::with_horizon(date(2024, 1, 1), 400);
        assert_eq!(range.len(), 401);
    }
}
