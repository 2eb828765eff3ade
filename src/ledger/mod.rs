//! Transaction model, recurrence sources and calendar helpers.

pub mod date_range;
pub mod recurrence;
pub mod time_interval;
pub mod transaction;

pub use date_range::{CalendarDate, DateRange};
pub use recurrence::{
    FixedDates, RecurrenceEnd, RecurrenceRule, RecurrenceRuleBuilder, RecurrenceSource,
};
pub use time_interval::{TimeInterval, TimeUnit};
pub use transaction::{Schedule, Transaction, TransactionBuilder, When};
