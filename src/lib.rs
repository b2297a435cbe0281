//! Calendar-aware differences between two instants.
//!
//! ```
//! use datediff::{diff, NanoTime, Unit, Units};
//!
//! let start = NanoTime::from_ymd(2024, 1, 1).unwrap();
//! let end = NanoTime::new(2025, 7, 15, 2, 0, 0, 0).unwrap();
//! let units = Units::from([Unit::Years, Unit::Months, Unit::Weeks, Unit::Hours]);
//!
//! let d = diff(&start, &end, &units, true).unwrap();
//! assert_eq!(d.to_string(), "1 year, 6 months, 2 weeks, 2 hours");
//! ```

mod diff;
mod error;
mod time;
mod unit;

pub use diff::{
    diff, diff_calendar_unit, diff_days, diff_fixed_unit, diff_hours, diff_milliseconds,
    diff_minutes, diff_months, diff_nanoseconds, diff_seconds, diff_weeks, diff_with, diff_years,
    DateDiff, DiffOptions,
};
pub use error::{DiffError, Result};
pub use time::{CalendarTime, NanoTime};
pub use unit::{CalendarUnit, FixedUnit, Unit, Units};
