//! The difference engine.
//!
//! Calendar units (years, months) count whole shifts of the start instant that
//! stay at or before the end instant. Fixed units divide the elapsed
//! nanoseconds by the unit length. Every function checks `start <= end` first
//! and fails with [`DiffError::InvertedRange`] otherwise.

use std::fmt;

use tracing::trace;

use crate::error::{DiffError, Result};
use crate::time::CalendarTime;
use crate::unit::{CalendarUnit, FixedUnit, Unit, UnitClass, Units};

/// A difference broken down by unit.
///
/// Only the units that were asked for are filled in; the rest are zero. For
/// the single-unit functions `nanoseconds` holds what is left over after the
/// whole units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DateDiff {
    years: i64,
    months: i64,
    weeks: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    milliseconds: i64,
    nanoseconds: i128,
}

impl DateDiff {
    pub fn years(&self) -> i64 {
        self.years
    }
    pub fn months(&self) -> i64 {
        self.months
    }
    pub fn weeks(&self) -> i64 {
        self.weeks
    }
    pub fn days(&self) -> i64 {
        self.days
    }
    pub fn hours(&self) -> i64 {
        self.hours
    }
    pub fn minutes(&self) -> i64 {
        self.minutes
    }
    pub fn seconds(&self) -> i64 {
        self.seconds
    }
    pub fn milliseconds(&self) -> i64 {
        self.milliseconds
    }
    pub fn nanoseconds(&self) -> i128 {
        self.nanoseconds
    }

    /// Value of the field for `unit`, widened so every field fits.
    pub fn get(&self, unit: Unit) -> i128 {
        match unit {
            Unit::Years => i128::from(self.years),
            Unit::Months => i128::from(self.months),
            Unit::Weeks => i128::from(self.weeks),
            Unit::Days => i128::from(self.days),
            Unit::Hours => i128::from(self.hours),
            Unit::Minutes => i128::from(self.minutes),
            Unit::Seconds => i128::from(self.seconds),
            Unit::Milliseconds => i128::from(self.milliseconds),
            Unit::Nanoseconds => self.nanoseconds,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == DateDiff::default()
    }

    fn set_count(&mut self, unit: Unit, count: i64) {
        match unit {
            Unit::Years => self.years = count,
            Unit::Months => self.months = count,
            Unit::Weeks => self.weeks = count,
            Unit::Days => self.days = count,
            Unit::Hours => self.hours = count,
            Unit::Minutes => self.minutes = count,
            Unit::Seconds => self.seconds = count,
            Unit::Milliseconds => self.milliseconds = count,
            Unit::Nanoseconds => self.nanoseconds = i128::from(count),
        }
    }

    fn single(unit: Unit, count: i64, remainder: i128) -> Self {
        let mut diff = DateDiff {
            nanoseconds: remainder,
            ..DateDiff::default()
        };
        diff.set_count(unit, count);
        diff
    }
}

/// Lists the non-zero fields, e.g. "1 year, 6 months, 2 hours".
impl fmt::Display for DateDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for unit in Unit::ALL {
            let value = self.get(unit);
            if value == 0 {
                continue;
            }
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            let name = unit.name();
            if value == 1 {
                write!(f, "1 {}", &name[..name.len() - 1])?;
            } else {
                write!(f, "{} {}", value, name)?;
            }
        }
        if first {
            f.write_str("0 nanoseconds")?;
        }
        Ok(())
    }
}

/// Which units to compute and whether to decompose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffOptions {
    #[cfg_attr(feature = "serde", serde(default))]
    units: Units,
    #[cfg_attr(feature = "serde", serde(default))]
    running: bool,
}

impl DiffOptions {
    /// No units, non-running.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.units.insert(unit);
        self
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units.extend(units.iter());
        self
    }

    /// In running mode each unit only sees what the coarser units left over.
    pub fn running(mut self, running: bool) -> Self {
        self.running = running;
        self
    }

    pub fn selected(&self) -> Units {
        self.units
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Result of counting one unit from `from` towards `end`.
struct Step<T> {
    count: i64,
    remainder: i128,
    /// `from` advanced by `count` units.
    reached: T,
}

/// Elapsed nanoseconds, or the error if `end` is before `start`.
fn elapsed<T: CalendarTime>(start: &T, end: &T) -> Result<i128> {
    if end < start {
        return Err(DiffError::InvertedRange {
            gap_nanos: start.nanos_since(end),
        });
    }
    Ok(end.nanos_since(start))
}

fn calendar_step<T: CalendarTime>(from: &T, end: &T, unit: CalendarUnit) -> Step<T> {
    let years = end.calendar_year() - from.calendar_year();
    let naive = match unit {
        CalendarUnit::Years => years,
        CalendarUnit::Months => {
            years * 12 + i64::from(end.calendar_month()) - i64::from(from.calendar_month())
        }
    };
    // Shifting by naive + 1 always lands past `end`, so only downward
    // corrections are needed. Roll-over can push a shift a few days late,
    // which occasionally costs a second correction.
    let mut count = naive.max(0);
    while count > 0 {
        match from.add_months(count * unit.months()) {
            Some(shifted) if shifted <= *end => {
                return Step {
                    count,
                    remainder: end.nanos_since(&shifted),
                    reached: shifted,
                };
            }
            _ => {
                trace!(?unit, count, "calendar shift overshoots end, correcting");
                count -= 1;
            }
        }
    }
    Step {
        count: 0,
        remainder: end.nanos_since(from),
        reached: *from,
    }
}

fn fixed_step<T: CalendarTime>(from: &T, end: &T, unit: FixedUnit) -> Step<T> {
    let gap = end.nanos_since(from);
    let size = unit.nanos();
    let whole = gap / size;
    Step {
        count: i64::try_from(whole).unwrap_or(i64::MAX),
        remainder: gap - whole * size,
        reached: from.add_nanos(whole * size),
    }
}

/// Whole calendar years or months between `start` and `end`.
///
/// The count starts from the difference of the year (and month) fields and is
/// lowered while shifting `start` by it would pass `end`. The remaining
/// nanoseconds are returned in the `nanoseconds` field.
pub fn diff_calendar_unit<T: CalendarTime>(
    start: &T,
    end: &T,
    unit: CalendarUnit,
) -> Result<DateDiff> {
    elapsed(start, end)?;
    let step = calendar_step(start, end, unit);
    Ok(DateDiff::single(unit.into(), step.count, step.remainder))
}

/// Whole fixed-length units between `start` and `end`, with the remaining
/// nanoseconds in the `nanoseconds` field.
pub fn diff_fixed_unit<T: CalendarTime>(start: &T, end: &T, unit: FixedUnit) -> Result<DateDiff> {
    elapsed(start, end)?;
    let step = fixed_step(start, end, unit);
    Ok(DateDiff::single(unit.into(), step.count, step.remainder))
}

pub fn diff_years<T: CalendarTime>(start: &T, end: &T) -> Result<DateDiff> {
    diff_calendar_unit(start, end, CalendarUnit::Years)
}

pub fn diff_months<T: CalendarTime>(start: &T, end: &T) -> Result<DateDiff> {
    diff_calendar_unit(start, end, CalendarUnit::Months)
}

pub fn diff_weeks<T: CalendarTime>(start: &T, end: &T) -> Result<DateDiff> {
    diff_fixed_unit(start, end, FixedUnit::Weeks)
}

pub fn diff_days<T: CalendarTime>(start: &T, end: &T) -> Result<DateDiff> {
    diff_fixed_unit(start, end, FixedUnit::Days)
}

pub fn diff_hours<T: CalendarTime>(start: &T, end: &T) -> Result<DateDiff> {
    diff_fixed_unit(start, end, FixedUnit::Hours)
}

pub fn diff_minutes<T: CalendarTime>(start: &T, end: &T) -> Result<DateDiff> {
    diff_fixed_unit(start, end, FixedUnit::Minutes)
}

pub fn diff_seconds<T: CalendarTime>(start: &T, end: &T) -> Result<DateDiff> {
    diff_fixed_unit(start, end, FixedUnit::Seconds)
}

pub fn diff_milliseconds<T: CalendarTime>(start: &T, end: &T) -> Result<DateDiff> {
    diff_fixed_unit(start, end, FixedUnit::Milliseconds)
}

/// Total elapsed nanoseconds.
pub fn diff_nanoseconds<T: CalendarTime>(start: &T, end: &T) -> Result<DateDiff> {
    let gap = elapsed(start, end)?;
    Ok(DateDiff {
        nanoseconds: gap,
        ..DateDiff::default()
    })
}

/// Computes every unit in `units`, coarsest first.
///
/// Without `running`, each unit is measured over the whole span on its own:
/// `{days, hours}` over two days gives 2 days and 48 hours. With `running`,
/// `start` is advanced past each computed unit before the next one, so the
/// fields add up to the span: the same request gives 2 days and 0 hours.
/// Nanoseconds, when requested, is whatever gap is left at the end.
pub fn diff<T: CalendarTime>(start: &T, end: &T, units: &Units, running: bool) -> Result<DateDiff> {
    elapsed(start, end)?;

    let mut result = DateDiff::default();
    let mut cursor = *start;
    for unit in units.iter() {
        let from = if running { cursor } else { *start };
        let step = match unit.class() {
            UnitClass::Calendar(calendar) => calendar_step(&from, end, calendar),
            UnitClass::Fixed(fixed) => fixed_step(&from, end, fixed),
            UnitClass::Nanoseconds => {
                result.nanoseconds = end.nanos_since(&from);
                continue;
            }
        };
        result.set_count(unit, step.count);
        if running {
            trace!(%unit, count = step.count, "advancing start");
            cursor = step.reached;
        }
    }
    Ok(result)
}

/// `diff` driven by a [`DiffOptions`].
pub fn diff_with<T: CalendarTime>(start: &T, end: &T, options: &DiffOptions) -> Result<DateDiff> {
    diff(start, end, &options.units, options.running)
}
