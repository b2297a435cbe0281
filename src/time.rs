use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) const NANOS_PER_SEC: i128 = 1_000_000_000;
const SECS_PER_DAY: i64 = 86_400;
const NANOS_PER_DAY: i128 = SECS_PER_DAY as i128 * NANOS_PER_SEC;

/// Calendar and clock operations the diff engine needs from a point in time.
///
/// Implementors must apply the same day-overflow rule everywhere `add_months`
/// is used: a day-of-month that does not exist in the target month rolls over
/// into the following month (Jan 31 + 1 month is Mar 2 in a leap year).
pub trait CalendarTime: Copy + Ord {
    /// Proleptic Gregorian year.
    fn calendar_year(&self) -> i64;

    /// Month of year, 1 through 12.
    fn calendar_month(&self) -> u8;

    /// Signed nanoseconds from `earlier` to `self`.
    fn nanos_since(&self, earlier: &Self) -> i128;

    /// Shifts by a signed number of calendar months, carrying day and time of day.
    /// Returns `None` when the result is not representable.
    fn add_months(&self, months: i64) -> Option<Self>;

    /// Shifts by a signed number of nanoseconds, saturating at the representable range.
    fn add_nanos(&self, nanos: i128) -> Self;
}

fn is_leap_year(year: u16) -> bool {
    (year.is_multiple_of(4) && !year.is_multiple_of(100)) || year.is_multiple_of(400)
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Days since 1970-01-01 for a civil date, using Howard Hinnant's `days_from_civil`.
/// `day` may exceed the length of the month; the excess carries forward.
fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400; // year of era [0, 399]
    let m = i64::from(month);
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of `days_from_civil` (Hinnant's `civil_from_days`).
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468; // shift epoch to 0000-03-01
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097; // day of era [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // year of era [0, 399]
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // day of year [0, 365]
    let mp = (5 * doy + 2) / 153; // month proxy [0, 11]
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    (if month <= 2 { y + 1 } else { y }, month, day)
}

/// A UTC calendar instant with nanosecond resolution.
///
/// Years run from 0 to 65535 in the proleptic Gregorian calendar. Ordering is
/// chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NanoTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    nanosecond: u32,
}

impl NanoTime {
    /// Earliest representable instant, 0000-01-01 00:00:00.
    pub const MIN: NanoTime = NanoTime {
        year: 0,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
        nanosecond: 0,
    };

    /// Latest representable instant, 65535-12-31 23:59:59.999999999.
    pub const MAX: NanoTime = NanoTime {
        year: u16::MAX,
        month: 12,
        day: 31,
        hour: 23,
        minute: 59,
        second: 59,
        nanosecond: 999_999_999,
    };

    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        nanosecond: u32,
    ) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        if day < 1 || day > days_in_month(year, month) {
            return None;
        }
        if hour > 23 {
            return None;
        }
        if minute > 59 {
            return None;
        }
        if second > 59 {
            return None;
        }
        if nanosecond > 999_999_999 {
            return None;
        }
        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            nanosecond,
        })
    }

    /// Midnight at the start of the given date.
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Option<Self> {
        Self::new(year, month, day, 0, 0, 0, 0)
    }

    pub fn year(&self) -> u16 {
        self.year
    }
    pub fn month(&self) -> u8 {
        self.month
    }
    pub fn day(&self) -> u8 {
        self.day
    }
    pub fn hour(&self) -> u8 {
        self.hour
    }
    pub fn minute(&self) -> u8 {
        self.minute
    }
    pub fn second(&self) -> u8 {
        self.second
    }
    pub fn nanosecond(&self) -> u32 {
        self.nanosecond
    }

    /// Returns current UTC time via SystemTime + calendar math.
    ///
    /// The diff functions never call this; it exists for callers that want to
    /// measure against the present.
    pub fn now_utc() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let nanos = i128::try_from(duration.as_nanos()).unwrap_or(i128::MAX);
        Self::from_epoch_nanos(nanos).unwrap_or(Self::MAX)
    }

    /// Constructs a NanoTime from signed Unix epoch seconds.
    pub fn from_epoch(secs: i64) -> Option<Self> {
        Self::from_epoch_nanos(i128::from(secs) * NANOS_PER_SEC)
    }

    /// Constructs from signed nanoseconds since the Unix epoch.
    /// Returns `None` outside the `MIN..=MAX` range.
    pub fn from_epoch_nanos(nanos: i128) -> Option<Self> {
        if nanos < Self::MIN.to_epoch_nanos() || nanos > Self::MAX.to_epoch_nanos() {
            return None;
        }
        let days = i64::try_from(nanos.div_euclid(NANOS_PER_DAY)).ok()?;
        let day_nanos = nanos.rem_euclid(NANOS_PER_DAY);
        let day_secs = (day_nanos / NANOS_PER_SEC) as u32;
        let (year, month, day) = civil_from_days(days);
        Some(Self {
            year: u16::try_from(year).ok()?,
            month,
            day,
            hour: (day_secs / 3600) as u8,
            minute: ((day_secs % 3600) / 60) as u8,
            second: (day_secs % 60) as u8,
            nanosecond: (day_nanos % NANOS_PER_SEC) as u32,
        })
    }

    /// Converts back to signed Unix epoch seconds, dropping the sub-second part.
    pub fn to_epoch_secs(&self) -> i64 {
        days_from_civil(i64::from(self.year), self.month, self.day) * SECS_PER_DAY
            + i64::from(self.hour) * 3600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }

    /// Returns total signed nanoseconds since the Unix epoch.
    pub fn to_epoch_nanos(&self) -> i128 {
        i128::from(self.to_epoch_secs()) * NANOS_PER_SEC + i128::from(self.nanosecond)
    }

    /// Shifts by whole calendar months, keeping day-of-month and time of day.
    ///
    /// A day past the end of the target month rolls over into the next one:
    /// 2023-01-31 + 1 month is 2023-03-03, 2024-02-29 + 12 months is 2025-03-01.
    pub fn add_months(&self, months: i64) -> Option<Self> {
        let index = i64::from(self.year)
            .checked_mul(12)?
            .checked_add(i64::from(self.month) - 1)?
            .checked_add(months)?;
        let year = index.div_euclid(12);
        if !(0..=i64::from(u16::MAX)).contains(&year) {
            return None;
        }
        let month = (index.rem_euclid(12) + 1) as u8;
        let days = days_from_civil(year, month, self.day);
        let nanos = i128::from(days) * NANOS_PER_DAY + self.time_of_day_nanos();
        Self::from_epoch_nanos(nanos)
    }

    /// Shifts by whole calendar years. Same roll-over rule as `add_months`.
    pub fn add_years(&self, years: i64) -> Option<Self> {
        self.add_months(years.checked_mul(12)?)
    }

    /// Shifts by signed nanoseconds, saturating at `MIN` and `MAX`.
    pub fn add_nanos(&self, nanos: i128) -> Self {
        Self::from_epoch_nanos(self.to_epoch_nanos().saturating_add(nanos)).unwrap_or(
            if nanos < 0 {
                Self::MIN
            } else {
                Self::MAX
            },
        )
    }

    fn time_of_day_nanos(&self) -> i128 {
        (i128::from(self.hour) * 3600 + i128::from(self.minute) * 60 + i128::from(self.second))
            * NANOS_PER_SEC
            + i128::from(self.nanosecond)
    }

    /// Formats as "YYYY-MM-DD".
    pub fn date(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// Formats as "YYYY-MM-DD HH:MM:SS" with `precision` fractional digits (0–9).
    /// Values above 9 are clamped to 9.
    pub fn datetime_fmt(&self, precision: u8) -> String {
        let p = precision.min(9) as usize;
        if p == 0 {
            format!(
                "{} {:02}:{:02}:{:02}",
                self.date(),
                self.hour,
                self.minute,
                self.second
            )
        } else {
            let nanos_str = format!("{:09}", self.nanosecond);
            format!(
                "{} {:02}:{:02}:{:02}.{}",
                self.date(),
                self.hour,
                self.minute,
                self.second,
                &nanos_str[..p]
            )
        }
    }
}

impl fmt::Display for NanoTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.datetime_fmt(9))
    }
}

impl CalendarTime for NanoTime {
    fn calendar_year(&self) -> i64 {
        i64::from(self.year)
    }

    fn calendar_month(&self) -> u8 {
        self.month
    }

    fn nanos_since(&self, earlier: &Self) -> i128 {
        self.to_epoch_nanos() - earlier.to_epoch_nanos()
    }

    fn add_months(&self, months: i64) -> Option<Self> {
        NanoTime::add_months(self, months)
    }

    fn add_nanos(&self, nanos: i128) -> Self {
        NanoTime::add_nanos(self, nanos)
    }
}

#[cfg(feature = "chrono")]
mod chrono_impl {
    use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};

    use super::{CalendarTime, NANOS_PER_SEC};

    fn epoch_nanos(t: &NaiveDateTime) -> i128 {
        let utc = t.and_utc();
        i128::from(utc.timestamp()) * NANOS_PER_SEC + i128::from(utc.timestamp_subsec_nanos())
    }

    /// Naive date-times are treated as UTC wall clock readings.
    impl CalendarTime for NaiveDateTime {
        fn calendar_year(&self) -> i64 {
            i64::from(self.year())
        }

        fn calendar_month(&self) -> u8 {
            self.month() as u8
        }

        fn nanos_since(&self, earlier: &Self) -> i128 {
            epoch_nanos(self) - epoch_nanos(earlier)
        }

        fn add_months(&self, months: i64) -> Option<Self> {
            let index = i64::from(self.year())
                .checked_mul(12)?
                .checked_add(i64::from(self.month0()))?
                .checked_add(months)?;
            let year = i32::try_from(index.div_euclid(12)).ok()?;
            let month = (index.rem_euclid(12) + 1) as u32;
            // Starting from the first and adding days gives the roll-over rule.
            NaiveDate::from_ymd_opt(year, month, 1)?
                .checked_add_days(Days::new(u64::from(self.day0())))
                .map(|date| date.and_time(self.time()))
        }

        fn add_nanos(&self, nanos: i128) -> Self {
            let target = epoch_nanos(self).saturating_add(nanos);
            let subsec = target.rem_euclid(NANOS_PER_SEC) as u32;
            i64::try_from(target.div_euclid(NANOS_PER_SEC))
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, subsec))
                .map(|dt| dt.naive_utc())
                .unwrap_or(if nanos < 0 {
                    NaiveDateTime::MIN
                } else {
                    NaiveDateTime::MAX
                })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        }

        #[test]
        fn test_add_months_rolls_over() {
            assert_eq!(
                CalendarTime::add_months(&at(2023, 1, 31), 1),
                Some(at(2023, 3, 3))
            );
            assert_eq!(
                CalendarTime::add_months(&at(2024, 2, 29), 12),
                Some(at(2025, 3, 1))
            );
        }

        #[test]
        fn test_nanos_since_one_day() {
            assert_eq!(
                at(2024, 1, 2).nanos_since(&at(2024, 1, 1)),
                86_400 * NANOS_PER_SEC
            );
        }

        #[test]
        fn test_add_nanos_matches_nanos_since() {
            let start = at(2024, 1, 1);
            let end = CalendarTime::add_nanos(&start, 90 * NANOS_PER_SEC + 5);
            assert_eq!(end.nanos_since(&start), 90 * NANOS_PER_SEC + 5);
        }
    }
}
