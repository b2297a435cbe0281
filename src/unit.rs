use std::fmt;

use tracing::debug;

use crate::time::NANOS_PER_SEC;

/// A unit a difference can be expressed in.
///
/// Variants are declared from coarsest to finest, which is also the order the
/// diff engine evaluates them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Unit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    Nanoseconds,
}

impl Unit {
    /// Every unit, in evaluation order.
    pub const ALL: [Unit; 9] = [
        Unit::Years,
        Unit::Months,
        Unit::Weeks,
        Unit::Days,
        Unit::Hours,
        Unit::Minutes,
        Unit::Seconds,
        Unit::Milliseconds,
        Unit::Nanoseconds,
    ];

    /// The lowercase plural name, e.g. `"weeks"`.
    pub fn name(self) -> &'static str {
        match self {
            Unit::Years => "years",
            Unit::Months => "months",
            Unit::Weeks => "weeks",
            Unit::Days => "days",
            Unit::Hours => "hours",
            Unit::Minutes => "minutes",
            Unit::Seconds => "seconds",
            Unit::Milliseconds => "milliseconds",
            Unit::Nanoseconds => "nanoseconds",
        }
    }

    /// Looks up a unit by its exact plural name.
    pub fn from_name(name: &str) -> Option<Unit> {
        Unit::ALL.into_iter().find(|unit| unit.name() == name)
    }

    pub(crate) fn class(self) -> UnitClass {
        match self {
            Unit::Years => UnitClass::Calendar(CalendarUnit::Years),
            Unit::Months => UnitClass::Calendar(CalendarUnit::Months),
            Unit::Weeks => UnitClass::Fixed(FixedUnit::Weeks),
            Unit::Days => UnitClass::Fixed(FixedUnit::Days),
            Unit::Hours => UnitClass::Fixed(FixedUnit::Hours),
            Unit::Minutes => UnitClass::Fixed(FixedUnit::Minutes),
            Unit::Seconds => UnitClass::Fixed(FixedUnit::Seconds),
            Unit::Milliseconds => UnitClass::Fixed(FixedUnit::Milliseconds),
            Unit::Nanoseconds => UnitClass::Nanoseconds,
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) enum UnitClass {
    Calendar(CalendarUnit),
    Fixed(FixedUnit),
    Nanoseconds,
}

/// Units whose length depends on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarUnit {
    Years,
    Months,
}

impl CalendarUnit {
    pub(crate) fn months(self) -> i64 {
        match self {
            CalendarUnit::Years => 12,
            CalendarUnit::Months => 1,
        }
    }
}

impl From<CalendarUnit> for Unit {
    fn from(unit: CalendarUnit) -> Self {
        match unit {
            CalendarUnit::Years => Unit::Years,
            CalendarUnit::Months => Unit::Months,
        }
    }
}

/// Units with a fixed length in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedUnit {
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl FixedUnit {
    /// Length of one unit in nanoseconds.
    pub fn nanos(self) -> i128 {
        match self {
            FixedUnit::Weeks => 7 * 86_400 * NANOS_PER_SEC,
            FixedUnit::Days => 86_400 * NANOS_PER_SEC,
            FixedUnit::Hours => 3_600 * NANOS_PER_SEC,
            FixedUnit::Minutes => 60 * NANOS_PER_SEC,
            FixedUnit::Seconds => NANOS_PER_SEC,
            FixedUnit::Milliseconds => 1_000_000,
        }
    }
}

impl From<FixedUnit> for Unit {
    fn from(unit: FixedUnit) -> Self {
        match unit {
            FixedUnit::Weeks => Unit::Weeks,
            FixedUnit::Days => Unit::Days,
            FixedUnit::Hours => Unit::Hours,
            FixedUnit::Minutes => Unit::Minutes,
            FixedUnit::Seconds => Unit::Seconds,
            FixedUnit::Milliseconds => Unit::Milliseconds,
        }
    }
}

/// A set of units. Insertion order and duplicates don't matter; iteration is
/// always coarsest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Units(u16);

impl Units {
    pub const fn empty() -> Self {
        Units(0)
    }

    pub fn all() -> Self {
        Unit::ALL.into_iter().collect()
    }

    /// Builds a set from unit names. Names outside the vocabulary are skipped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut units = Units::empty();
        for name in names {
            let name = name.as_ref();
            match Unit::from_name(name) {
                Some(unit) => units.insert(unit),
                None => debug!(name, "ignoring unknown unit name"),
            }
        }
        units
    }

    pub fn with(mut self, unit: Unit) -> Self {
        self.insert(unit);
        self
    }

    pub fn insert(&mut self, unit: Unit) {
        self.0 |= unit.bit();
    }

    pub fn contains(&self, unit: Unit) -> bool {
        self.0 & unit.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Unit> + '_ {
        Unit::ALL.into_iter().filter(|unit| self.contains(*unit))
    }
}

impl FromIterator<Unit> for Units {
    fn from_iter<I: IntoIterator<Item = Unit>>(iter: I) -> Self {
        let mut units = Units::empty();
        units.extend(iter);
        units
    }
}

impl Extend<Unit> for Units {
    fn extend<I: IntoIterator<Item = Unit>>(&mut self, iter: I) {
        for unit in iter {
            self.insert(unit);
        }
    }
}

impl<const N: usize> From<[Unit; N]> for Units {
    fn from(units: [Unit; N]) -> Self {
        units.into_iter().collect()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Units {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(Unit::name))
    }
}

/// Reads a list of names; unknown names are dropped like in `from_names`.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Units {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = <Vec<String> as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Units::from_names(names))
    }
}
