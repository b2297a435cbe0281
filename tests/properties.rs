use datediff::{
    diff, diff_calendar_unit, diff_fixed_unit, diff_nanoseconds, CalendarTime, CalendarUnit,
    DiffError, FixedUnit, NanoTime, Unit, Units,
};
use proptest::prelude::*;

fn arb_nanotime() -> impl Strategy<Value = NanoTime> {
    (
        1970u16..2100,
        1u8..=12,
        1u8..=31,
        0u8..=23,
        0u8..=59,
        0u8..=59,
        0u32..=999_999_999,
    )
        .prop_map(|(year, month, day, hour, minute, second, nanosecond)| {
            // Clamp the day so short months still produce month-end dates.
            (1..=day)
                .rev()
                .find_map(|d| NanoTime::new(year, month, d, hour, minute, second, nanosecond))
                .unwrap()
        })
}

fn arb_ordered_pair() -> impl Strategy<Value = (NanoTime, NanoTime)> {
    (arb_nanotime(), arb_nanotime()).prop_map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
}

fn arb_units() -> impl Strategy<Value = Units> {
    prop::collection::vec(prop::sample::select(Unit::ALL.to_vec()), 0..9)
        .prop_map(|units| units.into_iter().collect())
}

fn single(start: &NanoTime, end: &NanoTime, unit: Unit) -> i128 {
    let result = match unit {
        Unit::Years => diff_calendar_unit(start, end, CalendarUnit::Years),
        Unit::Months => diff_calendar_unit(start, end, CalendarUnit::Months),
        Unit::Weeks => diff_fixed_unit(start, end, FixedUnit::Weeks),
        Unit::Days => diff_fixed_unit(start, end, FixedUnit::Days),
        Unit::Hours => diff_fixed_unit(start, end, FixedUnit::Hours),
        Unit::Minutes => diff_fixed_unit(start, end, FixedUnit::Minutes),
        Unit::Seconds => diff_fixed_unit(start, end, FixedUnit::Seconds),
        Unit::Milliseconds => diff_fixed_unit(start, end, FixedUnit::Milliseconds),
        Unit::Nanoseconds => diff_nanoseconds(start, end),
    };
    result.unwrap().get(unit)
}

/// Shifts `t` forward by `count` of `unit` with the same rules the engine uses.
fn advance(t: &NanoTime, unit: Unit, count: i128) -> Option<NanoTime> {
    let count = i64::try_from(count).ok()?;
    match unit {
        Unit::Years => t.add_years(count),
        Unit::Months => t.add_months(count),
        Unit::Weeks => Some(t.add_nanos(i128::from(count) * FixedUnit::Weeks.nanos())),
        Unit::Days => Some(t.add_nanos(i128::from(count) * FixedUnit::Days.nanos())),
        Unit::Hours => Some(t.add_nanos(i128::from(count) * FixedUnit::Hours.nanos())),
        Unit::Minutes => Some(t.add_nanos(i128::from(count) * FixedUnit::Minutes.nanos())),
        Unit::Seconds => Some(t.add_nanos(i128::from(count) * FixedUnit::Seconds.nanos())),
        Unit::Milliseconds => {
            Some(t.add_nanos(i128::from(count) * FixedUnit::Milliseconds.nanos()))
        }
        Unit::Nanoseconds => Some(t.add_nanos(i128::from(count))),
    }
}

proptest! {
    #[test]
    fn inverted_ranges_fail(a in arb_nanotime(), b in arb_nanotime(), units in arb_units(), running: bool) {
        prop_assume!(a != b);
        let (start, end) = if a > b { (a, b) } else { (b, a) };
        let err = DiffError::InvertedRange { gap_nanos: start.nanos_since(&end) };
        prop_assert_eq!(diff(&start, &end, &units, running), Err(err));
        for unit in [CalendarUnit::Years, CalendarUnit::Months] {
            prop_assert_eq!(diff_calendar_unit(&start, &end, unit), Err(err));
        }
        for unit in [FixedUnit::Weeks, FixedUnit::Days, FixedUnit::Hours,
                     FixedUnit::Minutes, FixedUnit::Seconds, FixedUnit::Milliseconds] {
            prop_assert_eq!(diff_fixed_unit(&start, &end, unit), Err(err));
        }
        prop_assert_eq!(diff_nanoseconds(&start, &end), Err(err));
    }

    #[test]
    fn equal_instants_are_zero(t in arb_nanotime(), running: bool) {
        prop_assert!(diff(&t, &t, &Units::all(), running).unwrap().is_zero());
    }

    #[test]
    fn unrequested_fields_stay_zero((start, end) in arb_ordered_pair(), units in arb_units(), running: bool) {
        let d = diff(&start, &end, &units, running).unwrap();
        for unit in Unit::ALL {
            if !units.contains(unit) {
                prop_assert_eq!(d.get(unit), 0);
            } else {
                prop_assert!(d.get(unit) >= 0);
            }
        }
    }

    #[test]
    fn non_running_matches_single_unit((start, end) in arb_ordered_pair(), units in arb_units()) {
        let d = diff(&start, &end, &units, false).unwrap();
        for unit in units.iter() {
            prop_assert_eq!(d.get(unit), single(&start, &end, unit), "unit {}", unit);
        }
    }

    #[test]
    fn fixed_units_divide_elapsed((start, end) in arb_ordered_pair()) {
        let elapsed = end.nanos_since(&start);
        for unit in [FixedUnit::Weeks, FixedUnit::Days, FixedUnit::Hours,
                     FixedUnit::Minutes, FixedUnit::Seconds, FixedUnit::Milliseconds] {
            let d = diff_fixed_unit(&start, &end, unit).unwrap();
            let remainder = d.nanoseconds();
            prop_assert!((0..unit.nanos()).contains(&remainder));
            prop_assert_eq!(d.get(unit.into()) * unit.nanos() + remainder, elapsed);
        }
    }

    #[test]
    fn calendar_count_is_maximal((start, end) in arb_ordered_pair()) {
        for (calendar, unit) in [(CalendarUnit::Years, Unit::Years), (CalendarUnit::Months, Unit::Months)] {
            let d = diff_calendar_unit(&start, &end, calendar).unwrap();
            let count = d.get(unit);
            let reached = advance(&start, unit, count).unwrap();
            prop_assert!(reached <= end);
            prop_assert_eq!(end.nanos_since(&reached), d.nanoseconds());
            if let Some(next) = advance(&start, unit, count + 1) {
                prop_assert!(next > end);
            }
        }
    }

    /// Re-adding each count in order lands at or before `end`, and one more of
    /// any unit would overshoot.
    #[test]
    fn running_decomposition_is_sound((start, end) in arb_ordered_pair(), units in arb_units()) {
        let d = diff(&start, &end, &units, true).unwrap();
        let mut cursor = start;
        for unit in units.iter().filter(|u| *u != Unit::Nanoseconds) {
            let count = d.get(unit);
            if let Some(overshoot) = advance(&cursor, unit, count + 1) {
                prop_assert!(overshoot > end, "one more {} still fits", unit);
            }
            cursor = advance(&cursor, unit, count).unwrap();
            prop_assert!(cursor <= end);
        }
        if units.contains(Unit::Nanoseconds) {
            prop_assert_eq!(d.nanoseconds(), end.nanos_since(&cursor));
        }
    }

    #[test]
    fn epoch_nanos_round_trip(t in arb_nanotime()) {
        prop_assert_eq!(NanoTime::from_epoch_nanos(t.to_epoch_nanos()), Some(t));
    }

    #[test]
    fn add_nanos_inverts_nanos_since((start, end) in arb_ordered_pair()) {
        prop_assert_eq!(start.add_nanos(end.nanos_since(&start)), end);
    }

    #[test]
    fn add_months_keeps_time_of_day(t in arb_nanotime(), months in -1200i64..1200) {
        let shifted = t.add_months(months).unwrap();
        prop_assert_eq!(
            (shifted.hour(), shifted.minute(), shifted.second(), shifted.nanosecond()),
            (t.hour(), t.minute(), t.second(), t.nanosecond())
        );
    }
}
