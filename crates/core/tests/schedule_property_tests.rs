//! Property-based tests for recurring schedule evaluation.
//!
//! These verify calendar properties that must hold across all valid
//! schedules and dates, using the `proptest` crate for random test case
//! generation.

use chrono::{Datelike, Duration, NaiveDate};
use proptest::prelude::*;
use tobby_core::recurring::Schedule;

// =============================================================================
// Generators
// =============================================================================

/// Generates an arbitrary calendar date between 2000 and 2100.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=366).prop_map(|(year, ordinal)| {
        NaiveDate::from_yo_opt(year, ordinal)
            .unwrap_or_else(|| NaiveDate::from_yo_opt(year, 1).unwrap())
    })
}

fn arb_day_of_month() -> impl Strategy<Value = u32> {
    1u32..=31
}

fn arb_weekday() -> impl Strategy<Value = u32> {
    0u32..=6
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A monthly schedule fires exactly on dates whose day-of-month matches,
    /// with no fallback in months shorter than the configured day.
    #[test]
    fn prop_monthly_fires_iff_day_matches(day in arb_day_of_month(), date in arb_date()) {
        let schedule = Schedule::Monthly { day };
        prop_assert_eq!(schedule.fires_on(date), date.day() == day);
    }

    /// A weekly schedule fires exactly once in any window of 7 consecutive days.
    #[test]
    fn prop_weekly_fires_once_per_seven_days(weekday in arb_weekday(), start in arb_date()) {
        let schedule = Schedule::Weekly { weekday };
        let fired = (0..7)
            .filter(|offset| schedule.fires_on(start + Duration::days(*offset)))
            .count();
        prop_assert_eq!(fired, 1);
    }

    /// A biweekly schedule fires exactly on dates whose day-of-month is one
    /// of its two configured days.
    #[test]
    fn prop_biweekly_fires_iff_day_in_pair(
        d1 in arb_day_of_month(),
        d2 in arb_day_of_month(),
        date in arb_date(),
    ) {
        let schedule = Schedule::Biweekly { days: [d1, d2] };
        prop_assert_eq!(schedule.fires_on(date), date.day() == d1 || date.day() == d2);
    }

    /// A yearly schedule fires at most once per calendar year, and exactly
    /// once when the configured date exists in that year.
    #[test]
    fn prop_yearly_fires_at_most_once_per_year(
        month in 1u32..=12,
        day in arb_day_of_month(),
        year in 2000i32..2100,
    ) {
        let schedule = Schedule::Yearly { month, day };
        let fired = NaiveDate::from_ymd_opt(year, 1, 1)
            .unwrap()
            .iter_days()
            .take_while(|d| d.year() == year)
            .filter(|d| schedule.fires_on(*d))
            .count();
        let date_exists = NaiveDate::from_ymd_opt(year, month, day).is_some();
        prop_assert_eq!(fired, usize::from(date_exists));
    }

    /// An unsupported schedule never fires, on any date.
    #[test]
    fn prop_unsupported_never_fires(kind in "[a-z]{1,12}", date in arb_date()) {
        let schedule = Schedule::Unsupported { kind };
        prop_assert!(!schedule.fires_on(date));
    }
}
