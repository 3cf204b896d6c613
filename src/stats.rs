//! Pure aggregation over entry snapshots.
//!
//! All functions take the reference instant as an argument; day bucketing
//! runs in the timezone of that instant (production passes `Local::now()`,
//! tests pass fixed offsets).

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::models::FoodEntry;

/// Daily calorie/protein goals.
#[derive(Debug, Clone, Copy)]
pub struct Goals {
    pub calories: i64,
    pub protein: i64,
}

/// Summed macros for one day window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyTotals {
    pub calories: i64,
    pub protein: i64,
}

/// Classification of one day against the 90% goal thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// No entries logged that day.
    Empty,
    /// Entries logged, neither threshold reached.
    MetNone,
    /// Exactly one of the two thresholds reached.
    MetOne,
    /// Both thresholds reached.
    MetBoth,
}

/// One day of the weekly summary.
#[derive(Debug, Clone, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub totals: DailyTotals,
    pub status: DayStatus,
}

/// Truncates to local midnight in the timezone of `at`.
pub fn start_of_day<Tz: TimeZone>(at: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = at.timezone();
    let midnight = at.date_naive().and_time(NaiveTime::MIN);
    // Midnight can be ambiguous or skipped across a DST transition; take
    // the earliest valid instant of the day.
    tz.from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| at.clone())
}

/// Sums calories and protein over entries falling within the local day
/// of `now`: `[start_of_day(now), start_of_day(now) + 24h)`.
pub fn daily_totals<Tz: TimeZone>(entries: &[FoodEntry], now: &DateTime<Tz>) -> DailyTotals {
    let start = start_of_day(now).with_timezone(&Utc);
    let end = start + Duration::hours(24);
    sum_window(entries, start, end).1
}

/// The last seven local days of `now`, oldest first, each classified
/// against 90% of the goals.
pub fn weekly_buckets<Tz: TimeZone>(
    entries: &[FoodEntry],
    now: &DateTime<Tz>,
    goals: &Goals,
) -> Vec<DayBucket> {
    (0..7)
        .rev()
        .map(|offset| {
            let day_ref = now.clone() - Duration::days(offset);
            let day_start = start_of_day(&day_ref);
            let date = day_start.date_naive();
            let start = day_start.with_timezone(&Utc);
            let end = start + Duration::hours(24);

            let (count, totals) = sum_window(entries, start, end);
            let status = if count == 0 {
                DayStatus::Empty
            } else {
                match (
                    meets_threshold(totals.calories, goals.calories),
                    meets_threshold(totals.protein, goals.protein),
                ) {
                    (true, true) => DayStatus::MetBoth,
                    (false, false) => DayStatus::MetNone,
                    _ => DayStatus::MetOne,
                }
            };

            DayBucket {
                date,
                totals,
                status,
            }
        })
        .collect()
}

fn sum_window(
    entries: &[FoodEntry],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> (usize, DailyTotals) {
    let mut count = 0;
    let mut totals = DailyTotals::default();
    for entry in entries {
        if entry.logged_at >= start && entry.logged_at < end {
            count += 1;
            totals.calories += entry.calories;
            totals.protein += entry.protein;
        }
    }
    (count, totals)
}

/// True when `total` reaches 90% of `goal`, boundary inclusive. Integer
/// arithmetic so an exact 0.9*goal total is never lost to float rounding.
/// A zero or negative goal is never met.
fn meets_threshold(total: i64, goal: i64) -> bool {
    goal > 0 && 10 * total >= 9 * goal
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    const GOALS: Goals = Goals {
        calories: 2000,
        protein: 150,
    };

    fn utc(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn entry(day: u32, hour: u32, calories: i64, protein: i64) -> FoodEntry {
        FoodEntry::new("test", calories, protein).with_logged_at(utc(day, hour))
    }

    #[test]
    fn test_daily_totals_counts_only_the_reference_day() {
        let entries = vec![
            entry(14, 20, 800, 40), // yesterday 20:00
            entry(15, 1, 300, 15),  // today 01:00
            entry(15, 23, 500, 30), // today 23:00
        ];
        let now = utc(15, 12);

        let totals = daily_totals(&entries, &now);
        assert_eq!(totals.calories, 800);
        assert_eq!(totals.protein, 45);
    }

    #[test]
    fn test_daily_totals_empty_snapshot() {
        let totals = daily_totals(&[], &utc(15, 12));
        assert_eq!(totals, DailyTotals::default());
    }

    #[test]
    fn test_daily_totals_respects_timezone_of_now() {
        // 23:00 UTC on the 14th is 01:00 on the 15th at UTC+2.
        let entries = vec![entry(14, 23, 400, 20)];
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();

        let totals = daily_totals(&entries, &now);
        assert_eq!(totals.calories, 400);
    }

    #[test]
    fn test_weekly_buckets_oldest_first() {
        let entries = vec![entry(12, 12, 2000, 150)]; // three days before "now"
        let buckets = weekly_buckets(&entries, &utc(15, 12), &GOALS);

        assert_eq!(buckets.len(), 7);
        assert_eq!(
            buckets[0].date,
            NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
        );
        assert_eq!(
            buckets[6].date,
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
        assert_eq!(buckets[3].status, DayStatus::MetBoth);
        assert!(buckets
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 3)
            .all(|(_, b)| b.status == DayStatus::Empty));
    }

    #[test]
    fn test_exact_ninety_percent_boundary_is_met() {
        // 1800 kcal is exactly 0.9 * 2000; protein 0 leaves one goal unmet.
        let entries = vec![entry(15, 9, 1800, 0)];
        let buckets = weekly_buckets(&entries, &utc(15, 12), &GOALS);
        assert_eq!(buckets[6].status, DayStatus::MetOne);
    }

    #[test]
    fn test_met_both_and_met_none() {
        let met_both = vec![entry(15, 9, 1900, 140)];
        let buckets = weekly_buckets(&met_both, &utc(15, 12), &GOALS);
        assert_eq!(buckets[6].status, DayStatus::MetBoth);

        let met_none = vec![entry(15, 9, 500, 10)];
        let buckets = weekly_buckets(&met_none, &utc(15, 12), &GOALS);
        assert_eq!(buckets[6].status, DayStatus::MetNone);
    }

    #[test]
    fn test_zero_goal_is_never_met() {
        let goals = Goals {
            calories: 0,
            protein: 150,
        };
        // Plenty of calories, enough protein: only the protein goal counts.
        let entries = vec![entry(15, 9, 5000, 150)];
        let buckets = weekly_buckets(&entries, &utc(15, 12), &goals);
        assert_eq!(buckets[6].status, DayStatus::MetOne);
    }

    #[test]
    fn test_start_of_day_truncates() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let at = tz.with_ymd_and_hms(2025, 6, 15, 18, 42, 7).unwrap();
        let start = start_of_day(&at);
        assert_eq!(
            start,
            tz.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap()
        );
    }
}
