use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

use crate::database::models::ShiftDetail;

/// One working day of the Monday..Friday projection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub shifts: Vec<ShiftDetail>,
    pub total_hours: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub days: BTreeMap<NaiveDate, DayBucket>,
}

/// ISO Monday of the week containing `date`.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Groups shifts into exactly five buckets, Monday through Friday of
/// the week starting at `monday`. A shift lands in the bucket matching
/// the calendar date of its start instant and is never split across
/// days. Weekend starts are dropped.
pub fn build_week(monday: NaiveDate, shifts: Vec<ShiftDetail>) -> WeekView {
    debug_assert_eq!(monday.weekday(), Weekday::Mon);

    let mut days: BTreeMap<NaiveDate, Vec<ShiftDetail>> = (0..5)
        .map(|offset| (monday + Days::new(offset), Vec::new()))
        .collect();

    for detail in shifts {
        let day = detail.shift.start_time.date();
        if let Some(bucket) = days.get_mut(&day) {
            bucket.push(detail);
        }
    }

    let days = days
        .into_iter()
        .map(|(day, shifts)| {
            let total_hours: f64 = shifts.iter().map(|d| d.shift.duration_hours()).sum();
            let total_cost: f64 = shifts
                .iter()
                .map(|d| {
                    d.shift.duration_hours()
                        * d.shift.hourly_rate
                        * d.shift.required_employees as f64
                })
                .sum();
            (
                day,
                DayBucket {
                    shifts,
                    total_hours: round_to(total_hours, 1),
                    total_cost: round_to(total_cost, 2),
                },
            )
        })
        .collect();

    WeekView {
        week_start: monday,
        week_end: monday + Days::new(4),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Shift, ShiftStatus};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn detail(start: &str, end: &str, rate: f64, required: i64) -> ShiftDetail {
        let shift = Shift {
            id: Uuid::new_v4(),
            title: "Shift".to_string(),
            description: String::new(),
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            department: "General".to_string(),
            required_employees: required,
            hourly_rate: rate,
            location: "Main Office".to_string(),
            status: ShiftStatus::Published,
            created_by: None,
            created_at: "2024-01-01T00:00:00".parse().unwrap(),
        };
        ShiftDetail::new(shift, vec![])
    }

    #[test]
    fn monday_of_week_is_computed_from_any_day() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(week_monday(monday), monday);
        // Wednesday and Sunday of the same ISO week
        assert_eq!(
            week_monday(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()),
            monday
        );
        assert_eq!(
            week_monday(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()),
            monday
        );
    }

    #[test]
    fn returns_exactly_five_buckets_monday_through_friday() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let view = build_week(monday, vec![]);

        let days: Vec<NaiveDate> = view.days.keys().copied().collect();
        assert_eq!(
            days,
            (0..5).map(|o| monday + Days::new(o)).collect::<Vec<_>>()
        );
        assert_eq!(view.week_start, monday);
        assert_eq!(view.week_end, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn shift_lands_only_in_its_start_day_bucket() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let view = build_week(
            monday,
            vec![detail("2024-01-02T09:00:00", "2024-01-02T13:00:00", 20.0, 1)],
        );

        for (day, bucket) in &view.days {
            let expected = if *day == tuesday { 1 } else { 0 };
            assert_eq!(bucket.shifts.len(), expected, "day {}", day);
        }
    }

    #[test]
    fn overnight_shift_is_not_split_across_days() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let view = build_week(
            monday,
            vec![detail("2024-01-01T22:00:00", "2024-01-02T06:00:00", 20.0, 1)],
        );

        assert_eq!(view.days[&monday].shifts.len(), 1);
        assert_eq!(view.days[&monday].total_hours, 8.0);
        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(view.days[&tuesday].shifts.is_empty());
    }

    #[test]
    fn totals_multiply_hours_rate_and_headcount() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let view = build_week(
            monday,
            vec![detail("2024-01-01T09:00:00", "2024-01-01T13:00:00", 20.0, 2)],
        );

        let bucket = &view.days[&monday];
        assert_eq!(bucket.total_hours, 4.0);
        assert_eq!(bucket.total_cost, 160.0);
    }

    #[test]
    fn totals_are_rounded() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // 7h50m at 19.99/h for one person
        let view = build_week(
            monday,
            vec![detail("2024-01-01T09:10:00", "2024-01-01T17:00:00", 19.99, 1)],
        );

        let bucket = &view.days[&monday];
        assert_eq!(bucket.total_hours, 7.8);
        assert_eq!(bucket.total_cost, 156.59);
    }

    #[test]
    fn weekend_shift_is_dropped_from_the_view() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let view = build_week(
            monday,
            vec![detail("2024-01-06T09:00:00", "2024-01-06T13:00:00", 20.0, 1)],
        );

        assert!(view.days.values().all(|b| b.shifts.is_empty()));
    }
}
