use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::store::Student;

/// Per-student counts and rates for one calendar month. Only marked days
/// count: `total_days` is the number of records in that month, not the
/// number of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub total_days: u32,
    pub presences: u32,
    pub absences: u32,
    pub presence_rate: u32,
    pub absence_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_students: usize,
    pub total_presences: u32,
    pub total_absences: u32,
    pub total_days: u32,
    pub avg_presence_rate: u32,
    pub avg_absence_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trend {
    Declining,
    Flat,
    Improving,
}

impl Trend {
    /// Display bands for an absence rate, inclusive on the lower bound.
    pub fn classify(absence_rate: u32) -> Trend {
        if absence_rate >= 20 {
            Trend::Declining
        } else if absence_rate >= 10 {
            Trend::Flat
        } else {
            Trend::Improving
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Declining => "declining",
            Trend::Flat => "flat",
            Trend::Improving => "improving",
        }
    }
}

fn rate(count: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}

fn in_month(date: &str, year: i32, month: u32) -> bool {
    // Records with dates that do not parse never match any month.
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.year() == year && d.month() == month,
        Err(_) => false,
    }
}

pub fn monthly_stats(student: &Student, year: i32, month: u32) -> MonthlyStats {
    let mut total_days = 0u32;
    let mut presences = 0u32;
    for record in &student.attendance {
        if !in_month(&record.date, year, month) {
            continue;
        }
        total_days += 1;
        if record.present {
            presences += 1;
        }
    }
    let absences = total_days - presences;
    MonthlyStats {
        total_days,
        presences,
        absences,
        presence_rate: rate(presences, total_days),
        absence_rate: rate(absences, total_days),
    }
}

/// Sums counts across the roster first and derives the rates from the
/// sums. Averaging per-student rates instead would skew the result toward
/// students with few marked days.
pub fn overall_stats(students: &[Student], year: i32, month: u32) -> OverallStats {
    let mut total_presences = 0u32;
    let mut total_absences = 0u32;
    let mut total_days = 0u32;
    for student in students {
        let stats = monthly_stats(student, year, month);
        total_presences += stats.presences;
        total_absences += stats.absences;
        total_days += stats.total_days;
    }
    OverallStats {
        total_students: students.len(),
        total_presences,
        total_absences,
        total_days,
        avg_presence_rate: rate(total_presences, total_days),
        avg_absence_rate: rate(total_absences, total_days),
    }
}

/// Parses a "YYYY-MM" month key from the wire into (year, month).
pub fn parse_month_key(month: &str) -> Option<(i32, u32)> {
    let (y, m) = month.trim().split_once('-')?;
    let year = y.parse::<i32>().ok()?;
    let month_num = m.parse::<u32>().ok()?;
    if !(1..=12).contains(&month_num) {
        return None;
    }
    Some((year, month_num))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Roster;

    fn student_with(marks: &[(&str, bool)]) -> Roster {
        let mut roster = Roster::default();
        let id = roster.add_student("Ahmed Benali").expect("add").id;
        for (date, present) in marks {
            roster.mark_attendance(id, date, *present).expect("mark");
        }
        roster
    }

    #[test]
    fn single_presence_in_june() {
        let roster = student_with(&[("2025-06-01", true)]);
        let stats = monthly_stats(&roster.students()[0], 2025, 6);
        assert_eq!(
            stats,
            MonthlyStats {
                total_days: 1,
                presences: 1,
                absences: 0,
                presence_rate: 100,
                absence_rate: 0,
            }
        );
    }

    #[test]
    fn empty_month_is_all_zero() {
        let roster = student_with(&[("2025-06-01", true)]);
        let stats = monthly_stats(&roster.students()[0], 2025, 5);
        assert_eq!(
            stats,
            MonthlyStats {
                total_days: 0,
                presences: 0,
                absences: 0,
                presence_rate: 0,
                absence_rate: 0,
            }
        );
    }

    #[test]
    fn rates_sum_to_one_hundred() {
        let roster = student_with(&[
            ("2025-06-02", true),
            ("2025-06-03", true),
            ("2025-06-04", false),
        ]);
        let stats = monthly_stats(&roster.students()[0], 2025, 6);
        assert_eq!(stats.presence_rate, 67);
        assert_eq!(stats.absence_rate, 33);
        assert_eq!(stats.presence_rate + stats.absence_rate, 100);
    }

    #[test]
    fn other_months_and_bad_dates_are_ignored() {
        let roster = student_with(&[
            ("2025-06-02", true),
            ("2025-07-02", false),
            ("2024-06-02", false),
            ("not-a-date", false),
        ]);
        let stats = monthly_stats(&roster.students()[0], 2025, 6);
        assert_eq!(stats.total_days, 1);
        assert_eq!(stats.absences, 0);
    }

    #[test]
    fn overall_uses_rate_of_sums() {
        let mut roster = Roster::default();
        let a = roster.add_student("Ahmed").unwrap().id;
        let b = roster.add_student("Fatima").unwrap().id;
        // Ahmed: 1/1 present. Fatima: 1/9 present. Average of rates would
        // say 56%; the summed counts say 20%.
        roster.mark_attendance(a, "2025-06-01", true).unwrap();
        for day in 1..=9 {
            let date = format!("2025-06-{:02}", day);
            roster.mark_attendance(b, &date, day == 1).unwrap();
        }
        let overall = overall_stats(roster.students(), 2025, 6);
        assert_eq!(overall.total_students, 2);
        assert_eq!(overall.total_days, 10);
        assert_eq!(overall.total_presences, 2);
        assert_eq!(overall.total_absences, 8);
        assert_eq!(overall.avg_presence_rate, 20);
        assert_eq!(overall.avg_absence_rate, 80);
    }

    #[test]
    fn overall_on_empty_roster_is_zero() {
        let overall = overall_stats(&[], 2025, 6);
        assert_eq!(overall.total_students, 0);
        assert_eq!(overall.avg_presence_rate, 0);
        assert_eq!(overall.avg_absence_rate, 0);
    }

    #[test]
    fn trend_bands_are_inclusive_on_lower_bound() {
        assert_eq!(Trend::classify(25), Trend::Declining);
        assert_eq!(Trend::classify(20), Trend::Declining);
        assert_eq!(Trend::classify(19), Trend::Flat);
        assert_eq!(Trend::classify(10), Trend::Flat);
        assert_eq!(Trend::classify(9), Trend::Improving);
        assert_eq!(Trend::classify(0), Trend::Improving);
    }

    #[test]
    fn month_key_parses_year_month_only() {
        assert_eq!(parse_month_key("2025-06"), Some((2025, 6)));
        assert_eq!(parse_month_key(" 2025-12 "), Some((2025, 12)));
        assert_eq!(parse_month_key("2025-13"), None);
        assert_eq!(parse_month_key("2025"), None);
        assert_eq!(parse_month_key("juin"), None);
    }
}
