use chrono::{Datelike, Local, NaiveDate};

pub const MONTH_NAMES: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

pub const DAY_NAMES: [&str; 7] = ["Dim", "Lun", "Mar", "Mer", "Jeu", "Ven", "Sam"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthLayout {
    pub days_in_month: u32,
    /// Weekday of day 1, 0=Sunday..6=Saturday.
    pub first_weekday: u32,
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => 30,
    }
}

/// 0=Sunday..6=Saturday, the convention the grid header renders in.
pub fn weekday(year: i32, month: u32, day: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

pub fn is_weekend(year: i32, month: u32, day: u32) -> bool {
    let wd = weekday(year, month, day);
    wd == 0 || wd == 6
}

pub fn month_layout(year: i32, month: u32) -> MonthLayout {
    MonthLayout {
        days_in_month: days_in_month(year, month),
        first_weekday: weekday(year, month, 1),
    }
}

/// Canonical cell key. Attendance records are matched on this exact string.
pub fn date_key(year: i32, month: u32, day: u32) -> String {
    format!("{:04}-{:02}-{:02}", year, month, day)
}

pub fn today_key() -> String {
    let now = Local::now().date_naive();
    date_key(now.year(), now.month(), now.day())
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month.clamp(1, 12) - 1) as usize]
}

pub fn day_name(weekday: u32) -> &'static str {
    DAY_NAMES[(weekday % 7) as usize]
}
