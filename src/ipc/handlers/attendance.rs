use crate::calendar;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::stats::{monthly_stats, parse_month_key};
use crate::store::StoreError;
use chrono::NaiveDate;
use serde_json::json;

struct HandlerErr {
    code: &'static str,
    message: String,
}

impl HandlerErr {
    fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, None)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        HandlerErr {
            code: e.code(),
            message: e.message(),
        }
    }
}

fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: format!("missing {}", key),
        })
}

fn get_month_key(params: &serde_json::Value) -> Result<(i32, u32), HandlerErr> {
    let month = get_required_str(params, "month")?;
    parse_month_key(&month).ok_or_else(|| HandlerErr {
        code: "bad_params",
        message: "month must be YYYY-MM".to_string(),
    })
}

fn attendance_mark(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = params
        .get("studentId")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: "missing studentId".to_string(),
        })?;
    let date = get_required_str(params, "date")?;
    let present = params
        .get("present")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: "missing present".to_string(),
        })?;
    if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
        return Err(HandlerErr {
            code: "bad_params",
            message: "date must be YYYY-MM-DD".to_string(),
        });
    }
    state.roster.mark_attendance(student_id, &date, present)?;
    Ok(json!({ "ok": true }))
}

/// Month grid projection: the day header (weekday label, weekend and today
/// flags) plus one row per student with a present/absent/unmarked cell per
/// day. Cells are matched on the exact "YYYY-MM-DD" key, the same rule the
/// marking upsert uses.
fn attendance_month_open(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (year, month) = get_month_key(params)?;
    let layout = calendar::month_layout(year, month);
    let today = calendar::today_key();

    let days_json: Vec<serde_json::Value> = (1..=layout.days_in_month)
        .map(|day| {
            let date = calendar::date_key(year, month, day);
            json!({
                "day": day,
                "date": date,
                "weekday": calendar::day_name(calendar::weekday(year, month, day)),
                "weekend": calendar::is_weekend(year, month, day),
                "today": date == today
            })
        })
        .collect();

    let rows_json: Vec<serde_json::Value> = state
        .roster
        .students()
        .iter()
        .map(|student| {
            let cells: Vec<serde_json::Value> = (1..=layout.days_in_month)
                .map(|day| {
                    let date = calendar::date_key(year, month, day);
                    match student.attendance.iter().find(|r| r.date == date) {
                        Some(record) => json!(record.present),
                        None => serde_json::Value::Null,
                    }
                })
                .collect();
            let stats = monthly_stats(student, year, month);
            json!({
                "studentId": student.id,
                "name": student.name,
                "absenceRate": stats.absence_rate,
                "cells": cells
            })
        })
        .collect();

    Ok(json!({
        "year": year,
        "month": month,
        "monthName": calendar::month_name(month),
        "daysInMonth": layout.days_in_month,
        "firstWeekday": layout.first_weekday,
        "days": days_json,
        "rows": rows_json
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.mark" => attendance_mark(state, &req.params),
        "attendance.monthOpen" => attendance_month_open(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    })
}
