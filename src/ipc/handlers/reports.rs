use crate::calendar;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::stats::{monthly_stats, overall_stats, parse_month_key, Trend};
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

fn get_month_key(params: &serde_json::Value) -> Result<(i32, u32), HandlerErr> {
    let month = params
        .get("month")
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: "missing month".to_string(),
        })?;
    parse_month_key(month).ok_or_else(|| HandlerErr {
        code: "bad_params",
        message: "month must be YYYY-MM".to_string(),
    })
}

/// Monthly report: per-student counts, rates and trend band, plus the
/// roster-wide block computed from summed counts.
fn reports_monthly(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (year, month) = get_month_key(params)?;

    let per_student: Vec<serde_json::Value> = state
        .roster
        .students()
        .iter()
        .map(|student| {
            let stats = monthly_stats(student, year, month);
            json!({
                "studentId": student.id,
                "name": student.name,
                "totalDays": stats.total_days,
                "presences": stats.presences,
                "absences": stats.absences,
                "presenceRate": stats.presence_rate,
                "absenceRate": stats.absence_rate,
                "trend": Trend::classify(stats.absence_rate).as_str(),
                "observations": student.observations.len()
            })
        })
        .collect();

    let overall = overall_stats(state.roster.students(), year, month);
    Ok(json!({
        "year": year,
        "month": month,
        "monthName": calendar::month_name(month),
        "students": per_student,
        "overall": {
            "totalStudents": overall.total_students,
            "totalPresences": overall.total_presences,
            "totalAbsences": overall.total_absences,
            "totalDays": overall.total_days,
            "avgPresenceRate": overall.avg_presence_rate,
            "avgAbsenceRate": overall.avg_absence_rate,
            "trend": Trend::classify(overall.avg_absence_rate).as_str()
        }
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "reports.monthly" => reports_monthly(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    })
}
