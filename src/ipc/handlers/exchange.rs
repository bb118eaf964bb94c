use crate::calendar;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::stats::parse_month_key;
use crate::store::StoreError;
use crate::xlsx;
use serde_json::json;
use std::path::PathBuf;

struct HandlerErr {
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl HandlerErr {
    fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        HandlerErr {
            code: e.code(),
            message: e.message(),
            details: None,
        }
    }
}

fn get_path(params: &serde_json::Value, key: &str) -> Result<PathBuf, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: format!("missing {}", key),
            details: None,
        })
}

fn require_students(state: &AppState) -> Result<(), HandlerErr> {
    if state.roster.is_empty() {
        return Err(HandlerErr {
            code: "empty_roster",
            message: "no students to export".to_string(),
            details: None,
        });
    }
    Ok(())
}

fn summary_json(summary: &xlsx::ExportSummary) -> serde_json::Value {
    json!({
        "path": summary.path.to_string_lossy(),
        "fileName": summary.file_name,
        "rows": summary.rows
    })
}

fn export_roster(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let out_dir = get_path(params, "outDir")?;
    require_students(state)?;
    let date = calendar::today_key();
    let summary = xlsx::export_roster(state.roster.students(), &out_dir, &date).map_err(|e| {
        HandlerErr {
            code: "export_failed",
            message: format!("{e:#}"),
            details: None,
        }
    })?;
    Ok(summary_json(&summary))
}

fn export_report(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let out_dir = get_path(params, "outDir")?;
    let month = params
        .get("month")
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: "missing month".to_string(),
            details: None,
        })?;
    let (year, month) = parse_month_key(month).ok_or_else(|| HandlerErr {
        code: "bad_params",
        message: "month must be YYYY-MM".to_string(),
        details: None,
    })?;
    require_students(state)?;
    let summary =
        xlsx::export_report(state.roster.students(), year, month, &out_dir).map_err(|e| {
            HandlerErr {
                code: "export_failed",
                message: format!("{e:#}"),
                details: None,
            }
        })?;
    Ok(summary_json(&summary))
}

fn export_template(params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let out_dir = get_path(params, "outDir")?;
    let summary = xlsx::write_template(&out_dir).map_err(|e| HandlerErr {
        code: "export_failed",
        message: format!("{e:#}"),
        details: None,
    })?;
    Ok(summary_json(&summary))
}

/// Destructive by contract: a successful import replaces the whole roster
/// and discards all attendance/observation history. Any read, parse or
/// empty-file failure leaves the existing roster untouched.
fn import_roster(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let path = get_path(params, "path")?;
    let rows = xlsx::read_roster(&path).map_err(|e| HandlerErr {
        code: "import_failed",
        message: format!("{e:#}"),
        details: Some(json!({ "path": path.to_string_lossy() })),
    })?;
    let imported = state.roster.replace_all(rows)?;
    Ok(json!({ "imported": imported }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "exchange.exportRoster" => export_roster(state, &req.params),
        "exchange.exportReport" => export_report(state, &req.params),
        "exchange.exportTemplate" => export_template(&req.params),
        "exchange.importRoster" => import_roster(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    })
}
