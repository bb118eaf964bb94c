use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::StoreError;
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

fn get_student_id(params: &serde_json::Value) -> Result<i64, HandlerErr> {
    params
        .get("studentId")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: "missing studentId".to_string(),
        })
}

fn observations_add(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_student_id(params)?;
    let text = params
        .get("text")
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: "missing text".to_string(),
        })?;
    state.roster.add_observation(student_id, text)?;
    Ok(json!({ "ok": true }))
}

fn observations_list(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_student_id(params)?;
    let student = state
        .roster
        .student(student_id)
        .ok_or(StoreError::NotFound(student_id))?;
    Ok(json!({
        "studentId": student.id,
        "observations": student.observations
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "observations.add" => observations_add(state, &req.params),
        "observations.list" => observations_list(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    })
}
