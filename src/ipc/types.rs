use serde::Deserialize;

use crate::store::Roster;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// All daemon state: one owned in-memory roster. Nothing is persisted;
/// the roster starts empty and is dropped when the process exits.
#[derive(Default)]
pub struct AppState {
    pub roster: Roster,
}
