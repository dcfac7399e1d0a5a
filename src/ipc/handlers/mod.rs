pub mod attendance;
pub mod auth;
pub mod core;
pub mod enrollments;
pub mod faculty;
pub mod reports;
pub mod students;
pub mod subjects;

use chrono::NaiveDate;

use crate::db::DbProvider;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

/// Handler-level failure carrying the IPC error code. Read failures map to
/// `db_query_failed`, mutation failures to `db_update_failed`; lookup and
/// constraint failures get their own codes so the GUI can branch on kind.
pub(crate) struct HandlerErr {
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub(crate) fn bad_params(message: impl Into<String>) -> HandlerErr {
        HandlerErr {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub(crate) fn not_found(message: impl Into<String>) -> HandlerErr {
        HandlerErr {
            code: "not_found",
            message: message.into(),
            details: None,
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> HandlerErr {
        HandlerErr {
            code: "conflict",
            message: message.into(),
            details: None,
        }
    }

    pub(crate) fn invalid_credentials() -> HandlerErr {
        HandlerErr {
            code: "invalid_credentials",
            message: "unknown username or wrong password".to_string(),
            details: None,
        }
    }

    pub(crate) fn query(e: anyhow::Error) -> HandlerErr {
        HandlerErr {
            code: "db_query_failed",
            message: e.to_string(),
            details: None,
        }
    }

    pub(crate) fn update(e: anyhow::Error) -> HandlerErr {
        HandlerErr {
            code: "db_update_failed",
            message: e.to_string(),
            details: None,
        }
    }

    pub(crate) fn export(e: anyhow::Error) -> HandlerErr {
        HandlerErr {
            code: "export_failed",
            message: e.to_string(),
            details: None,
        }
    }

    pub(crate) fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

/// Runs a handler body against the selected workspace, translating the
/// result into an IPC response.
pub(crate) fn with_db(
    state: &AppState,
    req: &Request,
    f: impl FnOnce(&DbProvider) -> Result<serde_json::Value, HandlerErr>,
) -> serde_json::Value {
    let Some(db) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(db) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub(crate) fn to_json(value: impl serde::Serialize) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

pub(crate) fn required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub(crate) fn required_i64(params: &serde_json::Value, key: &str) -> Result<i64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub(crate) fn required_bool(params: &serde_json::Value, key: &str) -> Result<bool, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub(crate) fn optional_str(params: &serde_json::Value, key: &str) -> String {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

pub(crate) fn required_date(params: &serde_json::Value, key: &str) -> Result<NaiveDate, HandlerErr> {
    let raw = required_str(params, key)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))
}
