use std::path::PathBuf;

use serde_json::json;

use super::required_str;
use crate::db::DbProvider;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(ok(
            &req.id,
            json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "workspacePath": state.workspace.as_ref().map(|p| p.display().to_string()),
            }),
        )),
        "workspace.select" => Some(workspace_select(state, req)),
        "workspace.close" => {
            if let Some(db) = state.db.take() {
                db.close();
            }
            state.workspace = None;
            Some(ok(&req.id, json!({ "closed": true })))
        }
        _ => None,
    }
}

fn workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_str(&req.params, "path") {
        Ok(p) => PathBuf::from(p),
        Err(e) => return e.response(&req.id),
    };
    match DbProvider::open(&path) {
        Ok(db) => {
            if let Some(old) = state.db.take() {
                old.close();
            }
            state.db = Some(db);
            state.workspace = Some(path.clone());
            ok(&req.id, json!({ "workspacePath": path.display().to_string() }))
        }
        Err(e) => err(&req.id, "db_open_failed", e.to_string(), None),
    }
}
