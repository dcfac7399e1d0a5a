use serde_json::json;

use super::{required_i64, required_str, to_json, with_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, users};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(with_db(state, req, |db| {
            let username = store::normalize_username(&required_str(&req.params, "username")?);
            let password = required_str(&req.params, "password")?;
            let user = db
                .with_conn(|conn| Ok(users::validate(conn, &username, &password)?))
                .map_err(HandlerErr::query)?;
            let user = user.ok_or_else(HandlerErr::invalid_credentials)?;
            Ok(to_json(user))
        })),
        "auth.changePassword" => Some(with_db(state, req, |db| {
            let user_id = required_i64(&req.params, "userId")?;
            let new_password = required_str(&req.params, "newPassword")?;
            let changed = db
                .with_conn(|conn| Ok(users::change_password(conn, user_id, &new_password)?))
                .map_err(HandlerErr::update)?;
            if !changed {
                return Err(HandlerErr::not_found(format!("no user {}", user_id)));
            }
            Ok(json!({ "changed": true }))
        })),
        "users.get" => Some(with_db(state, req, |db| {
            let id = required_i64(&req.params, "id")?;
            let user = db
                .with_conn(|conn| Ok(users::get_by_id(conn, id)?))
                .map_err(HandlerErr::query)?;
            let user = user.ok_or_else(|| HandlerErr::not_found(format!("no user {}", id)))?;
            Ok(to_json(user))
        })),
        _ => None,
    }
}
