use serde_json::json;

use super::{optional_str, required_i64, required_str, to_json, with_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::faculty;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "faculty.list" => Some(with_db(state, req, |db| {
            let list = db
                .with_conn(|conn| Ok(faculty::list_all(conn)?))
                .map_err(HandlerErr::query)?;
            Ok(json!({ "faculty": to_json(list) }))
        })),
        "faculty.get" => Some(with_db(state, req, |db| {
            let id = required_i64(&req.params, "id")?;
            let member = db
                .with_conn(|conn| Ok(faculty::get_by_id(conn, id)?))
                .map_err(HandlerErr::query)?;
            let member =
                member.ok_or_else(|| HandlerErr::not_found(format!("no faculty {}", id)))?;
            Ok(to_json(member))
        })),
        "faculty.getByUser" => Some(with_db(state, req, |db| {
            let user_id = required_i64(&req.params, "userId")?;
            let member = db
                .with_conn(|conn| Ok(faculty::get_by_user_id(conn, user_id)?))
                .map_err(HandlerErr::query)?;
            let member = member
                .ok_or_else(|| HandlerErr::not_found(format!("no faculty for user {}", user_id)))?;
            Ok(to_json(member))
        })),
        "faculty.create" => Some(with_db(state, req, |db| {
            let name = required_str(&req.params, "name")?;
            let department = optional_str(&req.params, "department");
            let username = required_str(&req.params, "username")?;
            let password = required_str(&req.params, "password")?;
            let created = db
                .with_conn(|conn| {
                    Ok(faculty::create(conn, &name, &department, &username, &password)?)
                })
                .map_err(HandlerErr::update)?;
            let created = created.ok_or_else(|| {
                HandlerErr::conflict(format!("username {} already taken", username))
            })?;
            Ok(to_json(created))
        })),
        "faculty.update" => Some(with_db(state, req, |db| {
            let id = required_i64(&req.params, "id")?;
            let name = required_str(&req.params, "name")?;
            let department = optional_str(&req.params, "department");
            let updated = db
                .with_conn(|conn| Ok(faculty::update(conn, id, &name, &department)?))
                .map_err(HandlerErr::update)?;
            if !updated {
                return Err(HandlerErr::not_found(format!("no faculty {}", id)));
            }
            Ok(json!({ "updated": true }))
        })),
        "faculty.delete" => Some(with_db(state, req, |db| {
            let id = required_i64(&req.params, "id")?;
            let deleted = db
                .with_conn(|conn| Ok(faculty::delete(conn, id)?))
                .map_err(HandlerErr::update)?;
            if !deleted {
                return Err(HandlerErr::not_found(format!("no faculty {}", id)));
            }
            Ok(json!({ "deleted": true }))
        })),
        _ => None,
    }
}
