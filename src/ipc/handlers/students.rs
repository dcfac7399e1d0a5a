use serde_json::json;

use super::{optional_str, required_i64, required_str, to_json, with_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::students;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(with_db(state, req, |db| {
            let list = db
                .with_conn(|conn| Ok(students::list_all(conn)?))
                .map_err(HandlerErr::query)?;
            Ok(json!({ "students": to_json(list) }))
        })),
        "students.get" => Some(with_db(state, req, |db| {
            let id = required_i64(&req.params, "id")?;
            let student = db
                .with_conn(|conn| Ok(students::get_by_id(conn, id)?))
                .map_err(HandlerErr::query)?;
            let student =
                student.ok_or_else(|| HandlerErr::not_found(format!("no student {}", id)))?;
            Ok(to_json(student))
        })),
        "students.getByUser" => Some(with_db(state, req, |db| {
            let user_id = required_i64(&req.params, "userId")?;
            let student = db
                .with_conn(|conn| Ok(students::get_by_user_id(conn, user_id)?))
                .map_err(HandlerErr::query)?;
            let student = student
                .ok_or_else(|| HandlerErr::not_found(format!("no student for user {}", user_id)))?;
            Ok(to_json(student))
        })),
        "students.listBySubject" => Some(with_db(state, req, |db| {
            let subject_id = required_i64(&req.params, "subjectId")?;
            let list = db
                .with_conn(|conn| Ok(students::list_by_subject(conn, subject_id)?))
                .map_err(HandlerErr::query)?;
            Ok(json!({ "students": to_json(list) }))
        })),
        "students.listUnenrolled" => Some(with_db(state, req, |db| {
            let subject_id = required_i64(&req.params, "subjectId")?;
            let list = db
                .with_conn(|conn| Ok(students::list_not_in_subject(conn, subject_id)?))
                .map_err(HandlerErr::query)?;
            Ok(json!({ "students": to_json(list) }))
        })),
        "students.create" => Some(with_db(state, req, |db| {
            let name = required_str(&req.params, "name")?;
            let roll_no = required_str(&req.params, "rollNo")?;
            let course = optional_str(&req.params, "course");
            let password = required_str(&req.params, "password")?;
            let created = db
                .with_conn(|conn| Ok(students::create(conn, &name, &roll_no, &course, &password)?))
                .map_err(HandlerErr::update)?;
            let created = created.ok_or_else(|| {
                HandlerErr::conflict(format!("roll number {} already registered", roll_no))
            })?;
            Ok(to_json(created))
        })),
        "students.update" => Some(with_db(state, req, |db| {
            let id = required_i64(&req.params, "id")?;
            let name = required_str(&req.params, "name")?;
            let roll_no = required_str(&req.params, "rollNo")?;
            let course = optional_str(&req.params, "course");
            let updated = db
                .with_conn(|conn| Ok(students::update(conn, id, &name, &roll_no, &course)?))
                .map_err(HandlerErr::update)?;
            if !updated {
                return Err(HandlerErr::not_found(format!("no student {}", id)));
            }
            Ok(json!({ "updated": true }))
        })),
        "students.delete" => Some(with_db(state, req, |db| {
            let id = required_i64(&req.params, "id")?;
            let deleted = db
                .with_conn(|conn| Ok(students::delete(conn, id)?))
                .map_err(HandlerErr::update)?;
            if !deleted {
                return Err(HandlerErr::not_found(format!("no student {}", id)));
            }
            Ok(json!({ "deleted": true }))
        })),
        _ => None,
    }
}
