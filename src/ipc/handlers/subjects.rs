use serde_json::json;

use super::{optional_str, required_i64, required_str, to_json, with_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::subjects;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.list" => Some(with_db(state, req, |db| {
            let list = db
                .with_conn(subjects::list_all)
                .map_err(HandlerErr::query)?;
            Ok(json!({ "subjects": to_json(list) }))
        })),
        "subjects.get" => Some(with_db(state, req, |db| {
            let id = required_i64(&req.params, "id")?;
            let subject = db
                .with_conn(|conn| subjects::get_by_id(conn, id))
                .map_err(HandlerErr::query)?;
            let subject =
                subject.ok_or_else(|| HandlerErr::not_found(format!("no subject {}", id)))?;
            Ok(to_json(subject))
        })),
        "subjects.listByFaculty" => Some(with_db(state, req, |db| {
            let faculty_id = required_i64(&req.params, "facultyId")?;
            let list = db
                .with_conn(|conn| subjects::list_by_faculty(conn, faculty_id))
                .map_err(HandlerErr::query)?;
            Ok(json!({ "subjects": to_json(list) }))
        })),
        "subjects.listByStudent" => Some(with_db(state, req, |db| {
            let student_id = required_i64(&req.params, "studentId")?;
            let list = db
                .with_conn(|conn| subjects::list_by_student(conn, student_id))
                .map_err(HandlerErr::query)?;
            Ok(json!({ "subjects": to_json(list) }))
        })),
        "subjects.create" => Some(with_db(state, req, |db| {
            let name = required_str(&req.params, "name")?;
            let code = required_str(&req.params, "code")?;
            let faculty_id = required_i64(&req.params, "facultyId")?;
            let semester = optional_str(&req.params, "semester");
            let department = optional_str(&req.params, "department");
            let id = db
                .with_conn(|conn| {
                    subjects::add(conn, &name, &code, faculty_id, &semester, &department)
                })
                .map_err(HandlerErr::update)?;
            Ok(json!({ "subjectId": id }))
        })),
        "subjects.update" => Some(with_db(state, req, |db| {
            let id = required_i64(&req.params, "id")?;
            let name = required_str(&req.params, "name")?;
            let code = required_str(&req.params, "code")?;
            let faculty_id = required_i64(&req.params, "facultyId")?;
            let semester = optional_str(&req.params, "semester");
            let department = optional_str(&req.params, "department");
            let updated = db
                .with_conn(|conn| {
                    subjects::update(conn, id, &name, &code, faculty_id, &semester, &department)
                })
                .map_err(HandlerErr::update)?;
            if !updated {
                return Err(HandlerErr::not_found(format!("no subject {}", id)));
            }
            Ok(json!({ "updated": true }))
        })),
        "subjects.delete" => Some(with_db(state, req, |db| {
            let id = required_i64(&req.params, "id")?;
            let deleted = db
                .with_conn(|conn| subjects::delete(conn, id))
                .map_err(HandlerErr::update)?;
            if !deleted {
                return Err(HandlerErr::not_found(format!("no subject {}", id)));
            }
            Ok(json!({ "deleted": true }))
        })),
        _ => None,
    }
}
