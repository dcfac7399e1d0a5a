use serde_json::json;

use super::{required_i64, with_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::enrollments;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "enrollments.add" => Some(with_db(state, req, |db| {
            let student_id = required_i64(&req.params, "studentId")?;
            let subject_id = required_i64(&req.params, "subjectId")?;
            let id = db
                .with_conn(|conn| Ok(enrollments::enroll(conn, student_id, subject_id)?))
                .map_err(HandlerErr::update)?;
            let id = id.ok_or_else(|| {
                HandlerErr::conflict(format!(
                    "student {} already enrolled in subject {}",
                    student_id, subject_id
                ))
            })?;
            Ok(json!({ "enrollmentId": id }))
        })),
        "enrollments.remove" => Some(with_db(state, req, |db| {
            let student_id = required_i64(&req.params, "studentId")?;
            let subject_id = required_i64(&req.params, "subjectId")?;
            let removed = db
                .with_conn(|conn| Ok(enrollments::unenroll(conn, student_id, subject_id)?))
                .map_err(HandlerErr::update)?;
            if !removed {
                return Err(HandlerErr::not_found(format!(
                    "student {} not enrolled in subject {}",
                    student_id, subject_id
                )));
            }
            Ok(json!({ "removed": true }))
        })),
        _ => None,
    }
}
