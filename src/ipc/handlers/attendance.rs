use serde_json::json;

use super::{required_bool, required_date, required_i64, to_json, with_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::attendance;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.mark" => Some(with_db(state, req, |db| {
            let student_id = required_i64(&req.params, "studentId")?;
            let subject_id = required_i64(&req.params, "subjectId")?;
            let date = required_date(&req.params, "date")?;
            let present = required_bool(&req.params, "present")?;
            let id = db
                .with_conn(|conn| {
                    Ok(attendance::mark(conn, student_id, subject_id, date, present)?)
                })
                .map_err(HandlerErr::update)?;
            Ok(json!({ "recordId": id }))
        })),
        "attendance.listByStudentSubject" => Some(with_db(state, req, |db| {
            let student_id = required_i64(&req.params, "studentId")?;
            let subject_id = required_i64(&req.params, "subjectId")?;
            let records = db
                .with_conn(|conn| {
                    Ok(attendance::list_by_student_subject(conn, student_id, subject_id)?)
                })
                .map_err(HandlerErr::query)?;
            Ok(json!({ "records": to_json(records) }))
        })),
        "attendance.listBySubjectDate" => Some(with_db(state, req, |db| {
            let subject_id = required_i64(&req.params, "subjectId")?;
            let date = required_date(&req.params, "date")?;
            let records = db
                .with_conn(|conn| Ok(attendance::list_by_subject_date(conn, subject_id, date)?))
                .map_err(HandlerErr::query)?;
            Ok(json!({ "records": to_json(records) }))
        })),
        "attendance.percentage" => Some(with_db(state, req, |db| {
            let student_id = required_i64(&req.params, "studentId")?;
            let subject_id = required_i64(&req.params, "subjectId")?;
            let percentage = db
                .with_conn(|conn| Ok(attendance::percentage(conn, student_id, subject_id)?))
                .map_err(HandlerErr::query)?;
            Ok(json!({ "percentage": percentage }))
        })),
        _ => None,
    }
}
