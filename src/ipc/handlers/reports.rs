use std::path::PathBuf;

use chrono::Local;
use serde_json::json;

use super::{required_i64, required_str, to_json, with_db, HandlerErr};
use crate::export::{write_report_csv, ReportMeta};
use crate::ipc::types::{AppState, Request};
use crate::report::{self, range_label, resolve_range, ReportType};
use crate::store::{faculty, subjects};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.subjectSummary" => Some(with_db(state, req, |db| {
            let subject_id = required_i64(&req.params, "subjectId")?;
            let kind = parse_report_type(&req.params)?;
            let today = Local::now().date_naive();
            let (start, end) = resolve_range(kind, today);
            let summary = db
                .with_conn(|conn| Ok(report::subject_report(conn, subject_id, start, end)?))
                .map_err(HandlerErr::query)?;
            Ok(json!({
                "reportType": kind.label(),
                "rangeLabel": range_label(start, end),
                "report": to_json(summary),
            }))
        })),
        "reports.studentSummary" => Some(with_db(state, req, |db| {
            let student_id = required_i64(&req.params, "studentId")?;
            let subject_id = required_i64(&req.params, "subjectId")?;
            let (total, present, percentage, status) = db
                .with_conn(|conn| Ok(report::student_summary(conn, student_id, subject_id)?))
                .map_err(HandlerErr::query)?;
            Ok(json!({
                "total": total,
                "present": present,
                "absent": total - present,
                "percentage": percentage,
                "status": status,
            }))
        })),
        "reports.exportCsv" => Some(with_db(state, req, |db| {
            let subject_id = required_i64(&req.params, "subjectId")?;
            let kind = parse_report_type(&req.params)?;
            let path = PathBuf::from(required_str(&req.params, "path")?);
            let today = Local::now().date_naive();
            let (start, end) = resolve_range(kind, today);

            let (subject, faculty_name, summary) = db
                .with_conn(|conn| {
                    let subject = subjects::get_by_id(conn, subject_id)?;
                    let Some(subject) = subject else {
                        return Ok((None, String::new(), None));
                    };
                    let faculty_name = faculty::get_by_id(conn, subject.faculty_id)?
                        .map(|f| f.name)
                        .unwrap_or_else(|| "Unknown".to_string());
                    let summary = report::subject_report(conn, subject_id, start, end)?;
                    Ok((Some(subject), faculty_name, Some(summary)))
                })
                .map_err(HandlerErr::query)?;
            let (Some(subject), Some(summary)) = (subject, summary) else {
                return Err(HandlerErr::not_found(format!("no subject {}", subject_id)));
            };

            let meta = ReportMeta {
                faculty_name,
                department: subject.department.clone(),
                subject_name: subject.name.clone(),
                subject_code: subject.code.clone(),
                range_label: range_label(start, end),
                report_type: kind.label().to_string(),
                generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            };
            write_report_csv(&path, &meta, &summary).map_err(HandlerErr::export)?;
            Ok(json!({ "path": path.display().to_string() }))
        })),
        _ => None,
    }
}

fn parse_report_type(params: &serde_json::Value) -> Result<ReportType, HandlerErr> {
    let raw = required_str(params, "reportType")?;
    ReportType::parse(&raw)
        .ok_or_else(|| HandlerErr::bad_params(format!("unknown report type: {}", raw)))
}
