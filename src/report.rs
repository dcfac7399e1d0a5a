use chrono::{Months, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashSet;

use crate::store::{attendance, students};

/// Fixed policy threshold: at or above is Good Standing.
pub const PASS_THRESHOLD: f64 = 75.0;
/// Lower bound for "All Time" reports.
pub const ALL_TIME_EPOCH: (i32, u32, u32) = (2000, 1, 1);

pub const STATUS_GOOD: &str = "Good Standing";
pub const STATUS_LOW: &str = "Low Attendance";
pub const STATUS_NO_DATA: &str = "No Data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Daily,
    Weekly,
    Monthly,
    AllTime,
}

impl ReportType {
    pub fn parse(s: &str) -> Option<ReportType> {
        match s {
            "Daily" => Some(ReportType::Daily),
            "Weekly" => Some(ReportType::Weekly),
            "Monthly" => Some(ReportType::Monthly),
            "All Time" => Some(ReportType::AllTime),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportType::Daily => "Daily",
            ReportType::Weekly => "Weekly",
            ReportType::Monthly => "Monthly",
            ReportType::AllTime => "All Time",
        }
    }
}

/// Resolves a report type to an inclusive [start, end] date range anchored at
/// `today`. Weekly reaches back seven days, Monthly one calendar month,
/// All Time to the fixed epoch.
pub fn resolve_range(kind: ReportType, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = match kind {
        ReportType::Daily => today,
        ReportType::Weekly => today - chrono::Duration::days(7),
        ReportType::Monthly => today
            .checked_sub_months(Months::new(1))
            .unwrap_or(today - chrono::Duration::days(30)),
        ReportType::AllTime => {
            let (y, m, d) = ALL_TIME_EPOCH;
            NaiveDate::from_ymd_opt(y, m, d).unwrap_or(today)
        }
    };
    (start, today)
}

pub fn range_label(start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        start.format("%Y-%m-%d").to_string()
    } else {
        format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
    }
}

pub fn status_for(total: usize, percentage: f64) -> &'static str {
    if total == 0 {
        STATUS_NO_DATA
    } else if percentage >= PASS_THRESHOLD {
        STATUS_GOOD
    } else {
        STATUS_LOW
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: i64,
    pub roll_no: String,
    pub name: String,
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub percentage: f64,
    pub status: &'static str,
}

/// One detail-matrix cell. `NoRecord` only appears when the student had no
/// class dates at all; an unmarked date on a recorded class day is `Absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CellMark {
    Present,
    Absent,
    NoRecord,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRow {
    pub roll_no: String,
    pub name: String,
    pub cells: Vec<CellMark>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Distinct dates with at least one attendance row for the subject in
    /// range, ascending. This is the percentage denominator basis; there is
    /// no separate class schedule.
    pub class_dates: Vec<NaiveDate>,
    pub rows: Vec<StudentSummary>,
    pub matrix: Vec<MatrixRow>,
}

/// All-time per-subject standing for one student (the student dashboard
/// view): plain row counts, no class-date reconstruction.
pub fn student_summary(
    conn: &Connection,
    student_id: i64,
    subject_id: i64,
) -> rusqlite::Result<(usize, usize, f64, &'static str)> {
    let records = attendance::list_by_student_subject(conn, student_id, subject_id)?;
    let total = records.len();
    let present = records.iter().filter(|r| r.present).count();
    let percentage = if total > 0 {
        present as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    Ok((total, present, percentage, status_for(total, percentage)))
}

/// Builds the full per-subject report for an inclusive date range: class
/// dates, per-student summary rows, and the student-by-date detail matrix.
/// Every class date not explicitly marked present counts as absent,
/// including dates with no row for the student at all.
pub fn subject_report(
    conn: &Connection,
    subject_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> rusqlite::Result<SubjectReport> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT date FROM attendance
         WHERE subject_id = ? AND date BETWEEN ? AND ?
         ORDER BY date",
    )?;
    let class_dates: Vec<NaiveDate> = stmt
        .query_map((subject_id, start, end), |r| r.get(0))?
        .collect::<rusqlite::Result<_>>()?;

    let roster = students::list_by_subject(conn, subject_id)?;
    let mut rows = Vec::with_capacity(roster.len());
    let mut matrix = Vec::with_capacity(roster.len());

    for student in &roster {
        let mut present_dates: HashSet<NaiveDate> = HashSet::new();
        for rec in attendance::list_by_student_subject(conn, student.id, subject_id)? {
            if rec.present && rec.date >= start && rec.date <= end {
                present_dates.insert(rec.date);
            }
        }

        let total = class_dates.len();
        let present = class_dates
            .iter()
            .filter(|d| present_dates.contains(d))
            .count();
        let absent = total - present;
        let percentage = if total > 0 {
            present as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        rows.push(StudentSummary {
            student_id: student.id,
            roll_no: student.roll_no.clone(),
            name: student.name.clone(),
            total,
            present,
            absent,
            percentage,
            status: status_for(total, percentage),
        });

        let cells = class_dates
            .iter()
            .map(|d| {
                if present_dates.contains(d) {
                    CellMark::Present
                } else {
                    CellMark::Absent
                }
            })
            .collect();
        matrix.push(MatrixRow {
            roll_no: student.roll_no.clone(),
            name: student.name.clone(),
            cells,
        });
    }

    Ok(SubjectReport {
        start,
        end,
        class_dates,
        rows,
        matrix,
    })
}
