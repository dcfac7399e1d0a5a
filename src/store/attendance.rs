use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

use super::next_id;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub date: NaiveDate,
    pub present: bool,
}

fn from_row(row: &Row) -> rusqlite::Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        subject_id: row.get("subject_id")?,
        date: row.get("date")?,
        present: row.get::<_, i64>("present")? != 0,
    })
}

/// Records presence for (student, subject, date). At most one row exists per
/// triple: an existing row is updated in place, so marking twice never
/// duplicates. The invariant lives in this check, not in a constraint.
pub fn mark(
    conn: &Connection,
    student_id: i64,
    subject_id: i64,
    date: NaiveDate,
    present: bool,
) -> rusqlite::Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM attendance WHERE student_id = ? AND subject_id = ? AND date = ?",
            (student_id, subject_id, date),
            |r| r.get(0),
        )
        .optional()?;
    match existing {
        Some(id) => {
            conn.execute(
                "UPDATE attendance SET present = ? WHERE id = ?",
                (present as i64, id),
            )?;
            Ok(id)
        }
        None => {
            let id = next_id(conn, "attendance")?;
            conn.execute(
                "INSERT INTO attendance(id, student_id, subject_id, date, present)
                 VALUES(?, ?, ?, ?, ?)",
                (id, student_id, subject_id, date, present as i64),
            )?;
            Ok(id)
        }
    }
}

pub fn list_by_student_subject(
    conn: &Connection,
    student_id: i64,
    subject_id: i64,
) -> rusqlite::Result<Vec<AttendanceRecord>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM attendance WHERE student_id = ? AND subject_id = ? ORDER BY date",
    )?;
    let rows = stmt.query_map((student_id, subject_id), from_row)?;
    rows.collect()
}

pub fn list_by_subject_date(
    conn: &Connection,
    subject_id: i64,
    date: NaiveDate,
) -> rusqlite::Result<Vec<AttendanceRecord>> {
    let mut stmt =
        conn.prepare("SELECT * FROM attendance WHERE subject_id = ? AND date = ? ORDER BY student_id")?;
    let rows = stmt.query_map((subject_id, date), from_row)?;
    rows.collect()
}

/// All-time attendance percentage for one student in one subject; 0 when no
/// rows exist, never a divide-by-zero.
pub fn percentage(conn: &Connection, student_id: i64, subject_id: i64) -> rusqlite::Result<f64> {
    let (total, present): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(present), 0) FROM attendance
         WHERE student_id = ? AND subject_id = ?",
        (student_id, subject_id),
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    if total == 0 {
        return Ok(0.0);
    }
    Ok(present as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        db::apply_schema(&conn);
        // FK targets for attendance rows.
        conn.execute(
            "INSERT INTO users(id, username, password, role, name) VALUES(2, 's', 'x', 'student', 'S')",
            [],
        )
        .expect("user");
        conn.execute(
            "INSERT INTO students(id, name, roll_no, course, user_id) VALUES(1, 'S', 'R1', 'CS', 2)",
            [],
        )
        .expect("student");
        conn.execute(
            "INSERT INTO users(id, username, password, role, name) VALUES(3, 'f', 'x', 'faculty', 'F')",
            [],
        )
        .expect("user");
        conn.execute(
            "INSERT INTO faculty(id, name, department, user_id) VALUES(1, 'F', 'CS', 3)",
            [],
        )
        .expect("faculty");
        conn.execute(
            "INSERT INTO subjects(id, name, code, faculty_id, semester, department)
             VALUES(1, 'Algo', 'CS301', 1, '', '')",
            [],
        )
        .expect("subject");
        conn
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    #[test]
    fn marking_twice_keeps_one_row_with_latest_value() {
        let conn = test_conn();
        let first = mark(&conn, 1, 1, d("2024-03-01"), true).expect("mark");
        let second = mark(&conn, 1, 1, d("2024-03-01"), true).expect("mark again");
        assert_eq!(first, second);
        let rows = list_by_student_subject(&conn, 1, 1).expect("list");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].present);

        // Flipping to absent updates in place.
        mark(&conn, 1, 1, d("2024-03-01"), false).expect("flip");
        let rows = list_by_student_subject(&conn, 1, 1).expect("list");
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].present);
    }

    #[test]
    fn percentage_is_presents_over_total() {
        let conn = test_conn();
        mark(&conn, 1, 1, d("2024-03-01"), true).expect("mark");
        mark(&conn, 1, 1, d("2024-03-02"), true).expect("mark");
        mark(&conn, 1, 1, d("2024-03-03"), true).expect("mark");
        mark(&conn, 1, 1, d("2024-03-04"), false).expect("mark");
        let pct = percentage(&conn, 1, 1).expect("pct");
        assert!((pct - 75.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_with_no_rows_is_zero() {
        let conn = test_conn();
        assert_eq!(percentage(&conn, 1, 1).expect("pct"), 0.0);
    }

    #[test]
    fn list_by_subject_date_filters_exact_day() {
        let conn = test_conn();
        mark(&conn, 1, 1, d("2024-03-01"), true).expect("mark");
        mark(&conn, 1, 1, d("2024-03-02"), false).expect("mark");
        let rows = list_by_subject_date(&conn, 1, d("2024-03-02")).expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, d("2024-03-02"));
        assert!(!rows[0].present);
    }
}
