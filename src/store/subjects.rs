use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

use super::next_id;
use crate::db::table_has_column;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub faculty_id: i64,
    pub semester: String,
    pub department: String,
}

fn from_row(row: &Row) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        faculty_id: row.get("faculty_id")?,
        semester: row.get("semester")?,
        department: row.get("department")?,
    })
}

/// Databases created before the report columns existed get them added here,
/// with empty-string defaults. Runs in front of every subjects operation;
/// repair-on-access rather than a versioned migration, kept deliberately.
pub fn ensure_report_columns(conn: &Connection) -> anyhow::Result<()> {
    if !table_has_column(conn, "subjects", "semester")? {
        conn.execute("ALTER TABLE subjects ADD COLUMN semester TEXT DEFAULT ''", [])?;
        eprintln!("attendanced: added subjects.semester column");
    }
    if !table_has_column(conn, "subjects", "department")? {
        conn.execute(
            "ALTER TABLE subjects ADD COLUMN department TEXT DEFAULT ''",
            [],
        )?;
        eprintln!("attendanced: added subjects.department column");
    }
    Ok(())
}

pub fn get_by_id(conn: &Connection, id: i64) -> anyhow::Result<Option<Subject>> {
    ensure_report_columns(conn)?;
    Ok(conn
        .query_row("SELECT * FROM subjects WHERE id = ?", [id], from_row)
        .optional()?)
}

pub fn list_all(conn: &Connection) -> anyhow::Result<Vec<Subject>> {
    ensure_report_columns(conn)?;
    let mut stmt = conn.prepare("SELECT * FROM subjects ORDER BY id")?;
    let rows = stmt.query_map([], from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn list_by_faculty(conn: &Connection, faculty_id: i64) -> anyhow::Result<Vec<Subject>> {
    ensure_report_columns(conn)?;
    let mut stmt = conn.prepare("SELECT * FROM subjects WHERE faculty_id = ? ORDER BY id")?;
    let rows = stmt.query_map([faculty_id], from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn list_by_student(conn: &Connection, student_id: i64) -> anyhow::Result<Vec<Subject>> {
    ensure_report_columns(conn)?;
    let mut stmt = conn.prepare(
        "SELECT s.* FROM subjects s
         JOIN student_subjects ss ON s.id = ss.subject_id
         WHERE ss.student_id = ?
         ORDER BY s.id",
    )?;
    let rows = stmt.query_map([student_id], from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn add(
    conn: &Connection,
    name: &str,
    code: &str,
    faculty_id: i64,
    semester: &str,
    department: &str,
) -> anyhow::Result<i64> {
    ensure_report_columns(conn)?;
    let id = next_id(conn, "subjects")?;
    conn.execute(
        "INSERT INTO subjects(id, name, code, faculty_id, semester, department)
         VALUES(?, ?, ?, ?, ?, ?)",
        (id, name, code, faculty_id, semester, department),
    )?;
    Ok(id)
}

pub fn update(
    conn: &Connection,
    id: i64,
    name: &str,
    code: &str,
    faculty_id: i64,
    semester: &str,
    department: &str,
) -> anyhow::Result<bool> {
    ensure_report_columns(conn)?;
    let n = conn.execute(
        "UPDATE subjects SET name = ?, code = ?, faculty_id = ?, semester = ?, department = ?
         WHERE id = ?",
        (name, code, faculty_id, semester, department, id),
    )?;
    Ok(n > 0)
}

/// Deletes a subject with its enrollments and attendance rows in one
/// transaction.
pub fn delete(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM student_subjects WHERE subject_id = ?", [id])?;
    tx.execute("DELETE FROM attendance WHERE subject_id = ?", [id])?;
    let n = tx.execute("DELETE FROM subjects WHERE id = ?", [id])?;
    if n == 0 {
        return Ok(false);
    }
    tx.commit()?;
    Ok(true)
}
