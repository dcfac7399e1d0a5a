use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

use super::{next_id, normalize_username, users};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub roll_no: String,
    pub course: String,
    pub user_id: i64,
}

fn from_row(row: &Row) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get("id")?,
        name: row.get("name")?,
        roll_no: row.get("roll_no")?,
        course: row.get("course")?,
        user_id: row.get("user_id")?,
    })
}

pub fn get_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Student>> {
    conn.query_row("SELECT * FROM students WHERE id = ?", [id], from_row)
        .optional()
}

pub fn get_by_user_id(conn: &Connection, user_id: i64) -> rusqlite::Result<Option<Student>> {
    conn.query_row("SELECT * FROM students WHERE user_id = ?", [user_id], from_row)
        .optional()
}

pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<Student>> {
    let mut stmt = conn.prepare("SELECT * FROM students ORDER BY id")?;
    let rows = stmt.query_map([], from_row)?;
    rows.collect()
}

pub fn list_by_subject(conn: &Connection, subject_id: i64) -> rusqlite::Result<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT s.* FROM students s
         JOIN student_subjects ss ON s.id = ss.student_id
         WHERE ss.subject_id = ?
         ORDER BY s.id",
    )?;
    let rows = stmt.query_map([subject_id], from_row)?;
    rows.collect()
}

pub fn list_not_in_subject(conn: &Connection, subject_id: i64) -> rusqlite::Result<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM students WHERE id NOT IN
           (SELECT student_id FROM student_subjects WHERE subject_id = ?)
         ORDER BY id",
    )?;
    let rows = stmt.query_map([subject_id], from_row)?;
    rows.collect()
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedStudent {
    pub student_id: i64,
    pub user_id: i64,
}

/// Creates the login user (role `student`, username derived from the roll
/// number) and the student row in one transaction. Returns `None` when the
/// derived username is already taken; on any mid-sequence failure neither row
/// persists.
pub fn create(
    conn: &Connection,
    name: &str,
    roll_no: &str,
    course: &str,
    password: &str,
) -> rusqlite::Result<Option<CreatedStudent>> {
    let tx = conn.unchecked_transaction()?;
    let username = normalize_username(roll_no);
    if users::username_exists(&tx, &username)? {
        return Ok(None);
    }
    let user_id = next_id(&tx, "users")?;
    tx.execute(
        "INSERT INTO users(id, username, password, role, name) VALUES(?, ?, ?, 'student', ?)",
        (user_id, &username, password, name),
    )?;
    let student_id = next_id(&tx, "students")?;
    tx.execute(
        "INSERT INTO students(id, name, roll_no, course, user_id) VALUES(?, ?, ?, ?, ?)",
        (student_id, name, roll_no, course, user_id),
    )?;
    tx.commit()?;
    Ok(Some(CreatedStudent { student_id, user_id }))
}

/// Updates the student row and keeps the owning user's display name in sync.
pub fn update(
    conn: &Connection,
    id: i64,
    name: &str,
    roll_no: &str,
    course: &str,
) -> rusqlite::Result<bool> {
    let tx = conn.unchecked_transaction()?;
    let n = tx.execute(
        "UPDATE students SET name = ?, roll_no = ?, course = ? WHERE id = ?",
        (name, roll_no, course, id),
    )?;
    if n == 0 {
        return Ok(false);
    }
    tx.execute(
        "UPDATE users SET name = ? WHERE id = (SELECT user_id FROM students WHERE id = ?)",
        (name, id),
    )?;
    tx.commit()?;
    Ok(true)
}

/// Deletes a student with its enrollments, attendance rows, and login user
/// in one transaction.
pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let tx = conn.unchecked_transaction()?;
    let user_id: Option<i64> = tx
        .query_row("SELECT user_id FROM students WHERE id = ?", [id], |r| r.get(0))
        .optional()?;
    let Some(user_id) = user_id else {
        return Ok(false);
    };
    tx.execute("DELETE FROM student_subjects WHERE student_id = ?", [id])?;
    tx.execute("DELETE FROM attendance WHERE student_id = ?", [id])?;
    tx.execute("DELETE FROM students WHERE id = ?", [id])?;
    tx.execute("DELETE FROM users WHERE id = ?", [user_id])?;
    tx.commit()?;
    Ok(true)
}
