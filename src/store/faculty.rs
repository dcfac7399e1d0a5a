use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

use super::{next_id, normalize_username, users};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub user_id: i64,
}

fn from_row(row: &Row) -> rusqlite::Result<Faculty> {
    Ok(Faculty {
        id: row.get("id")?,
        name: row.get("name")?,
        department: row.get("department")?,
        user_id: row.get("user_id")?,
    })
}

pub fn get_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Faculty>> {
    conn.query_row("SELECT * FROM faculty WHERE id = ?", [id], from_row)
        .optional()
}

pub fn get_by_user_id(conn: &Connection, user_id: i64) -> rusqlite::Result<Option<Faculty>> {
    conn.query_row("SELECT * FROM faculty WHERE user_id = ?", [user_id], from_row)
        .optional()
}

pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<Faculty>> {
    let mut stmt = conn.prepare("SELECT * FROM faculty ORDER BY id")?;
    let rows = stmt.query_map([], from_row)?;
    rows.collect()
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedFaculty {
    pub faculty_id: i64,
    pub user_id: i64,
}

/// Creates the login user (role `faculty`) and the faculty row in one
/// transaction. Returns `None` when the username is already taken.
pub fn create(
    conn: &Connection,
    name: &str,
    department: &str,
    username: &str,
    password: &str,
) -> rusqlite::Result<Option<CreatedFaculty>> {
    let tx = conn.unchecked_transaction()?;
    let username = normalize_username(username);
    if users::username_exists(&tx, &username)? {
        return Ok(None);
    }
    let user_id = next_id(&tx, "users")?;
    tx.execute(
        "INSERT INTO users(id, username, password, role, name) VALUES(?, ?, ?, 'faculty', ?)",
        (user_id, &username, password, name),
    )?;
    let faculty_id = next_id(&tx, "faculty")?;
    tx.execute(
        "INSERT INTO faculty(id, name, department, user_id) VALUES(?, ?, ?, ?)",
        (faculty_id, name, department, user_id),
    )?;
    tx.commit()?;
    Ok(Some(CreatedFaculty { faculty_id, user_id }))
}

pub fn update(conn: &Connection, id: i64, name: &str, department: &str) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "UPDATE faculty SET name = ?, department = ? WHERE id = ?",
        (name, department, id),
    )?;
    Ok(n > 0)
}

/// Deletes a faculty member in one transaction: every taught subject goes
/// first (with its enrollments and attendance), then the faculty row and the
/// login user. Subjects are deleted, never reassigned.
pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let tx = conn.unchecked_transaction()?;
    let user_id: Option<i64> = tx
        .query_row("SELECT user_id FROM faculty WHERE id = ?", [id], |r| r.get(0))
        .optional()?;
    let Some(user_id) = user_id else {
        return Ok(false);
    };
    tx.execute(
        "DELETE FROM student_subjects WHERE subject_id IN
           (SELECT id FROM subjects WHERE faculty_id = ?)",
        [id],
    )?;
    tx.execute(
        "DELETE FROM attendance WHERE subject_id IN
           (SELECT id FROM subjects WHERE faculty_id = ?)",
        [id],
    )?;
    tx.execute("DELETE FROM subjects WHERE faculty_id = ?", [id])?;
    tx.execute("DELETE FROM faculty WHERE id = ?", [id])?;
    tx.execute("DELETE FROM users WHERE id = ?", [user_id])?;
    tx.commit()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::{enrollments, students};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        db::apply_schema(&conn);
        conn
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .expect("count")
    }

    #[test]
    fn create_normalizes_username_and_sets_role() {
        let conn = test_conn();
        let created = create(&conn, "Dr Rao", "CS", " D Rao ", "pw")
            .expect("create")
            .expect("ids");
        let user = users::get_by_id(&conn, created.user_id).expect("q").expect("user");
        assert_eq!(user.username, "drao");
        assert_eq!(user.role, "faculty");
    }

    #[test]
    fn delete_takes_subjects_enrollments_and_user_along() {
        let conn = test_conn();
        let fac = create(&conn, "Dr Rao", "CS", "drao", "pw").expect("create").expect("ids");
        conn.execute(
            "INSERT INTO subjects(id, name, code, faculty_id, semester, department)
             VALUES(7, 'Algo', 'CS301', ?, '', '')",
            [fac.faculty_id],
        )
        .expect("subject");
        let st = students::create(&conn, "Asha", "R1", "CS", "pw")
            .expect("create")
            .expect("ids");
        enrollments::enroll(&conn, st.student_id, 7).expect("enroll");
        conn.execute(
            "INSERT INTO attendance(id, student_id, subject_id, date, present)
             VALUES(1, ?, 7, '2024-03-01', 1)",
            [st.student_id],
        )
        .expect("attendance");

        assert!(delete(&conn, fac.faculty_id).expect("delete"));
        assert_eq!(count(&conn, "subjects"), 0);
        assert_eq!(count(&conn, "student_subjects"), 0);
        assert_eq!(count(&conn, "attendance"), 0);
        assert!(users::get_by_id(&conn, fac.user_id).expect("q").is_none());
        // The student and its user are untouched.
        assert!(students::get_by_id(&conn, st.student_id).expect("q").is_some());
    }
}
