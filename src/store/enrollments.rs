use rusqlite::{Connection, OptionalExtension};

use super::next_id;

pub fn is_enrolled(conn: &Connection, student_id: i64, subject_id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT 1 FROM student_subjects WHERE student_id = ? AND subject_id = ?",
        (student_id, subject_id),
        |r| r.get::<_, i64>(0),
    )
    .optional()
    .map(|v| v.is_some())
}

/// Records that a student takes a subject. The table carries no uniqueness
/// constraint, so the pair check here is what keeps enrollment single.
/// Returns `None` when the student is already enrolled.
pub fn enroll(conn: &Connection, student_id: i64, subject_id: i64) -> rusqlite::Result<Option<i64>> {
    if is_enrolled(conn, student_id, subject_id)? {
        return Ok(None);
    }
    let id = next_id(conn, "student_subjects")?;
    conn.execute(
        "INSERT INTO student_subjects(id, student_id, subject_id) VALUES(?, ?, ?)",
        (id, student_id, subject_id),
    )?;
    Ok(Some(id))
}

/// Removes the enrollment and the pair's attendance history in one
/// transaction.
pub fn unenroll(conn: &Connection, student_id: i64, subject_id: i64) -> rusqlite::Result<bool> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM attendance WHERE student_id = ? AND subject_id = ?",
        (student_id, subject_id),
    )?;
    let n = tx.execute(
        "DELETE FROM student_subjects WHERE student_id = ? AND subject_id = ?",
        (student_id, subject_id),
    )?;
    if n == 0 {
        return Ok(false);
    }
    tx.commit()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::students;

    fn seeded_conn() -> (Connection, i64) {
        let conn = Connection::open_in_memory().expect("open");
        db::apply_schema(&conn);
        conn.execute(
            "INSERT INTO users(id, username, password, role, name) VALUES(2, 'f', 'x', 'faculty', 'F')",
            [],
        )
        .expect("user");
        conn.execute(
            "INSERT INTO faculty(id, name, department, user_id) VALUES(1, 'F', 'CS', 2)",
            [],
        )
        .expect("faculty");
        conn.execute(
            "INSERT INTO subjects(id, name, code, faculty_id, semester, department)
             VALUES(1, 'Algo', 'CS301', 1, '', '')",
            [],
        )
        .expect("subject");
        let st = students::create(&conn, "Asha", "R1", "CS", "pw")
            .expect("create")
            .expect("ids");
        (conn, st.student_id)
    }

    #[test]
    fn second_enroll_of_same_pair_is_refused() {
        let (conn, student_id) = seeded_conn();
        assert!(enroll(&conn, student_id, 1).expect("enroll").is_some());
        assert!(enroll(&conn, student_id, 1).expect("enroll").is_none());
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM student_subjects", [], |r| r.get(0))
            .expect("count");
        assert_eq!(n, 1);
    }

    #[test]
    fn unenroll_drops_attendance_for_the_pair_only() {
        let (conn, student_id) = seeded_conn();
        enroll(&conn, student_id, 1).expect("enroll");
        conn.execute(
            "INSERT INTO subjects(id, name, code, faculty_id, semester, department)
             VALUES(2, 'DBMS', 'CS302', 1, '', '')",
            [],
        )
        .expect("subject 2");
        enroll(&conn, student_id, 2).expect("enroll 2");
        conn.execute(
            "INSERT INTO attendance(id, student_id, subject_id, date, present)
             VALUES(1, ?, 1, '2024-03-01', 1)",
            [student_id],
        )
        .expect("attendance 1");
        conn.execute(
            "INSERT INTO attendance(id, student_id, subject_id, date, present)
             VALUES(2, ?, 2, '2024-03-01', 1)",
            [student_id],
        )
        .expect("attendance 2");

        assert!(unenroll(&conn, student_id, 1).expect("unenroll"));
        let left: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM attendance WHERE student_id = ?",
                [student_id],
                |r| r.get(0),
            )
            .expect("count");
        assert_eq!(left, 1);
        assert!(!is_enrolled(&conn, student_id, 1).expect("q"));
        assert!(is_enrolled(&conn, student_id, 2).expect("q"));
    }

    #[test]
    fn unenroll_of_absent_pair_is_false() {
        let (conn, student_id) = seeded_conn();
        assert!(!unenroll(&conn, student_id, 1).expect("unenroll"));
    }
}
