pub mod attendance;
pub mod enrollments;
pub mod faculty;
pub mod students;
pub mod subjects;
pub mod users;

use rusqlite::Connection;

/// Allocates the next integer id for `table` as `max(id) + 1` (1 when the
/// table is empty). This mirrors how the original stores assigned ids and is
/// not safe under concurrent writers; the single serialized connection is
/// what keeps it correct here.
pub(crate) fn next_id(conn: &Connection, table: &str) -> rusqlite::Result<i64> {
    let sql = format!("SELECT COALESCE(MAX(id), 0) + 1 FROM {}", table);
    conn.query_row(&sql, [], |r| r.get(0))
}

/// Canonical username form: lowercase with all whitespace removed. Student
/// usernames are derived from roll numbers this way, and every uniqueness
/// check compares against the stored, already-normalized value.
pub fn normalize_username(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect()
}
