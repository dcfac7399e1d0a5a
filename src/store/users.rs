use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

use super::{next_id, normalize_username};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub name: String,
}

fn from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        password: row.get("password")?,
        role: row.get("role")?,
        name: row.get("name")?,
    })
}

/// Credential check against the stored plaintext password. Callers normalize
/// the entered username before calling.
pub fn validate(conn: &Connection, username: &str, password: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, username, password, role, name FROM users
         WHERE username = ? AND password = ?",
        (username, password),
        from_row,
    )
    .optional()
}

pub fn get_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, username, password, role, name FROM users WHERE id = ?",
        [id],
        from_row,
    )
    .optional()
}

pub fn username_exists(conn: &Connection, username: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT 1 FROM users WHERE username = ?",
        [username],
        |r| r.get::<_, i64>(0),
    )
    .optional()
    .map(|v| v.is_some())
}

/// Inserts a user row with a normalized username. Returns `None` when the
/// username is already taken.
pub fn add(
    conn: &Connection,
    username: &str,
    password: &str,
    role: &str,
    name: &str,
) -> rusqlite::Result<Option<i64>> {
    let username = normalize_username(username);
    if username_exists(conn, &username)? {
        return Ok(None);
    }
    let id = next_id(conn, "users")?;
    conn.execute(
        "INSERT INTO users(id, username, password, role, name) VALUES(?, ?, ?, ?, ?)",
        (id, &username, password, role, name),
    )?;
    Ok(Some(id))
}

pub fn change_password(conn: &Connection, id: i64, new_password: &str) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "UPDATE users SET password = ? WHERE id = ?",
        (new_password, id),
    )?;
    Ok(n > 0)
}
