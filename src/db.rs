use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A connection older than this is thrown away and reopened.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(60 * 60);
/// Minimum spacing between `SELECT 1` liveness probes.
pub const VALIDATION_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub const DB_FILE: &str = "attendance.sqlite3";

/// Schema and seed data, executed statement-by-statement on open. A statement
/// that fails is logged and skipped so a partially newer database still loads.
const BOOTSTRAP_SQL: &str = "
CREATE TABLE IF NOT EXISTS users(
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT NOT NULL,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS students(
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    roll_no TEXT NOT NULL,
    course TEXT NOT NULL,
    user_id INTEGER NOT NULL,
    FOREIGN KEY(user_id) REFERENCES users(id)
);
CREATE TABLE IF NOT EXISTS faculty(
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    department TEXT NOT NULL,
    user_id INTEGER NOT NULL,
    FOREIGN KEY(user_id) REFERENCES users(id)
);
CREATE TABLE IF NOT EXISTS subjects(
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    code TEXT NOT NULL,
    faculty_id INTEGER NOT NULL,
    semester TEXT DEFAULT '',
    department TEXT DEFAULT '',
    FOREIGN KEY(faculty_id) REFERENCES faculty(id)
);
CREATE TABLE IF NOT EXISTS student_subjects(
    id INTEGER PRIMARY KEY,
    student_id INTEGER NOT NULL,
    subject_id INTEGER NOT NULL,
    FOREIGN KEY(student_id) REFERENCES students(id),
    FOREIGN KEY(subject_id) REFERENCES subjects(id)
);
CREATE TABLE IF NOT EXISTS attendance(
    id INTEGER PRIMARY KEY,
    student_id INTEGER NOT NULL,
    subject_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    present INTEGER NOT NULL,
    FOREIGN KEY(student_id) REFERENCES students(id),
    FOREIGN KEY(subject_id) REFERENCES subjects(id)
);
CREATE INDEX IF NOT EXISTS idx_students_user ON students(user_id);
CREATE INDEX IF NOT EXISTS idx_faculty_user ON faculty(user_id);
CREATE INDEX IF NOT EXISTS idx_subjects_faculty ON subjects(faculty_id);
CREATE INDEX IF NOT EXISTS idx_student_subjects_student ON student_subjects(student_id);
CREATE INDEX IF NOT EXISTS idx_student_subjects_subject ON student_subjects(subject_id);
CREATE INDEX IF NOT EXISTS idx_attendance_student_subject ON attendance(student_id, subject_id);
CREATE INDEX IF NOT EXISTS idx_attendance_subject_date ON attendance(subject_id, date);
INSERT OR IGNORE INTO users(id, username, password, role, name)
    VALUES(1, 'admin', 'admin123', 'admin', 'Administrator');
";

/// Owns the single shared database handle for the workspace. The handle is
/// opened lazily, probed with `SELECT 1` at most once per
/// [`VALIDATION_INTERVAL`], and reopened after [`CONNECTION_TIMEOUT`] or a
/// failed probe. The mutex also serializes every database operation: no two
/// callers touch the connection at once.
pub struct DbProvider {
    db_path: PathBuf,
    slot: Mutex<Slot>,
}

struct Slot {
    conn: Option<Connection>,
    opened_at: Instant,
    validated_at: Instant,
}

impl DbProvider {
    /// Opens (or creates) the workspace database and runs the bootstrap
    /// script. Fails only if the file cannot be opened at all.
    pub fn open(workspace: &Path) -> anyhow::Result<DbProvider> {
        std::fs::create_dir_all(workspace)?;
        let db_path = workspace.join(DB_FILE);
        let conn = open_conn(&db_path)?;
        let now = Instant::now();
        Ok(DbProvider {
            db_path,
            slot: Mutex::new(Slot {
                conn: Some(conn),
                opened_at: now,
                validated_at: now,
            }),
        })
    }

    /// Runs `f` against a live connection, recreating the handle first if it
    /// has aged out or fails its liveness probe.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("connection lock poisoned"))?;
        self.ensure_live(&mut slot)?;
        let conn = slot
            .conn
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no database connection"))?;
        f(conn)
    }

    /// Drops the current handle. The next `with_conn` call reopens.
    pub fn close(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.conn = None;
        }
    }

    fn ensure_live(&self, slot: &mut Slot) -> anyhow::Result<()> {
        let now = Instant::now();
        if let Some(conn) = slot.conn.as_ref() {
            if now.duration_since(slot.opened_at) > CONNECTION_TIMEOUT {
                eprintln!("attendanced: connection too old, reopening");
                slot.conn = None;
            } else if now.duration_since(slot.validated_at) > VALIDATION_INTERVAL {
                match conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0)) {
                    Ok(_) => slot.validated_at = now,
                    Err(e) => {
                        eprintln!("attendanced: connection probe failed: {}", e);
                        slot.conn = None;
                    }
                }
            }
        }
        if slot.conn.is_none() {
            let conn = open_conn(&self.db_path)?;
            slot.conn = Some(conn);
            slot.opened_at = now;
            slot.validated_at = now;
        }
        Ok(())
    }
}

fn open_conn(db_path: &Path) -> anyhow::Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    apply_schema(&conn);
    Ok(conn)
}

/// Applies the bootstrap script to an already-open connection.
pub fn apply_schema(conn: &Connection) {
    run_bootstrap_script(conn, BOOTSTRAP_SQL);
}

/// Executes a `;`-separated script one statement at a time. A failing
/// statement is logged and skipped rather than aborting the whole load.
pub fn run_bootstrap_script(conn: &Connection, script: &str) {
    for stmt in script.split(';') {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        if let Err(e) = conn.execute(stmt, []) {
            eprintln!("attendanced: bootstrap statement skipped: {}", e);
        }
    }
}

pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
