//! SQLite user registry used for `/users` and `/broadcast`.

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Result};

use crate::error::AppResult;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// A user who has talked to the bot at least once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Telegram user ID
    pub id: i64,
    pub joined_at: DateTime<Utc>,
}

/// Create a new database connection pool
///
/// Initializes a pool of up to 10 connections and creates the `users` table
/// if it does not exist yet.
///
/// # Example
///
/// ```no_run
/// use linkercore::users;
///
/// let pool = users::create_pool("users.sqlite")?;
/// # Ok::<(), linkercore::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder().max_size(10).build(manager)?;

    let conn = pool.get()?;
    create_schema(&conn)?;

    Ok(pool)
}

/// Get a connection from the pool. It returns to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

fn create_schema(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            joined_at INTEGER NOT NULL
        );",
    )
}

/// Registers a user. Adding a known user is a no-op and keeps the original join time.
///
/// Returns `true` if the user was new.
pub fn add_user(conn: &DbConnection, id: i64) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (id, joined_at) VALUES (?1, ?2)",
        params![id, Utc::now().timestamp()],
    )?;
    if inserted > 0 {
        log::info!("👤 User {} added to the database", id);
    }
    Ok(inserted > 0)
}

pub fn get_user(conn: &DbConnection, id: i64) -> Result<Option<User>> {
    conn.query_row("SELECT id, joined_at FROM users WHERE id = ?1", params![id], |row| {
        let joined_at: i64 = row.get(1)?;
        Ok(User {
            id: row.get(0)?,
            joined_at: DateTime::<Utc>::from_timestamp(joined_at, 0).unwrap_or_default(),
        })
    })
    .optional()
}

/// All user IDs in join order.
pub fn get_all_users(conn: &DbConnection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM users ORDER BY joined_at, id")?;
    let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
    rows.collect()
}

pub fn count_users(conn: &DbConnection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
}
