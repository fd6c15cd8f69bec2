//! Bounded pool of read-only SQLite connections.
//!
//! Connections are opened lazily up to the permit count and parked on an
//! idle list between requests. Statements run on the blocking thread pool
//! with a progress-handler deadline, so a runaway query aborts with
//! SQLITE_INTERRUPT instead of pinning a worker.

use arealis_query::QueryError;
use rusqlite::{Connection, OpenFlags};
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};

#[derive(Debug)]
pub struct PoolError(pub String);

impl Display for PoolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PoolError {}

pub struct ReadPool {
    db_path: String,
    permits: Semaphore,
    idle: Mutex<Vec<Connection>>,
}

impl ReadPool {
    #[must_use]
    pub fn new(db_path: impl Into<String>, size: usize) -> Self {
        Self {
            db_path: db_path.into(),
            permits: Semaphore::new(size.max(1)),
            idle: Mutex::new(Vec::new()),
        }
    }

    fn open_connection(path: &str) -> Result<Connection, PoolError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
                | OpenFlags::SQLITE_OPEN_URI,
        )
        .map_err(|e| PoolError(format!("open {path}: {e}")))?;
        conn.execute_batch("PRAGMA query_only=ON; PRAGMA temp_store=MEMORY;")
            .map_err(|e| PoolError(e.to_string()))?;
        conn.set_prepared_statement_cache_capacity(64);
        Ok(conn)
    }

    /// Checks out a connection, runs `f` on the blocking pool with the given
    /// statement deadline, and parks the connection again.
    pub async fn run<T, F>(&self, sql_timeout: Duration, f: F) -> Result<T, PoolError>
    where
        F: FnOnce(&Connection) -> Result<T, QueryError> + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| PoolError(e.to_string()))?;

        let parked = self.idle.lock().await.pop();
        let conn = match parked {
            Some(conn) => conn,
            None => {
                let path = self.db_path.clone();
                tokio::task::spawn_blocking(move || Self::open_connection(&path))
                    .await
                    .map_err(|e| PoolError(e.to_string()))??
            }
        };

        let deadline = Instant::now() + sql_timeout;
        let (conn, out) = tokio::task::spawn_blocking(move || {
            conn.progress_handler(1_000, Some(move || Instant::now() > deadline));
            let out = f(&conn);
            conn.progress_handler(1_000, None::<fn() -> bool>);
            (conn, out)
        })
        .await
        .map_err(|e| PoolError(e.to_string()))?;

        self.idle.lock().await.push(conn);
        out.map_err(|e| PoolError(e.to_string()))
    }
}
