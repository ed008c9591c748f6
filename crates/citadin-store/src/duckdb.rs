//! `DuckDB` connection pooling.
//!
//! One database instance is opened per store; further connections are
//! cloned from it so every connection sees the same catalog. Idle
//! connections are kept per access mode.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ::duckdb::Connection;

/// Access mode for database connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Listing queries only.
    ReadOnly,
    /// Schema setup and inserts.
    ReadWrite,
}

struct IdleConnections {
    read_only: Vec<Connection>,
    read_write: Vec<Connection>,
}

impl IdleConnections {
    fn stack(&mut self, mode: AccessMode) -> &mut Vec<Connection> {
        match mode {
            AccessMode::ReadOnly => &mut self.read_only,
            AccessMode::ReadWrite => &mut self.read_write,
        }
    }
}

struct PoolInner {
    db_path: PathBuf,
    max_idle: usize,
    root: Mutex<Connection>,
    idle: Mutex<IdleConnections>,
}

impl PoolInner {
    fn idle(&self) -> MutexGuard<'_, IdleConnections> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pool of `DuckDB` connections to one database file.
#[derive(Clone)]
pub struct DuckDbConnectionManager {
    inner: Arc<PoolInner>,
}

impl DuckDbConnectionManager {
    /// Open the database at `path`, keeping at most `max_idle` idle
    /// connections per access mode.
    pub fn open(path: impl Into<PathBuf>, max_idle: usize) -> Result<Self, ::duckdb::Error> {
        let db_path = path.into();
        let root = Connection::open(&db_path)?;
        root.execute_batch("PRAGMA disable_progress_bar;")?;

        Ok(Self {
            inner: Arc::new(PoolInner {
                db_path,
                max_idle: max_idle.max(1),
                root: Mutex::new(root),
                idle: Mutex::new(IdleConnections {
                    read_only: Vec::new(),
                    read_write: Vec::new(),
                }),
            }),
        })
    }

    /// Take an idle connection for `mode`, or clone a new one.
    pub fn acquire(&self, mode: AccessMode) -> Result<PooledConnection, ::duckdb::Error> {
        let reused = self.inner.idle().stack(mode).pop();
        let connection = match reused {
            Some(connection) => connection,
            None => {
                let root = self
                    .inner
                    .root
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                root.try_clone()?
            }
        };

        Ok(PooledConnection {
            mode,
            pool: Arc::clone(&self.inner),
            connection: Some(connection),
        })
    }

    pub fn db_path(&self) -> &Path {
        self.inner.db_path.as_path()
    }
}

/// A connection handed back to its pool on drop.
pub struct PooledConnection {
    mode: AccessMode,
    pool: Arc<PoolInner>,
    connection: Option<Connection>,
}

impl PooledConnection {
    pub const fn mode(&self) -> AccessMode {
        self.mode
    }
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("pooled connection is present until drop")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("pooled connection is present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        let mut idle = self.pool.idle();
        let stack = idle.stack(self.mode);
        if stack.len() < self.pool.max_idle {
            stack.push(connection);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn connections_share_one_catalog_and_are_reused() {
        let temp = tempdir().expect("tempdir");
        let manager =
            DuckDbConnectionManager::open(temp.path().join("pool.duckdb"), 1).expect("open");

        {
            let writer = manager.acquire(AccessMode::ReadWrite).expect("writer");
            writer
                .execute_batch("CREATE TABLE shared_catalog (id INTEGER); INSERT INTO shared_catalog VALUES (1);")
                .expect("create");
        }

        let reader = manager.acquire(AccessMode::ReadOnly).expect("reader");
        assert_eq!(reader.mode(), AccessMode::ReadOnly);
        let count: i64 = reader
            .query_row("SELECT COUNT(*) FROM shared_catalog", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);
        drop(reader);

        assert_eq!(manager.inner.idle().read_only.len(), 1);
        assert_eq!(manager.inner.idle().read_write.len(), 1);
    }
}
