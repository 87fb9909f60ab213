//! Store handle management with pragma configuration and transparent reopen.
//!
//! The host may evict an idle connection at any point between two calls, so
//! the handle is never cached unconditionally: every operation goes through
//! [`VfsDb::call`], which reopens the database once and retries when the
//! connection turns out to be closed.

use super::migrations;
use crate::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_rusqlite::{Connection, rusqlite};
use url::Url;

/// Persistent store handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations on a
/// background thread, together with the path and key-normalization base the
/// store was opened with.
#[derive(Clone, Debug)]
pub struct VfsDb {
    path: Option<PathBuf>,
    base: Url,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl VfsDb {
    /// Open a store at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations. `base` is the fixed base URL that
    /// every key is resolved against.
    pub async fn open(path: impl AsRef<Path>, base: Url) -> Result<Self, Error> {
        let db = Self { path: Some(path.as_ref().to_path_buf()), base, conn: Arc::default() };
        db.connection().await?;
        Ok(db)
    }

    /// Open an in-memory store for testing.
    pub async fn open_in_memory(base: Url) -> Result<Self, Error> {
        let db = Self { path: None, base, conn: Arc::default() };
        db.connection().await?;
        Ok(db)
    }

    /// Resolve a possibly relative name against the store's base URL.
    ///
    /// This is the only key shape used anywhere in the system; `get_file`,
    /// `put_file`, and `delete_file` all normalize internally.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if the input cannot be resolved.
    pub fn normalize(&self, name_or_url: &str) -> Result<String, Error> {
        let url = self.base.join(name_or_url).map_err(|e| Error::InvalidUrl(format!("{name_or_url}: {e}")))?;
        Ok(url.into())
    }

    /// The base URL keys are resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Run a closure against the live connection, reopening once if the host
    /// closed it since the last call.
    pub async fn call<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<T, Error> + Clone + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection().await?;
        match conn.call(f.clone()).await {
            Err(tokio_rusqlite::Error::ConnectionClosed) => {
                tracing::debug!("store connection closed by host, reopening");
                self.invalidate().await;
                let conn = self.connection().await?;
                conn.call(f).await.map_err(Error::from)
            }
            other => other.map_err(Error::from),
        }
    }

    /// Drop the cached handle so the next call reopens the database, as
    /// happens when the host evicts an idle connection.
    pub async fn invalidate(&self) {
        *self.conn.lock().await = None;
    }

    async fn connection(&self) -> Result<Connection, Error> {
        let mut guard = self.conn.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }
        let conn = match &self.path {
            Some(path) => Connection::open(path).await.map_err(|e| Error::Store(e.into()))?,
            None => Connection::open_in_memory().await.map_err(|e| Error::Store(e.into()))?,
        };

        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA temp_store=MEMORY;
                 PRAGMA foreign_keys=ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(Error::Store)?;

        migrations::run(&conn).await?;

        *guard = Some(conn.clone());
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://cdn.local/").unwrap()
    }

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = VfsDb::open_in_memory(base()).await.unwrap();
        let version = db
            .call(|conn| {
                conn.query_row("SELECT sqlite_version()", [], |row| row.get::<_, String>(0))
                    .map_err(Error::from)
            })
            .await
            .unwrap();
        assert!(!version.is_empty());
    }

    #[tokio::test]
    async fn test_normalize_relative() {
        let db = VfsDb::open_in_memory(base()).await.unwrap();
        assert_eq!(db.normalize("app.js").unwrap(), "https://cdn.local/app.js");
        assert_eq!(db.normalize("/deep/mod.js").unwrap(), "https://cdn.local/deep/mod.js");
    }

    #[tokio::test]
    async fn test_normalize_absolute_passthrough() {
        let db = VfsDb::open_in_memory(base()).await.unwrap();
        assert_eq!(db.normalize("https://other.example/x.js").unwrap(), "https://other.example/x.js");
    }

    #[tokio::test]
    async fn test_reopen_after_invalidate() {
        let dir = tempfile::tempdir().unwrap();
        let db = VfsDb::open(dir.path().join("vfs.sqlite"), base()).await.unwrap();
        db.put_file(&crate::VFile {
            url: "a.js".to_string(),
            content: b"x=1".to_vec(),
            content_type: None,
            last_modified: None,
        })
        .await
        .unwrap();

        db.invalidate().await;

        let file = db.get_file("a.js").await.unwrap().unwrap();
        assert_eq!(file.content, b"x=1");
    }
}
