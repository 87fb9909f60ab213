//! File record CRUD operations.
//!
//! Plain overwrite semantics, no versioning. Atomicity is guaranteed per key,
//! never across keys.

use super::connection::VfsDb;
use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A persisted file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VFile {
    /// Store key; normalized to an absolute URL on every access.
    pub url: String,
    pub content: Vec<u8>,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl VfsDb {
    /// Insert or overwrite a file record.
    ///
    /// Uses UPSERT semantics: inserts if the key doesn't exist, replaces all
    /// fields if it does.
    pub async fn put_file(&self, file: &VFile) -> Result<(), Error> {
        let url = self.normalize(&file.url)?;
        let file = VFile { url, ..file.clone() };
        self.call(move |conn| -> Result<(), Error> {
            conn.execute(
                "INSERT INTO files (url, content, content_type, last_modified)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(url) DO UPDATE SET
                    content = excluded.content,
                    content_type = excluded.content_type,
                    last_modified = excluded.last_modified",
                params![
                    &file.url,
                    &file.content,
                    &file.content_type,
                    file.last_modified.map(|t| t.to_rfc3339()),
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// Get a file record by key.
    ///
    /// Returns None if the key doesn't exist in the store.
    pub async fn get_file(&self, name_or_url: &str) -> Result<Option<VFile>, Error> {
        let url = self.normalize(name_or_url)?;
        self.call(move |conn| -> Result<Option<VFile>, Error> {
            let mut stmt =
                conn.prepare("SELECT url, content, content_type, last_modified FROM files WHERE url = ?1")?;

            let result = stmt.query_row(params![url], |row| {
                Ok(VFile {
                    url: row.get(0)?,
                    content: row.get(1)?,
                    content_type: row.get(2)?,
                    last_modified: row
                        .get::<_, Option<String>>(3)?
                        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                        .map(|t| t.with_timezone(&Utc)),
                })
            });

            match result {
                Ok(f) => Ok(Some(f)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    /// Delete a file record by key.
    ///
    /// Returns true if a record was removed.
    pub async fn delete_file(&self, name_or_url: &str) -> Result<bool, Error> {
        let url = self.normalize(name_or_url)?;
        self.call(move |conn| -> Result<bool, Error> {
            let deleted = conn.execute("DELETE FROM files WHERE url = ?1", params![url])?;
            Ok(deleted > 0)
        })
        .await
    }
}
