//! Partition and entry operations.
//!
//! A partition is a row in `partitions`; its entries cascade away with it.
//! Writes use UPSERT so the last write for a key wins.

use super::connection::CacheDb;
use super::hash::RequestKey;
use crate::Error;
use crate::response::StoredResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Summary of one partition.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PartitionInfo {
    pub name: String,
    pub entries: u64,
    pub created_at: String,
}

const SELECT_ENTRY_COLUMNS: &str = "e.status, e.status_text, e.headers_json, e.body, e.stored_at";

fn row_to_response(row: &rusqlite::Row<'_>) -> rusqlite::Result<(u16, String, String, Vec<u8>, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn decode_response(
    (status, status_text, headers_json, body, stored_at): (u16, String, String, Vec<u8>, String),
) -> Result<StoredResponse, Error> {
    let headers: Vec<(String, String)> =
        serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(format!("headers: {e}")))?;
    let stored_at = DateTime::parse_from_rfc3339(&stored_at)
        .map_err(|e| Error::CorruptEntry(format!("stored_at: {e}")))?
        .with_timezone(&Utc);
    Ok(StoredResponse { status, status_text, headers, body, stored_at: Some(stored_at) })
}

fn upsert_entry(
    conn: &rusqlite::Connection, partition: &str, key: &RequestKey, response: &StoredResponse, stored_at: &str,
) -> Result<(), Error> {
    let headers_json =
        serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(format!("headers: {e}")))?;
    conn.execute(
        "INSERT INTO entries (partition, key_hash, method, url, status, status_text, headers_json, body, stored_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(partition, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            partition,
            &key.hash,
            &key.method,
            &key.url,
            response.status,
            &response.status_text,
            headers_json,
            &response.body,
            stored_at,
        ],
    )?;
    Ok(())
}

fn ensure_partition(conn: &rusqlite::Connection, name: &str, now: &str) -> Result<(), Error> {
    conn.execute("INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)", params![name, now])?;
    Ok(())
}

impl CacheDb {
    /// Create the partition if it does not exist yet.
    pub async fn open_partition(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> { ensure_partition(conn, &name, &now) })
            .await
            .map_err(Error::from)
    }

    pub async fn has_partition(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM partitions WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// All partition names in creation order.
    pub async fn partition_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM partitions ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Partitions with their entry counts, in creation order.
    pub async fn partition_info(&self) -> Result<Vec<PartitionInfo>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<PartitionInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT p.name, p.created_at, COUNT(e.key_hash)
                    FROM partitions p LEFT JOIN entries e ON e.partition = p.name
                    GROUP BY p.name ORDER BY p.rowid ASC",
                )?;
                let info = stmt
                    .query_map([], |row| {
                        Ok(PartitionInfo {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(info)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a partition and all of its entries.
    ///
    /// Returns false if the partition did not exist.
    pub async fn delete_partition(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM partitions WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a key in one partition.
    pub async fn get_entry(&self, partition: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        let partition = partition.to_string();
        let hash = key.hash.clone();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let sql =
                    format!("SELECT {SELECT_ENTRY_COLUMNS} FROM entries e WHERE e.partition = ?1 AND e.key_hash = ?2");
                let result = conn.query_row(&sql, params![partition, hash], row_to_response);

                match result {
                    Ok(raw) => decode_response(raw).map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a key across every partition, oldest partition first.
    pub async fn match_any(&self, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        let hash = key.hash.clone();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let sql = format!(
                    "SELECT {SELECT_ENTRY_COLUMNS} FROM entries e JOIN partitions p ON p.name = e.partition
                    WHERE e.key_hash = ?1 ORDER BY p.rowid ASC LIMIT 1"
                );
                let result = conn.query_row(&sql, params![hash], row_to_response);

                match result {
                    Ok(raw) => decode_response(raw).map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Store a response, creating the partition on first write.
    pub async fn put_entry(&self, partition: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
        self.put_entries(partition, vec![(key.clone(), response.clone())]).await
    }

    /// Store many responses in one transaction.
    ///
    /// Either every entry lands or none does.
    pub async fn put_entries(&self, partition: &str, entries: Vec<(RequestKey, StoredResponse)>) -> Result<(), Error> {
        let partition = partition.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_partition(&tx, &partition, &now)?;
                for (key, response) in &entries {
                    upsert_entry(&tx, &partition, key, response, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
