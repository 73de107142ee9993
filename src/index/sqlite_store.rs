//! SQLite implementation of PhotoIndex

use crate::error::{Result, StoreError};
use crate::index::{PhotoFilter, PhotoIndex, PhotoKey, PhotoRecord, StoredPhoto};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use log::info;

pub struct SqlitePhotoIndex {
    conn: Mutex<Connection>,
}

impl SqlitePhotoIndex {
    /// Open (or create) the index at `db_path`
    pub fn open(db_path: impl AsRef<Path>, wal_mode: bool) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::from_io(&parent.display().to_string(), e))?;
            }
        }
        let conn = Connection::open(db_path)?;
        if wal_mode {
            // journal_mode returns the resulting mode as a row
            conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get::<_, String>(0))?;
        }
        info!("Opened photo index at {} (wal_mode: {})", db_path.display(), wal_mode);
        Self::from_connection(conn)
    }

    /// Index held entirely in memory
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS photos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                url TEXT NOT NULL,
                user TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

fn row_to_photo(row: &Row<'_>) -> rusqlite::Result<StoredPhoto> {
    Ok(StoredPhoto {
        key: row.get(0)?,
        record: PhotoRecord {
            name: row.get(1)?,
            url: row.get(2)?,
            user: row.get(3)?,
            timestamp: row.get(4)?,
        },
    })
}

fn filter_value(filter: &PhotoFilter) -> Value {
    match filter {
        PhotoFilter::Name(v) | PhotoFilter::Url(v) | PhotoFilter::User(v) => Value::Text(v.clone()),
        PhotoFilter::Timestamp(ts) => Value::Integer(*ts),
    }
}

/// SELECT with one `column = ?n` clause per filter, joined by AND
fn select_sql(filters: &[PhotoFilter]) -> String {
    let mut sql = String::from("SELECT id, name, url, user, timestamp FROM photos");
    if !filters.is_empty() {
        let clauses: Vec<String> = filters
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{} = ?{}", f.field(), i + 1))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY id");
    sql
}

impl PhotoIndex for SqlitePhotoIndex {
    fn add(&self, record: &PhotoRecord) -> Result<PhotoKey> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO photos (name, url, user, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![record.name, record.url, record.user, record.timestamp],
        )?;
        let key = conn.last_insert_rowid();
        info!("Added photo {} with data: {:?}", key, record);
        Ok(key)
    }

    fn fetch(&self, filters: &[PhotoFilter]) -> Result<Vec<StoredPhoto>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&select_sql(filters))?;
        let values: Vec<Value> = filters.iter().map(filter_value).collect();
        let rows = stmt.query_map(params_from_iter(values.iter()), row_to_photo)?;

        let mut photos = Vec::new();
        for row in rows {
            photos.push(row?);
        }
        info!("Fetched {} entries for filters {:?}", photos.len(), filters);
        Ok(photos)
    }

    fn list(&self) -> Result<Vec<StoredPhoto>> {
        let photos = self.fetch(&[])?;
        for photo in &photos {
            info!("{:?}", photo);
        }
        Ok(photos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_select_sql() {
        assert_eq!(select_sql(&[]), "SELECT id, name, url, user, timestamp FROM photos ORDER BY id");
        let filters = vec![PhotoFilter::User("alice".into()), PhotoFilter::Timestamp(5)];
        assert_eq!(
            select_sql(&filters),
            "SELECT id, name, url, user, timestamp FROM photos WHERE user = ?1 AND timestamp = ?2 ORDER BY id"
        );
    }

    #[test]
    fn test_sqlite_photo_index_basic_operations() {
        let index = SqlitePhotoIndex::in_memory().unwrap();
        let alice = PhotoRecord::new("a.jpg", "example.com/a.jpg", "alice").with_timestamp(100);
        let bob = PhotoRecord::new("b.jpg", "example.com/b.jpg", "bob").with_timestamp(200);

        let alice_key = index.add(&alice).unwrap();
        let bob_key = index.add(&bob).unwrap();
        assert_ne!(alice_key, bob_key);

        let found = index.fetch(&[PhotoFilter::User("alice".into())]).unwrap();
        assert_eq!(found, vec![StoredPhoto { key: alice_key, record: alice.clone() }]);

        let found = index.fetch(&[PhotoFilter::Timestamp(200)]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record.user, "bob");

        assert_eq!(index.list().unwrap().len(), 2);
    }

    #[test]
    fn test_filters_are_anded() {
        let index = SqlitePhotoIndex::in_memory().unwrap();
        index.add(&PhotoRecord::new("a.jpg", "u1", "alice").with_timestamp(1)).unwrap();
        index.add(&PhotoRecord::new("a.jpg", "u2", "bob").with_timestamp(1)).unwrap();

        let filters = vec![PhotoFilter::Name("a.jpg".into()), PhotoFilter::User("bob".into())];
        let found = index.fetch(&filters).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record.url, "u2");

        let none = index.fetch(&[PhotoFilter::User("carol".into())]).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_no_uniqueness_on_name() {
        let index = SqlitePhotoIndex::in_memory().unwrap();
        let record = PhotoRecord::new("same.jpg", "u", "alice");
        index.add(&record).unwrap();
        index.add(&record).unwrap();
        assert_eq!(index.fetch(&[PhotoFilter::Name("same.jpg".into())]).unwrap().len(), 2);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("photos.db");
        {
            let index = SqlitePhotoIndex::open(&path, true).unwrap();
            index.add(&PhotoRecord::new("a.jpg", "u", "alice")).unwrap();
        }
        let index = SqlitePhotoIndex::open(&path, false).unwrap();
        assert_eq!(index.list().unwrap().len(), 1);
    }
}
