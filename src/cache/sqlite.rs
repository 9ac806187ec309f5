//! SQLite-backed cache store
//!
//! One writer connection and a few read-only connections on the same WAL
//! database. Reads never wait for the writer and only wait for each other
//! when every reader is busy.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::error::CacheError;

const READER_CONNECTIONS: usize = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

type Slot = Mutex<Option<Connection>>;

pub struct SqliteStore {
    writer: Slot,
    /// Empty for in-memory databases, which the writer then also reads from
    readers: Vec<Slot>,
    next_reader: AtomicUsize,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self, CacheError> {
        info!("Initializing cache database at {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            // Connection::open reports a missing directory as an opaque CANTOPEN
            std::fs::create_dir_all(parent)?;
        }

        let writer = Connection::open(db_path)?;

        // Enable WAL mode so readers and the writer do not block each other
        writer.pragma_update(None, "journal_mode", "WAL")?;
        writer.pragma_update(None, "synchronous", "NORMAL")?;
        writer.busy_timeout(BUSY_TIMEOUT)?;
        create_table(&writer)?;

        let readers = (0..READER_CONNECTIONS)
            .map(|_| open_reader(db_path).map(|conn| Mutex::new(Some(conn))))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Opened {} reader connections", readers.len());

        info!("Cache initialized successfully");
        Ok(Self {
            writer: Mutex::new(Some(writer)),
            readers,
            next_reader: AtomicUsize::new(0),
        })
    }

    /// A store that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        create_table(&conn)?;
        Ok(Self {
            writer: Mutex::new(Some(conn)),
            readers: Vec::new(),
            next_reader: AtomicUsize::new(0),
        })
    }

    fn lock_writer(&self) -> Result<MutexGuard<'_, Option<Connection>>, CacheError> {
        self.writer.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// First idle reader, starting from a rotating index; waits on that
    /// index only when all readers are busy
    fn lock_reader(&self) -> Result<MutexGuard<'_, Option<Connection>>, CacheError> {
        let count = self.readers.len();
        let start = self.next_reader.fetch_add(1, Ordering::Relaxed);
        for i in 0..count {
            match self.readers[(start + i) % count].try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::WouldBlock) => continue,
                Err(TryLockError::Poisoned(_)) => return Err(CacheError::LockPoisoned),
            }
        }
        self.readers[start % count]
            .lock()
            .map_err(|_| CacheError::LockPoisoned)
    }

    fn with_writer<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, CacheError>,
    ) -> Result<T, CacheError> {
        let guard = self.lock_writer()?;
        let conn = guard.as_ref().ok_or(CacheError::Closed)?;
        f(conn)
    }

    fn with_reader<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, CacheError>,
    ) -> Result<T, CacheError> {
        if self.readers.is_empty() {
            return self.with_writer(f);
        }
        let guard = self.lock_reader()?;
        let conn = guard.as_ref().ok_or(CacheError::Closed)?;
        f(conn)
    }
}

fn create_table(conn: &Connection) -> Result<(), CacheError> {
    debug!("Database connection established");
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS query_cache (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
        [],
    )?;
    Ok(())
}

fn open_reader(db_path: &Path) -> Result<Connection, CacheError> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

fn close_slot(slot: &Slot) -> Result<(), CacheError> {
    let mut guard = slot.lock().map_err(|_| CacheError::LockPoisoned)?;
    if let Some(conn) = guard.take() {
        conn.close().map_err(|(_, e)| CacheError::Database(e))?;
    }
    Ok(())
}

impl CacheStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.with_reader(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM query_cache WHERE key = ?1",
                    [key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    fn save(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.with_writer(|conn| {
            conn.execute(
                r#"
                INSERT INTO query_cache (key, value) VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
                (key, value),
            )?;
            Ok(())
        })
    }

    fn flush(&self) -> Result<(), CacheError> {
        self.with_writer(|conn| {
            conn.pragma(None, "wal_checkpoint", "PASSIVE", |_| Ok(()))?;
            Ok(())
        })
    }

    /// Readers go first so the writer, as the last connection, checkpoints the WAL
    fn close(&self) -> Result<(), CacheError> {
        for reader in &self.readers {
            close_slot(reader)?;
        }
        close_slot(&self.writer)?;
        debug!("Cache database closed");
        Ok(())
    }
}
