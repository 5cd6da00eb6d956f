use rusqlite::OptionalExtension;
use std::path::Path;

/// SQLite storage for the persisted counter.
#[derive(Debug)]
pub struct Database {
    conn: rusqlite::Connection,
}

impl Database {
    pub fn open_file(path: &Path) -> anyhow::Result<Self> {
        let conn = rusqlite::Connection::open(path)?;
        Self::init_from_connection(conn)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        log::warn!("using in-memory database");
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::init_from_connection(conn)
    }

    fn init_from_connection(conn: rusqlite::Connection) -> anyhow::Result<Self> {
        // single row, pinned to id 0
        conn.execute(
            "CREATE TABLE IF NOT EXISTS counter (
                id INTEGER PRIMARY KEY CHECK (id = 0),
                count INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(Self { conn })
    }

    /// Returns the stored count, or `None` if nothing has been stored yet.
    pub fn load_count(&self) -> anyhow::Result<Option<i32>> {
        let count = self
            .conn
            .query_row("SELECT count FROM counter WHERE id = 0", [], |row| {
                row.get::<_, i32>(0)
            })
            .optional()?;
        Ok(count)
    }

    pub fn store_count(&self, count: i32) -> anyhow::Result<()> {
        self.conn.execute(
            "INSERT INTO counter (id, count) VALUES (0, ?1)
                ON CONFLICT(id) DO UPDATE SET count = excluded.count",
            [count],
        )?;
        Ok(())
    }
}
