use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::parser::Record;

pub fn connect(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS professors (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            title    TEXT,
            name     TEXT,
            research TEXT
        );
        ",
    )?;
    Ok(())
}

// ── Scraping ──

/// Insert one page worth of records in order and commit once.
pub fn insert_records(conn: &Connection, records: &[Record]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt =
            tx.prepare("INSERT INTO professors (title, name, research) VALUES (?1, ?2, ?3)")?;
        for r in records {
            count += stmt.execute(rusqlite::params![r.title, r.name, r.research])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

// ── Overview ──

pub struct StoredRecord {
    pub id: i64,
    pub title: String,
    pub name: String,
    pub research: String,
}

/// Stored rows in insertion order, optionally only one title.
pub fn fetch_overview(
    conn: &Connection,
    title: Option<&str>,
    limit: usize,
) -> Result<Vec<StoredRecord>> {
    const COLUMNS: &str = "SELECT id, COALESCE(title,''), COALESCE(name,''), COALESCE(research,'')
         FROM professors";
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let rows = match title {
        Some(t) => conn
            .prepare(&format!("{COLUMNS} WHERE title = ?1 ORDER BY id LIMIT ?2"))?
            .query_map(rusqlite::params![t, limit], stored_record)?
            .collect::<Result<Vec<_>, _>>()?,
        None => conn
            .prepare(&format!("{COLUMNS} ORDER BY id LIMIT ?1"))?
            .query_map(rusqlite::params![limit], stored_record)?
            .collect::<Result<Vec<_>, _>>()?,
    };
    Ok(rows)
}

fn stored_record(row: &rusqlite::Row) -> rusqlite::Result<StoredRecord> {
    Ok(StoredRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        name: row.get(2)?,
        research: row.get(3)?,
    })
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub by_title: Vec<(String, usize)>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM professors", [], |r| r.get(0))?;
    let mut stmt = conn.prepare(
        "SELECT COALESCE(title,''), COUNT(*) AS n
         FROM professors
         GROUP BY title
         ORDER BY n DESC, title",
    )?;
    let by_title = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Stats { total, by_title })
}

// ── Tests ──
