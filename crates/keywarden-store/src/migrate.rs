// ABOUTME: Ordered, idempotent schema migrations tracked through PRAGMA user_version.
// ABOUTME: Steps replay the schema's additive evolution so legacy databases upgrade in place.

use keywarden_core::UNCATEGORIZED;
use rusqlite::Connection;

use crate::error::StoreError;

type Step = fn(&Connection) -> Result<(), rusqlite::Error>;

/// Every schema change, oldest first. Steps are individually idempotent
/// so replaying an already-applied step is a no-op.
const MIGRATIONS: &[Step] = &[
    base_tables,
    key_order_prices_channel,
    category_costs_and_english,
    category_spanish,
    channel_registry,
    seed_sentinel_and_channels,
];

/// Bring the database schema up to date. Returns the number of steps
/// applied this run.
pub fn migrate(conn: &Connection) -> Result<usize, StoreError> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    let start = version.max(0) as usize;

    for (index, step) in MIGRATIONS.iter().enumerate().skip(start) {
        step(conn)?;
        conn.pragma_update(None, "user_version", (index + 1) as i64)?;
        tracing::debug!(step = index + 1, "applied schema migration");
    }

    Ok(MIGRATIONS.len().saturating_sub(start))
}

fn base_tables(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS keys (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            key TEXT NOT NULL UNIQUE,
            category TEXT NOT NULL DEFAULT '{UNCATEGORIZED}',
            sold INTEGER NOT NULL DEFAULT 0,
            buyer TEXT,
            sold_at TEXT
        );

        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            instructions_pt TEXT NOT NULL DEFAULT '',
            document_pt TEXT NOT NULL DEFAULT '',
            license_pt TEXT NOT NULL DEFAULT '',
            language_pt TEXT NOT NULL DEFAULT '',
            delivery_pt TEXT NOT NULL DEFAULT ''
        );"
    ))
}

fn key_order_prices_channel(conn: &Connection) -> Result<(), rusqlite::Error> {
    add_column(conn, "keys", "manual_order INTEGER")?;
    add_column(conn, "keys", "price_brl REAL")?;
    add_column(conn, "keys", "price_usd REAL")?;
    add_column(conn, "keys", "channel TEXT")?;
    conn.execute(
        "UPDATE keys SET manual_order = id WHERE manual_order IS NULL",
        [],
    )?;
    Ok(())
}

fn category_costs_and_english(conn: &Connection) -> Result<(), rusqlite::Error> {
    add_column(conn, "categories", "instructions_en TEXT NOT NULL DEFAULT ''")?;
    add_column(conn, "categories", "document_en TEXT NOT NULL DEFAULT ''")?;
    add_column(conn, "categories", "license_en TEXT NOT NULL DEFAULT ''")?;
    add_column(conn, "categories", "language_en TEXT NOT NULL DEFAULT ''")?;
    add_column(conn, "categories", "delivery_en TEXT NOT NULL DEFAULT ''")?;
    add_column(conn, "categories", "logo_path TEXT")?;
    add_column(conn, "categories", "cost_brl REAL NOT NULL DEFAULT 0")?;
    add_column(conn, "categories", "cost_usd REAL NOT NULL DEFAULT 0")?;
    Ok(())
}

fn category_spanish(conn: &Connection) -> Result<(), rusqlite::Error> {
    add_column(conn, "categories", "instructions_es TEXT NOT NULL DEFAULT ''")?;
    add_column(conn, "categories", "document_es TEXT NOT NULL DEFAULT ''")?;
    add_column(conn, "categories", "license_es TEXT NOT NULL DEFAULT ''")?;
    add_column(conn, "categories", "language_es TEXT NOT NULL DEFAULT ''")?;
    add_column(conn, "categories", "delivery_es TEXT NOT NULL DEFAULT ''")?;
    Ok(())
}

fn channel_registry(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS channels (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE
        );",
    )
}

fn seed_sentinel_and_channels(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
        [UNCATEGORIZED],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO channels (name)
         SELECT DISTINCT channel FROM keys
         WHERE channel IS NOT NULL AND channel != ''",
        [],
    )?;
    Ok(())
}

/// Add a column if the table does not have it yet. `decl` starts with
/// the column name.
fn add_column(conn: &Connection, table: &str, decl: &str) -> Result<(), rusqlite::Error> {
    let column = decl.split_whitespace().next().unwrap_or(decl);
    if !has_column(conn, table, column)? {
        conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {decl};"))?;
    }
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
