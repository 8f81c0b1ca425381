//! Schema migration registry for the Bandmate store.
//!
//! # Responsibility
//! - List the feed and workflow schema steps in the order they ship.
//! - Bring a connection up to `latest_version()` in one write transaction.
//!
//! # Invariants
//! - Versions are contiguous from 1 and never reused.
//! - `PRAGMA user_version` equals the last step applied.
//! - The pending check is repeated under the write lock, so two processes
//!   opening a fresh file never run the same step twice.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

struct Migration {
    version: u32,
    name: &'static str,
    /// Tables introduced by this step, reported in `db_migrate` events.
    creates: &'static [&'static str],
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "feed",
        creates: &["profiles", "posts"],
        sql: include_str!("0001_feed.sql"),
    },
    Migration {
        version: 2,
        name: "workflow_boards",
        creates: &["projects", "boards", "board_tasks"],
        sql: include_str!("0002_workflow_boards.sql"),
    },
];

/// Returns the schema version this binary migrates to.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Returns every table the full schema defines, in creation order.
pub fn schema_tables() -> impl Iterator<Item = &'static str> {
    MIGRATIONS
        .iter()
        .flat_map(|migration| migration.creates.iter().copied())
}

/// Applies every step newer than the connection's `user_version`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `Migration` when a step's SQL fails; nothing from the batch is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let latest = latest_version();
    if check_version(conn, latest)? == latest {
        return Ok(());
    }

    let tx = Transaction::new(conn, TransactionBehavior::Immediate)?;
    let from_version = check_version(&tx, latest)?;
    for migration in MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
    {
        run_step(&tx, migration)?;
    }
    tx.commit()?;
    Ok(())
}

fn run_step(tx: &Transaction<'_>, migration: &Migration) -> DbResult<()> {
    let started_at = Instant::now();
    tx.execute_batch(migration.sql)
        .and_then(|()| tx.pragma_update(None, "user_version", migration.version))
        .map_err(|source| DbError::Migration {
            version: migration.version,
            source,
        })?;
    info!(
        "event=db_migrate module=db status=ok version={} name={} tables={} duration_ms={}",
        migration.version,
        migration.name,
        migration.creates.join(","),
        started_at.elapsed().as_millis()
    );
    Ok(())
}

fn check_version(conn: &Connection, latest: u32) -> DbResult<u32> {
    let db_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if db_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: latest,
        });
    }
    Ok(db_version)
}
