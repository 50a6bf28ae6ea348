//! SQL schema for the Roster SQLite store.
//!
//! Executed once when a connection is opened. There is no migration
//! machinery; the table shape is fixed.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS participant (
    uuid              TEXT PRIMARY KEY,
    created           TEXT NOT NULL,   -- RFC 3339 UTC; store-assigned, never updated
    updated           TEXT NOT NULL,   -- RFC 3339 UTC; refreshed on every update
    first_name        TEXT NOT NULL,
    last_name         TEXT NOT NULL,
    additional_names  TEXT
);
";
