//! SQL schema for the Roadworks SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id         TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    email           TEXT NOT NULL UNIQUE,  -- stored lowercased
    credential_hash TEXT NOT NULL,         -- argon2 PHC string
    role            TEXT NOT NULL,         -- 'admin' | 'field_worker'
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS issues (
    issue_id         TEXT PRIMARY KEY,
    road_name        TEXT NOT NULL,
    location_details TEXT NOT NULL,
    latitude         REAL,                 -- paired with longitude or both NULL
    longitude        REAL,
    issue_type       TEXT NOT NULL,
    severity         TEXT NOT NULL DEFAULT 'low',
    status           TEXT NOT NULL DEFAULT 'reported',
    photo_url        TEXT,
    -- Soft reference to users.user_id. No FOREIGN KEY: deleting a user
    -- leaves the reference dangling and readers treat the lookup miss as
    -- an unknown assignee.
    assigned_to      TEXT,
    reported_at      TEXT NOT NULL         -- ISO 8601 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS issues_assigned_idx ON issues(assigned_to);
CREATE INDEX IF NOT EXISTS issues_reported_idx ON issues(reported_at);
CREATE INDEX IF NOT EXISTS issues_status_idx   ON issues(status);

PRAGMA user_version = 1;
";
