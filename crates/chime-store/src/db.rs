use rusqlite::Connection;

use crate::error::Result;

/// Initialise the reminder schema in `conn`.
///
/// Creates the `reminders` table (idempotent) and an index on
/// `(deleted, due_at)` so the per-tick due scan stays efficient even with
/// thousands of reminders.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reminders (
            id               TEXT    NOT NULL PRIMARY KEY,
            owner_id         TEXT    NOT NULL,
            due_at           INTEGER NOT NULL,   -- seconds since epoch, UTC
            message          TEXT    NOT NULL,
            destination_kind TEXT    NOT NULL,   -- 'dm' | 'channel'
            channel_id       TEXT,
            mention_target   TEXT,
            recurrence_kind  TEXT    NOT NULL DEFAULT 'none',
            weekday          INTEGER,            -- 0 = Monday … 6 = Sunday
            deleted          INTEGER NOT NULL DEFAULT 0,
            created_at       TEXT    NOT NULL,
            updated_at       TEXT    NOT NULL
        ) STRICT;

        -- Efficient polling: SELECT … WHERE deleted = 0 AND due_at <= ?
        CREATE INDEX IF NOT EXISTS idx_reminders_due ON reminders (deleted, due_at);
        ",
    )?;
    Ok(())
}
