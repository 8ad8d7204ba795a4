use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use tracing::{debug, warn};
use uuid::Uuid;

use chime_core::types::{Destination, NewReminder, Recurrence, Reminder};

use crate::db::init_db;
use crate::error::Result;

/// Raw column tuple as read from the `reminders` table.
type ReminderRow = (
    String,         // id
    String,         // owner_id
    i64,            // due_at (epoch seconds)
    String,         // message
    String,         // destination_kind
    Option<String>, // channel_id
    Option<String>, // mention_target
    String,         // recurrence_kind
    Option<i64>,    // weekday
    i64,            // deleted
    String,         // created_at
    String,         // updated_at
);

const SELECT_COLUMNS: &str = "id, owner_id, due_at, message, destination_kind, channel_id, \
     mention_target, recurrence_kind, weekday, deleted, created_at, updated_at";

/// Durable reminder collection shared between the scheduling loop and the
/// lifecycle API.
///
/// Wraps a single SQLite connection in a mutex; every public operation is
/// one statement, so `soft_delete`/`reschedule` are atomic single-record
/// updates and `due_before` observes a consistent snapshot.
#[derive(Clone)]
pub struct ReminderStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReminderStore {
    /// Wrap an existing connection, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open (or create) the database file at `path`.
    pub fn open(path: &str) -> Result<Self> {
        Self::new(Connection::open(path)?)
    }

    /// Persist a new reminder, assigning a fresh UUID. Returns the full
    /// record as stored.
    pub fn create(&self, new: NewReminder) -> Result<Reminder> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        let now_str = now.to_rfc3339();
        let id = Uuid::new_v4().to_string();

        let (dest_kind, channel_id, mention_target) = destination_columns(&new.destination);
        let (rec_kind, weekday) = recurrence_columns(&new.recurrence);

        conn.execute(
            "INSERT INTO reminders
             (id, owner_id, due_at, message, destination_kind, channel_id,
              mention_target, recurrence_kind, weekday, deleted, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,0,?10,?10)",
            rusqlite::params![
                id,
                new.owner_id,
                new.due_at.timestamp(),
                new.message,
                dest_kind,
                channel_id,
                mention_target,
                rec_kind,
                weekday,
                now_str,
            ],
        )?;

        debug!(reminder_id = %id, owner_id = %new.owner_id, "reminder created");

        Ok(Reminder {
            id,
            owner_id: new.owner_id,
            destination: new.destination,
            due_at: new.due_at,
            message: new.message,
            recurrence: new.recurrence,
            deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// All non-deleted reminders belonging to `owner_id`, soonest first
    /// (ties broken by insertion order).
    pub fn list_active(&self, owner_id: &str) -> Result<Vec<Reminder>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM reminders
             WHERE deleted = 0 AND owner_id = ?1
             ORDER BY due_at, rowid",
        ))?;
        let rows: Vec<ReminderRow> = stmt
            .query_map([owner_id], read_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(decode_rows(rows))
    }

    /// All non-deleted reminders whose `due_at` is at or before `now` — the
    /// per-tick scan. A single SELECT, so concurrent deletions either land
    /// before the snapshot (row excluded) or after (caught by the
    /// conditional updates in `reschedule`/`retire`).
    pub fn due_before(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM reminders
             WHERE deleted = 0 AND due_at <= ?1
             ORDER BY due_at, rowid",
        ))?;
        let rows: Vec<ReminderRow> = stmt
            .query_map([now.timestamp()], read_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(decode_rows(rows))
    }

    /// Atomically advance `due_at` for a still-active record. Returns
    /// `false` (no-op, not an error) when the record was deleted
    /// concurrently or never existed.
    pub fn reschedule(&self, id: &str, new_due_at: DateTime<Utc>) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE reminders SET due_at = ?1, updated_at = ?2
             WHERE id = ?3 AND deleted = 0",
            rusqlite::params![new_due_at.timestamp(), Utc::now().to_rfc3339(), id],
        )?;
        Ok(n > 0)
    }

    /// Owner-requested cancellation. Sets the soft-delete flag only when
    /// `requester_id` matches the stored owner; returns whether a live
    /// matching record was found. "Not found" is a normal condition
    /// (double-cancel, already fired), not an error.
    pub fn soft_delete(&self, id: &str, requester_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE reminders SET deleted = 1, updated_at = ?1
             WHERE id = ?2 AND owner_id = ?3 AND deleted = 0",
            rusqlite::params![Utc::now().to_rfc3339(), id, requester_id],
        )?;
        Ok(n > 0)
    }

    /// Engine-side retirement of a one-shot reminder after a successful
    /// delivery. Same soft delete as `soft_delete`, without the ownership
    /// check; the row stays in storage for audit.
    pub fn retire(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE reminders SET deleted = 1, updated_at = ?1
             WHERE id = ?2 AND deleted = 0",
            rusqlite::params![Utc::now().to_rfc3339(), id],
        )?;
        Ok(n > 0)
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReminderRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
    ))
}

/// Decode raw rows, skipping (and logging) any that fail to decode so one
/// corrupt record never blocks a scan.
fn decode_rows(rows: Vec<ReminderRow>) -> Vec<Reminder> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.0.clone();
            match decode_row(row) {
                Some(r) => Some(r),
                None => {
                    warn!(reminder_id = %id, "skipping undecodable reminder row");
                    None
                }
            }
        })
        .collect()
}

fn decode_row(row: ReminderRow) -> Option<Reminder> {
    let (
        id,
        owner_id,
        due_secs,
        message,
        dest_kind,
        channel_id,
        mention_target,
        rec_kind,
        weekday,
        deleted,
        created_at,
        updated_at,
    ) = row;

    let destination = match dest_kind.as_str() {
        "dm" => Destination::DirectMessage,
        "channel" => Destination::Channel {
            channel_id: channel_id?,
            mention_target,
        },
        _ => return None,
    };
    let recurrence = match rec_kind.as_str() {
        "none" => Recurrence::None,
        "daily" => Recurrence::Daily,
        "weekly" => Recurrence::Weekly {
            day: u8::try_from(weekday?).ok().filter(|d| *d <= 6)?,
        },
        "monthly" => Recurrence::Monthly,
        _ => return None,
    };

    Some(Reminder {
        id,
        owner_id,
        due_at: Utc.timestamp_opt(due_secs, 0).single()?,
        message,
        destination,
        recurrence,
        deleted: deleted != 0,
        created_at: parse_rfc3339(&created_at)?,
        updated_at: parse_rfc3339(&updated_at)?,
    })
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn destination_columns(d: &Destination) -> (&'static str, Option<&str>, Option<&str>) {
    match d {
        Destination::DirectMessage => ("dm", None, None),
        Destination::Channel {
            channel_id,
            mention_target,
        } => ("channel", Some(channel_id.as_str()), mention_target.as_deref()),
    }
}

fn recurrence_columns(r: &Recurrence) -> (&'static str, Option<i64>) {
    match r {
        Recurrence::None => ("none", None),
        Recurrence::Daily => ("daily", None),
        Recurrence::Weekly { day } => ("weekly", Some(i64::from(*day))),
        Recurrence::Monthly => ("monthly", None),
    }
}
