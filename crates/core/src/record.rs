// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stored record layout for a tracker.
//!
//! ```text
//! <id>            hash    name est_sec start finish st_msg pid fid l_u s in_p d st curr_prog
//! <id>:children   set     direct child ids
//! <friendly_id>   string  <id>
//! ```
//!
//! Decoding is field-by-field: a missing or ill-typed field falls back to its
//! default instead of failing the record.

use crate::gateway::{Batch, Fields};
use crate::id::TrackerId;
use crate::tracker::{Tracker, TrackerStatus};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

pub const NAME: &str = "name";
pub const ESTIMATED_SECONDS: &str = "est_sec";
pub const START: &str = "start";
pub const FINISH: &str = "finish";
pub const STATUS_MSG: &str = "st_msg";
pub const PARENT_ID: &str = "pid";
pub const FRIENDLY_ID: &str = "fid";
pub const LAST_UPDATE: &str = "l_u";
pub const SOURCE: &str = "s";
pub const IN_PROGRESS: &str = "in_p";
pub const DONE: &str = "d";
pub const STATUS: &str = "st";
/// Counter field, written only through atomic increments.
pub const CURRENT_PROGRESS: &str = "curr_prog";

/// Key of the set holding a tracker's direct children.
pub fn children_key(id: &str) -> String {
    format!("{id}:children")
}

/// Sparse hash fields for `tracker`; unset optional fields are omitted.
pub fn encode(tracker: &Tracker) -> Fields {
    let mut fields = Fields::new();
    let mut put = |key: &str, value: Value| {
        fields.insert(key.to_string(), value);
    };
    put(NAME, Value::from(tracker.name.as_str()));
    if let Some(secs) = tracker.estimated_seconds {
        put(ESTIMATED_SECONDS, Value::from(secs));
    }
    if let Some(start) = tracker.start_time {
        put(START, timestamp_value(start));
    }
    if let Some(finish) = tracker.finish_time {
        put(FINISH, timestamp_value(finish));
    }
    if let Some(msg) = &tracker.status_msg {
        put(STATUS_MSG, Value::from(msg.as_str()));
    }
    if let Some(parent) = &tracker.parent_id {
        put(PARENT_ID, Value::from(parent.as_str()));
    }
    if let Some(alias) = &tracker.friendly_id {
        put(FRIENDLY_ID, Value::from(alias.as_str()));
    }
    put(LAST_UPDATE, timestamp_value(tracker.last_update));
    if let Some(source) = &tracker.source {
        put(SOURCE, Value::from(source.as_str()));
    }
    put(IN_PROGRESS, Value::Bool(tracker.in_progress));
    put(DONE, Value::Bool(tracker.done));
    put(STATUS, Value::from(tracker.status.to_string()));
    fields
}

/// The batch that persists one tracker: its hash, its children set, and
/// its alias.
pub fn flush_batch(tracker: &Tracker) -> Batch {
    let mut batch = Batch::new();
    batch.write_hash(tracker.id.as_str(), encode(tracker));
    if !tracker.children.is_empty() {
        batch.add_to_set(children_key(&tracker.id), tracker.children.iter().map(TrackerId::as_str));
    }
    if let Some(alias) = &tracker.friendly_id {
        batch.set_alias(alias.as_str(), tracker.id.as_str());
    }
    batch
}

/// Rebuild a clean tracker from stored fields. Children are read separately.
pub fn decode(id: TrackerId, fields: &Fields) -> Tracker {
    let reader = FieldReader { id: &id, fields };
    let mut tracker = Tracker::restored(id.clone());

    if let Some(name) = reader.text(NAME) {
        tracker.name = name;
    }
    tracker.estimated_seconds =
        reader.integer(ESTIMATED_SECONDS).and_then(|n| u64::try_from(n).ok());
    tracker.start_time = reader.timestamp(START);
    tracker.finish_time = reader.timestamp(FINISH);
    tracker.status_msg = reader.text(STATUS_MSG);
    tracker.parent_id = reader.text(PARENT_ID).map(TrackerId::from);
    tracker.friendly_id = reader.text(FRIENDLY_ID);
    if let Some(last_update) = reader.timestamp(LAST_UPDATE) {
        tracker.last_update = last_update;
    }
    tracker.source = reader.text(SOURCE);
    tracker.current_progress = reader.integer(CURRENT_PROGRESS).unwrap_or(0);

    let in_progress = reader.flag(IN_PROGRESS);
    let done = reader.flag(DONE);
    let status = reader.text(STATUS).and_then(|raw| match raw.parse::<TrackerStatus>() {
        Ok(status) => Some(status),
        Err(e) => {
            tracing::warn!(tracker_id = %reader.id, error = %e, "unknown status, using flags");
            None
        }
    });
    // Without a status, a done record has no known outcome: it decodes as Canceled.
    tracker.status = status.unwrap_or(match (in_progress, done) {
        (Some(true), _) => TrackerStatus::InProgress,
        (_, Some(true)) => TrackerStatus::Canceled,
        _ => TrackerStatus::NotStarted,
    });
    // Flags always follow the status.
    tracker.in_progress = tracker.status == TrackerStatus::InProgress;
    tracker.done = tracker.status.is_terminal();
    if in_progress.is_some_and(|v| v != tracker.in_progress)
        || done.is_some_and(|v| v != tracker.done)
    {
        tracing::warn!(
            tracker_id = %reader.id,
            status = %tracker.status,
            ?in_progress,
            ?done,
            "stored flags contradict status, using status"
        );
    }
    tracker
}

fn timestamp_value(time: DateTime<Utc>) -> Value {
    Value::from(time.to_rfc3339_opts(SecondsFormat::Micros, true))
}

struct FieldReader<'a> {
    id: &'a TrackerId,
    fields: &'a Fields,
}

impl FieldReader<'_> {
    fn malformed(&self, key: &str, value: &Value) {
        tracing::warn!(tracker_id = %self.id, field = key, %value, "ignoring malformed field");
    }

    fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.malformed(key, other);
                None
            }
        }
    }

    fn flag(&self, key: &str) -> Option<bool> {
        let value = self.fields.get(key)?;
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        };
        if parsed.is_none() {
            self.malformed(key, value);
        }
        parsed
    }

    fn integer(&self, key: &str) -> Option<i64> {
        let value = self.fields.get(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.malformed(key, value);
        }
        parsed
    }

    fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.text(key)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(time) => Some(time.with_timezone(&Utc)),
            Err(_) => {
                self.malformed(key, &Value::String(raw));
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
