//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with full sub-second precision,
//! so a participant read back compares equal to the one written. Ids are
//! stored verbatim.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use roster_core::{lifecycle::Stamps, Participant, ParticipantId};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Write rows ──────────────────────────────────────────────────────────────

/// Column values for an `INSERT` of a participant that has been through
/// `prepare_create`.
pub struct InsertRow {
  pub uuid:             String,
  pub created:          String,
  pub updated:          String,
  pub first_name:       String,
  pub last_name:        String,
  pub additional_names: Option<String>,
}

/// Caller-editable column values for an `UPDATE`. The `updated` value is
/// derived from the stored row when the update runs.
pub struct UpdateRow {
  pub uuid:             String,
  pub first_name:       String,
  pub last_name:        String,
  pub additional_names: Option<String>,
}

fn require<T: Clone>(value: &Option<T>, what: &str) -> Result<T> {
  value.clone().ok_or_else(|| {
    Error::Core(roster_core::Error::InvalidArgument(format!(
      "participant has no {what}"
    )))
  })
}

impl InsertRow {
  pub fn from_participant(p: &Participant) -> Result<Self> {
    Ok(Self {
      uuid:             require(&p.id, "id")?.into_string(),
      created:          encode_dt(require(&p.created_at, "created_at")?),
      updated:          encode_dt(require(&p.updated_at, "updated_at")?),
      first_name:       p.first_name.clone(),
      last_name:        p.last_name.clone(),
      additional_names: p.additional_names.clone(),
    })
  }
}

impl UpdateRow {
  pub fn from_participant(p: &Participant) -> Result<Self> {
    Ok(Self {
      uuid:             require(&p.id, "id")?.into_string(),
      first_name:       p.first_name.clone(),
      last_name:        p.last_name.clone(),
      additional_names: p.additional_names.clone(),
    })
  }
}

// ─── Read rows ───────────────────────────────────────────────────────────────

/// Map a row whose columns are `created, updated`.
///
/// Runs inside a connection call, so a malformed timestamp surfaces as a
/// conversion failure on its column.
pub fn stamps_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Stamps> {
  Ok(Stamps { created_at: dt_column(row, 0)?, updated_at: dt_column(row, 1)? })
}

fn dt_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
  let text: String = row.get(idx)?;
  DateTime::parse_from_rfc3339(&text)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| {
      rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Raw strings read directly from a `participant` row.
pub struct RawParticipant {
  pub uuid:             String,
  pub created:          String,
  pub updated:          String,
  pub first_name:       String,
  pub last_name:        String,
  pub additional_names: Option<String>,
}

impl RawParticipant {
  /// Map a row whose columns are `uuid, created, updated, first_name,
  /// last_name, additional_names`, in that order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      uuid:             row.get(0)?,
      created:          row.get(1)?,
      updated:          row.get(2)?,
      first_name:       row.get(3)?,
      last_name:        row.get(4)?,
      additional_names: row.get(5)?,
    })
  }

  /// Addresses are not stored, so the result always has an empty set.
  pub fn into_participant(self) -> Result<Participant> {
    Ok(Participant {
      id:               Some(ParticipantId::from(self.uuid)),
      created_at:       Some(decode_dt(&self.created)?),
      updated_at:       Some(decode_dt(&self.updated)?),
      first_name:       self.first_name,
      last_name:        self.last_name,
      additional_names: self.additional_names,
      addresses:        BTreeSet::new(),
    })
  }
}
