//! Identity lifecycle rules shared by every store backend.
//!
//! A participant is either new (no id) or persisted (id assigned by a store).
//! Saving a new participant assigns the id and both timestamps; saving a
//! persisted one keeps the id and the stored `created_at` and refreshes the
//! stored `updated_at`. Timestamps on a participant handed in for an update
//! are never trusted. These functions are pure: the caller supplies `now`.

use chrono::{DateTime, Duration, Utc};

use crate::{Error, Participant, ParticipantId, Result};

/// Assign a fresh id and set `created_at = updated_at = now`.
///
/// Whatever id or timestamps the caller put on `participant` are discarded.
pub fn prepare_create(participant: Participant, now: DateTime<Utc>) -> Participant {
  Participant {
    id: Some(ParticipantId::generate()),
    created_at: Some(now),
    updated_at: Some(now),
    ..participant
  }
}

/// The timestamps a store holds for a persisted participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamps {
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Stamps {
  /// The stamps after an update at `now`: `created_at` is kept and
  /// `updated_at` moves strictly past the stored value.
  pub fn refreshed(self, now: DateTime<Utc>) -> Self {
    Self {
      created_at: self.created_at,
      updated_at: refreshed_stamp(self.updated_at, now),
    }
  }
}

/// Stamp a persisted participant with the timestamps its store settled on.
///
/// Whatever timestamps the caller put on `participant` are discarded. Fails
/// with [`Error::InvalidArgument`] if the participant has no id.
pub fn prepare_update(participant: Participant, stamps: Stamps) -> Result<Participant> {
  if participant.id.is_none() {
    return Err(Error::InvalidArgument(
      "participant to update does not have an id".into(),
    ));
  }

  Ok(Participant {
    created_at: Some(stamps.created_at),
    updated_at: Some(stamps.updated_at),
    ..participant
  })
}

/// The new `updated_at` given the stored one.
///
/// Never stands still or moves backwards relative to `previous`, even when
/// the wall clock does.
pub fn refreshed_stamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
  if now <= previous { previous + Duration::microseconds(1) } else { now }
}

/// Split a batch into `(to_create, to_update)`, keeping input order within
/// each half.
pub fn partition_for_save(
  participants: impl IntoIterator<Item = Participant>,
) -> (Vec<Participant>, Vec<Participant>) {
  participants.into_iter().partition(Participant::is_new)
}
