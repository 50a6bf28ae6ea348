//! Error types for `roster-core`.

use thiserror::Error;

use crate::participant::ParticipantId;

#[derive(Debug, Error)]
pub enum Error {
  /// An identity-dependent operation was given an entity without an id.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// An update addressed a participant that does not exist.
  #[error("participant not found: {0}")]
  NotFound(ParticipantId),

  #[error("validation failed: {}", .0.join("; "))]
  Validation(Vec<String>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
