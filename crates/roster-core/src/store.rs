//! The `ParticipantStore` trait.
//!
//! Implemented by storage backends (e.g. `roster-store-sqlite`). Application
//! layers (`roster-api`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use crate::{Participant, ParticipantId};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A backend error that can report the domain condition behind it, if any.
///
/// Lets generic callers tell "no such participant" or "missing id" apart
/// from storage failures without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn domain(&self) -> Option<&crate::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read/write access to persisted participants.
///
/// Implementations hold no state of their own beyond a handle to the
/// database. Updates are blind and carry no version check, so two concurrent
/// saves of the same participant resolve as last-writer-wins.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait ParticipantStore: Send + Sync {
  type Error: StoreError;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert `participant` if it has no id, otherwise update it by id.
  ///
  /// Inserting assigns a fresh id and sets both timestamps. Updating keeps
  /// the id and the stored `created_at`, moves the stored `updated_at`
  /// forward, and ignores any timestamps on `participant`. It fails with
  /// [`Error::NotFound`](crate::Error::NotFound) when no row has that id.
  fn save(
    &self,
    participant: Participant,
  ) -> impl Future<Output = Result<Participant, Self::Error>> + Send + '_;

  /// [`save`](Self::save) for many participants at once.
  ///
  /// New participants are inserted as one batch and persisted ones updated
  /// as another; the result lists the created participants first. Either
  /// everything is written or nothing is.
  fn save_all(
    &self,
    participants: Vec<Participant>,
  ) -> impl Future<Output = Result<Vec<Participant>, Self::Error>> + Send + '_;

  /// Delete by id. Deleting an unknown id is a no-op.
  fn delete_by_id(
    &self,
    id: ParticipantId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a persisted participant.
  ///
  /// Fails with [`Error::InvalidArgument`](crate::Error::InvalidArgument)
  /// before touching the database if the participant has no id.
  fn delete<'a>(
    &'a self,
    participant: &'a Participant,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete exactly the given participants; those without an id are skipped.
  fn delete_all_entities<'a>(
    &'a self,
    participants: &'a [Participant],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete every participant.
  fn delete_all(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Every participant, in no particular order.
  fn find_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Participant>, Self::Error>> + Send + '_;

  /// Retrieve a participant by id. Returns `None` if not found.
  fn find_by_id(
    &self,
    id: ParticipantId,
  ) -> impl Future<Output = Result<Option<Participant>, Self::Error>> + Send + '_;

  /// Every participant whose id is in `ids`. Unknown ids are left out of the
  /// result rather than reported.
  fn find_all_by_id(
    &self,
    ids: Vec<ParticipantId>,
  ) -> impl Future<Output = Result<Vec<Participant>, Self::Error>> + Send + '_;

  fn exists_by_id(
    &self,
    id: ParticipantId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Total number of participants.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
