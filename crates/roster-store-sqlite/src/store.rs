//! [`SqliteStore`] — the SQLite implementation of [`ParticipantStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use roster_core::{
  lifecycle::{Stamps, partition_for_save, prepare_create, prepare_update},
  store::ParticipantStore,
  Participant, ParticipantId,
};

use crate::{
  encode::{InsertRow, RawParticipant, UpdateRow, encode_dt, stamps_from_row},
  schema::SCHEMA,
  Result,
};

// ─── Statements ──────────────────────────────────────────────────────────────

const SELECT_ALL: &str = "SELECT uuid, created, updated, first_name, last_name, additional_names
   FROM participant";

const SELECT_BY_ID: &str = "SELECT uuid, created, updated, first_name, last_name, additional_names
   FROM participant WHERE uuid = ?1";

const INSERT: &str = "INSERT INTO participant (
     uuid, created, updated, first_name, last_name, additional_names
   ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const UPDATE: &str = "UPDATE participant
   SET updated = ?1, first_name = ?2, last_name = ?3, additional_names = ?4
   WHERE uuid = ?5";

const SELECT_STAMPS: &str = "SELECT created, updated FROM participant WHERE uuid = ?1";

const COUNT_ALL: &str = "SELECT count(*) FROM participant";
const COUNT_BY_ID: &str = "SELECT count(*) FROM participant WHERE uuid = ?1";
const DELETE_BY_ID: &str = "DELETE FROM participant WHERE uuid = ?1";
const DELETE_ALL: &str = "DELETE FROM participant";

/// `SELECT ... WHERE uuid IN (?1, ..., ?n)` with one placeholder per id.
fn select_by_ids_sql(count: usize) -> String {
  let placeholders = (1..=count)
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ");
  format!("{SELECT_ALL} WHERE uuid IN ({placeholders})")
}

fn insert_row(conn: &rusqlite::Connection, row: &InsertRow) -> rusqlite::Result<()> {
  conn.prepare_cached(INSERT)?.execute(rusqlite::params![
    row.uuid,
    row.created,
    row.updated,
    row.first_name,
    row.last_name,
    row.additional_names,
  ])?;
  Ok(())
}

/// Update the row for `row.uuid`, refreshing `updated` from the stored value.
/// Returns the stamps now on the row, or `None` if the id is unknown.
///
/// Reads then writes, so callers run it inside a transaction.
fn update_row(
  conn: &rusqlite::Connection,
  row: &UpdateRow,
  now: DateTime<Utc>,
) -> rusqlite::Result<Option<Stamps>> {
  let Some(stored) = conn
    .prepare_cached(SELECT_STAMPS)?
    .query_row(rusqlite::params![row.uuid], stamps_from_row)
    .optional()?
  else {
    return Ok(None);
  };

  let stamps = stored.refreshed(now);
  conn.prepare_cached(UPDATE)?.execute(rusqlite::params![
    encode_dt(stamps.updated_at),
    row.first_name,
    row.last_name,
    row.additional_names,
    row.uuid,
  ])?;
  Ok(Some(stamps))
}

fn warn_dropped_addresses(participant: &Participant) {
  if !participant.addresses.is_empty() {
    tracing::warn!(
      id = ?participant.id,
      addresses = participant.addresses.len(),
      "addresses are not persisted; dropping them"
    );
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A participant store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a participant `SELECT` and map every row.
  async fn query_participants(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<Participant>> {
    let raws: Vec<RawParticipant> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(params.iter()),
            RawParticipant::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawParticipant::into_participant).collect()
  }

  async fn insert(&self, participant: Participant) -> Result<Participant> {
    let created = prepare_create(participant, Utc::now());
    let row = InsertRow::from_participant(&created)?;

    self
      .conn
      .call(move |conn| {
        insert_row(conn, &row)?;
        Ok(())
      })
      .await?;

    tracing::debug!(id = ?created.id, "inserted participant");
    Ok(created)
  }

  async fn update(&self, participant: Participant) -> Result<Participant> {
    let row = UpdateRow::from_participant(&participant)?;
    let id = ParticipantId::from(row.uuid.clone());
    let now = Utc::now();

    let stamps = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let stamps = update_row(&tx, &row, now)?;
        tx.commit()?;
        Ok(stamps)
      })
      .await?;

    let Some(stamps) = stamps else {
      return Err(roster_core::Error::NotFound(id).into());
    };

    tracing::debug!(%id, "updated participant");
    Ok(prepare_update(participant, stamps)?)
  }
}

// ─── ParticipantStore impl ───────────────────────────────────────────────────

impl ParticipantStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn save(&self, participant: Participant) -> Result<Participant> {
    warn_dropped_addresses(&participant);
    if participant.is_new() {
      self.insert(participant).await
    } else {
      self.update(participant).await
    }
  }

  async fn save_all(&self, participants: Vec<Participant>) -> Result<Vec<Participant>> {
    participants.iter().for_each(warn_dropped_addresses);

    let now = Utc::now();
    let (to_create, to_update) = partition_for_save(participants);

    let mut created: Vec<Participant> = to_create
      .into_iter()
      .map(|p| prepare_create(p, now))
      .collect();

    if created.is_empty() && to_update.is_empty() {
      return Ok(Vec::new());
    }

    let insert_rows = created
      .iter()
      .map(InsertRow::from_participant)
      .collect::<Result<Vec<_>>>()?;
    let update_rows = to_update
      .iter()
      .map(UpdateRow::from_participant)
      .collect::<Result<Vec<_>>>()?;
    let (inserts, updates) = (insert_rows.len(), update_rows.len());

    // One transaction for both batches. Returning before `commit` drops the
    // transaction, which rolls it back; `Err` carries the unknown id.
    let outcome: std::result::Result<Vec<Stamps>, String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for row in &insert_rows {
          insert_row(&tx, row)?;
        }
        let mut stamps = Vec::with_capacity(update_rows.len());
        for row in &update_rows {
          match update_row(&tx, row, now)? {
            Some(s) => stamps.push(s),
            None => return Ok(Err(row.uuid.clone())),
          }
        }
        tx.commit()?;
        Ok(Ok(stamps))
      })
      .await?;

    let stamps = outcome
      .map_err(|uuid| roster_core::Error::NotFound(uuid.into()))?;

    tracing::debug!(inserts, updates, "saved participant batch");
    for (participant, stamps) in to_update.into_iter().zip(stamps) {
      created.push(prepare_update(participant, stamps)?);
    }
    Ok(created)
  }

  async fn delete_by_id(&self, id: ParticipantId) -> Result<()> {
    let id_str = id.into_string();

    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute(DELETE_BY_ID, rusqlite::params![id_str])?))
      .await?;

    tracing::debug!(deleted, "deleted participant by id");
    Ok(())
  }

  async fn delete(&self, participant: &Participant) -> Result<()> {
    let id = participant.id.clone().ok_or_else(|| {
      roster_core::Error::InvalidArgument(
        "participant to delete does not have an id".into(),
      )
    })?;
    self.delete_by_id(id).await
  }

  async fn delete_all_entities(&self, participants: &[Participant]) -> Result<()> {
    let ids: Vec<String> = participants
      .iter()
      .filter_map(|p| p.id.as_ref())
      .map(|id| id.as_str().to_owned())
      .collect();

    if ids.is_empty() {
      return Ok(());
    }

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut deleted = 0;
        {
          let mut stmt = tx.prepare_cached(DELETE_BY_ID)?;
          for id in &ids {
            deleted += stmt.execute(rusqlite::params![id])?;
          }
        }
        tx.commit()?;
        Ok(deleted)
      })
      .await?;

    tracing::debug!(deleted, "deleted participant batch");
    Ok(())
  }

  async fn delete_all(&self) -> Result<()> {
    let deleted = self
      .conn
      .call(|conn| Ok(conn.execute(DELETE_ALL, [])?))
      .await?;

    tracing::debug!(deleted, "deleted all participants");
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn find_all(&self) -> Result<Vec<Participant>> {
    self.query_participants(SELECT_ALL.to_owned(), Vec::new()).await
  }

  async fn find_by_id(&self, id: ParticipantId) -> Result<Option<Participant>> {
    let id_str = id.into_string();

    let raw: Option<RawParticipant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(SELECT_BY_ID, rusqlite::params![id_str], RawParticipant::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawParticipant::into_participant).transpose()
  }

  async fn find_all_by_id(&self, ids: Vec<ParticipantId>) -> Result<Vec<Participant>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let sql = select_by_ids_sql(ids.len());
    let params = ids.into_iter().map(ParticipantId::into_string).collect();
    self.query_participants(sql, params).await
  }

  async fn exists_by_id(&self, id: ParticipantId) -> Result<bool> {
    let id_str = id.into_string();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(COUNT_BY_ID, rusqlite::params![id_str], |r| r.get(0))?)
      })
      .await?;

    Ok(count > 0)
  }

  async fn count(&self) -> Result<u64> {
    // A negative count fails the `u64` conversion inside rusqlite.
    let count: u64 = self
      .conn
      .call(|conn| Ok(conn.query_row(COUNT_ALL, [], |r| r.get(0))?))
      .await?;

    Ok(count)
  }
}
