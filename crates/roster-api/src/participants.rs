//! Handlers for `/participants` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/participants` | Optional `?ids=a,b,c` |
//! | `POST`   | `/participants` | Body: [`ParticipantBody`]; returns 201 + stored participant |
//! | `DELETE` | `/participants` | Deletes every participant |
//! | `POST`   | `/participants/batch` | Body: array of [`BatchItem`] |
//! | `POST`   | `/participants/batch-delete` | Body: array of participants |
//! | `GET`    | `/participants/count` | `{"count": n}` |
//! | `GET`    | `/participants/:id` | 404 if not found |
//! | `HEAD`   | `/participants/:id` | 200 if present, 404 otherwise |
//! | `PUT`    | `/participants/:id` | Body: [`ParticipantBody`]; 404 if not found |
//! | `DELETE` | `/participants/:id` | 204 whether or not it existed |

use std::{collections::BTreeSet, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{Address, Participant, ParticipantId, store::ParticipantStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Caller-editable participant fields. Ids and timestamps are never taken
/// from the request body.
#[derive(Debug, Deserialize)]
pub struct ParticipantBody {
  pub first_name:       String,
  pub last_name:        String,
  #[serde(default)]
  pub additional_names: Option<String>,
  #[serde(default)]
  pub addresses:        BTreeSet<Address>,
}

impl ParticipantBody {
  fn apply_to(self, participant: Participant) -> Participant {
    Participant {
      first_name: self.first_name,
      last_name: self.last_name,
      additional_names: self.additional_names,
      addresses: self.addresses,
      ..participant
    }
  }
}

/// One entry of a batch save: an id selects an update, no id a create.
/// Timestamps are never taken from the request body.
#[derive(Debug, Deserialize)]
pub struct BatchItem {
  #[serde(default)]
  pub id:     Option<ParticipantId>,
  #[serde(flatten)]
  pub fields: ParticipantBody,
}

impl BatchItem {
  fn into_participant(self) -> Participant {
    let mut participant = self.fields.apply_to(Participant::new("", ""));
    participant.id = self.id;
    participant
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Comma-separated ids; unknown ids are left out of the result.
  pub ids: Option<String>,
}

/// `GET /participants[?ids=<id>,<id>,...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Participant>>, ApiError>
where
  S: ParticipantStore,
{
  let participants = match params.ids {
    Some(ids) => {
      let ids = ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ParticipantId::from)
        .collect();
      store.find_all_by_id(ids).await
    }
    None => store.find_all().await,
  }
  .map_err(ApiError::from_store)?;

  Ok(Json(participants))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /participants`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ParticipantBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParticipantStore,
{
  let participant = body.apply_to(Participant::new("", ""));
  participant.validate()?;

  let saved = store.save(participant).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(saved)))
}

// ─── Batch ────────────────────────────────────────────────────────────────────

/// `POST /participants/batch` — participants with an id are updated, the
/// rest are created. Nothing is written unless every participant is valid.
pub async fn save_batch<S>(
  State(store): State<Arc<S>>,
  Json(items): Json<Vec<BatchItem>>,
) -> Result<Json<Vec<Participant>>, ApiError>
where
  S: ParticipantStore,
{
  let participants: Vec<Participant> =
    items.into_iter().map(BatchItem::into_participant).collect();
  for participant in &participants {
    participant.validate()?;
  }

  let saved = store
    .save_all(participants)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(saved))
}

/// `POST /participants/batch-delete`
pub async fn delete_batch<S>(
  State(store): State<Arc<S>>,
  Json(participants): Json<Vec<Participant>>,
) -> Result<StatusCode, ApiError>
where
  S: ParticipantStore,
{
  store
    .delete_all_entities(&participants)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /participants`
pub async fn delete_all<S>(State(store): State<Arc<S>>) -> Result<StatusCode, ApiError>
where
  S: ParticipantStore,
{
  store.delete_all().await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Count ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CountBody {
  pub count: u64,
}

/// `GET /participants/count`
pub async fn count<S>(State(store): State<Arc<S>>) -> Result<Json<CountBody>, ApiError>
where
  S: ParticipantStore,
{
  let count = store.count().await.map_err(ApiError::from_store)?;
  Ok(Json(CountBody { count }))
}

// ─── Single participant ───────────────────────────────────────────────────────

/// `GET /participants/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Participant>, ApiError>
where
  S: ParticipantStore,
{
  let participant = store
    .find_by_id(ParticipantId::from(id.clone()))
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("participant {id} not found")))?;
  Ok(Json(participant))
}

/// `HEAD /participants/:id`
pub async fn exists<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: ParticipantStore,
{
  let exists = store
    .exists_by_id(ParticipantId::from(id))
    .await
    .map_err(ApiError::from_store)?;
  Ok(if exists { StatusCode::OK } else { StatusCode::NOT_FOUND })
}

/// `PUT /participants/:id`
///
/// Loads the stored participant so the response carries its original
/// `created_at`, then saves the edited fields over it.
pub async fn update_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Json(body): Json<ParticipantBody>,
) -> Result<Json<Participant>, ApiError>
where
  S: ParticipantStore,
{
  let current = store
    .find_by_id(ParticipantId::from(id.clone()))
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("participant {id} not found")))?;

  let participant = body.apply_to(current);
  participant.validate()?;

  let saved = store.save(participant).await.map_err(ApiError::from_store)?;
  Ok(Json(saved))
}

/// `DELETE /participants/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: ParticipantStore,
{
  store
    .delete_by_id(ParticipantId::from(id))
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
