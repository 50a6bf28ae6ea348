//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by any [`ParticipantStore`]. Input
//! validation happens here, before anything reaches the store; auth, TLS,
//! and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod participants;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::store::ParticipantStore;

pub use error::ApiError;

/// Build the participant API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ParticipantStore + 'static,
{
  Router::new()
    .route(
      "/participants",
      get(participants::list::<S>)
        .post(participants::create::<S>)
        .delete(participants::delete_all::<S>),
    )
    .route("/participants/batch", post(participants::save_batch::<S>))
    .route("/participants/batch-delete", post(participants::delete_batch::<S>))
    .route("/participants/count", get(participants::count::<S>))
    .route(
      "/participants/{id}",
      get(participants::get_one::<S>)
        .head(participants::exists::<S>)
        .put(participants::update_one::<S>)
        .delete(participants::delete_one::<S>),
    )
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use roster_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = app
      .clone()
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn alice() -> Value {
    json!({
      "first_name": "Alice",
      "last_name": "Liddell",
      "additional_names": "Pleasance",
    })
  }

  // ── Create / read ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_then_get() {
    let app = app().await;

    let (status, created) =
      send(&app, "POST", "/participants", Some(alice())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_owned();
    assert_eq!(created["first_name"], "Alice");
    assert_eq!(created["created_at"], created["updated_at"]);

    let (status, fetched) =
      send(&app, "GET", &format!("/participants/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
  }

  #[tokio::test]
  async fn create_ignores_body_id() {
    let app = app().await;
    let mut body = alice();
    body["id"] = json!("chosen-by-caller");

    let (status, created) = send(&app, "POST", "/participants", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(created["id"], "chosen-by-caller");
  }

  #[tokio::test]
  async fn create_rejects_invalid_input() {
    let app = app().await;

    let (status, body) = send(
      &app,
      "POST",
      "/participants",
      Some(json!({ "first_name": "", "last_name": "x".repeat(81) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("first_name must not be empty"), "{message}");
    assert!(message.contains("last_name must be at most 80"), "{message}");

    let (_, count) = send(&app, "GET", "/participants/count", None).await;
    assert_eq!(count["count"], 0);
  }

  #[tokio::test]
  async fn get_unknown_is_404() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/participants/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
  }

  #[tokio::test]
  async fn head_reports_existence() {
    let app = app().await;
    let (_, created) = send(&app, "POST", "/participants", Some(alice())).await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send(&app, "HEAD", &format!("/participants/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "HEAD", "/participants/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn list_with_and_without_ids() {
    let app = app().await;
    let (_, a) = send(&app, "POST", "/participants", Some(alice())).await;
    let (_, b) = send(&app, "POST", "/participants", Some(alice())).await;
    send(&app, "POST", "/participants", Some(alice())).await;

    let (status, all) = send(&app, "GET", "/participants", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let uri = format!(
      "/participants?ids={},{},unknown",
      a["id"].as_str().unwrap(),
      b["id"].as_str().unwrap()
    );
    let (status, some) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let some = some.as_array().unwrap();
    assert_eq!(some.len(), 2);
    assert!(some.contains(&a));
    assert!(some.contains(&b));
  }

  // ── Update ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn put_updates_and_keeps_created_at() {
    let app = app().await;
    let (_, created) = send(&app, "POST", "/participants", Some(alice())).await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
      &app,
      "PUT",
      &format!("/participants/{id}"),
      Some(json!({ "first_name": "Updated first", "last_name": "Liddell" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["first_name"], "Updated first");
    assert_eq!(updated["additional_names"], Value::Null);
    assert_eq!(updated["created_at"], created["created_at"]);
    assert_ne!(updated["updated_at"], created["updated_at"]);

    let (_, fetched) = send(&app, "GET", &format!("/participants/{id}"), None).await;
    assert_eq!(fetched, updated);
  }

  #[tokio::test]
  async fn put_unknown_is_404() {
    let app = app().await;
    let (status, _) = send(
      &app,
      "PUT",
      "/participants/nope",
      Some(alice()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Batch ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn batch_save_creates_and_updates() {
    let app = app().await;
    let (_, mut existing) = send(&app, "POST", "/participants", Some(alice())).await;
    existing["first_name"] = json!("Renamed");

    let (status, saved) = send(
      &app,
      "POST",
      "/participants/batch",
      Some(json!([existing, { "first_name": "Bob", "last_name": "Builder" }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let saved = saved.as_array().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0]["first_name"], "Bob");
    assert_eq!(saved[1]["first_name"], "Renamed");
    assert_eq!(saved[1]["id"], existing["id"]);
  }

  #[tokio::test]
  async fn batch_save_ignores_client_timestamps() {
    let app = app().await;
    let (_, created) = send(&app, "POST", "/participants", Some(alice())).await;

    let (status, saved) = send(
      &app,
      "POST",
      "/participants/batch",
      Some(json!([{
        "id": created["id"],
        "first_name": "Renamed",
        "last_name": "Liddell",
        "created_at": "1999-01-01T00:00:00Z",
        "updated_at": "2999-01-01T00:00:00Z",
      }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let saved = &saved[0];
    assert_eq!(saved["created_at"], created["created_at"]);
    assert!(!saved["updated_at"].as_str().unwrap().starts_with("2999"));

    let uri = format!("/participants/{}", created["id"].as_str().unwrap());
    let (_, fetched) = send(&app, "GET", &uri, None).await;
    assert_eq!(&fetched, saved);
  }

  #[tokio::test]
  async fn batch_save_with_unknown_id_is_404_and_writes_nothing() {
    let app = app().await;

    let (status, _) = send(
      &app,
      "POST",
      "/participants/batch",
      Some(json!([
        { "first_name": "Bob", "last_name": "Builder" },
        { "id": "ghost", "first_name": "Casper", "last_name": "Ghost" },
      ])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, count) = send(&app, "GET", "/participants/count", None).await;
    assert_eq!(count["count"], 0);
  }

  #[tokio::test]
  async fn batch_delete_and_delete_all() {
    let app = app().await;
    let (_, a) = send(&app, "POST", "/participants", Some(alice())).await;
    let (_, b) = send(&app, "POST", "/participants", Some(alice())).await;
    send(&app, "POST", "/participants", Some(alice())).await;

    let (status, _) = send(
      &app,
      "POST",
      "/participants/batch-delete",
      Some(json!([a, b])),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, count) = send(&app, "GET", "/participants/count", None).await;
    assert_eq!(count["count"], 1);

    let (status, _) = send(&app, "DELETE", "/participants", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, count) = send(&app, "GET", "/participants/count", None).await;
    assert_eq!(count["count"], 0);
  }

  // ── Delete ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_one_is_idempotent() {
    let app = app().await;
    let (_, created) = send(&app, "POST", "/participants", Some(alice())).await;
    let uri = format!("/participants/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
