//! Participant — the sole persisted entity — and its embedded addresses.
//!
//! A participant without an id has never been persisted. Ids and timestamps
//! are assigned by the store, never by the caller.

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Maximum length of a name field, in characters.
pub const MAX_NAME_LEN: usize = 80;
/// Maximum length of a street address or city, in characters.
pub const MAX_ADDRESS_LINE_LEN: usize = 80;
/// Maximum length of a postal code, in characters.
pub const MAX_POSTAL_CODE_LEN: usize = 10;

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Opaque, globally unique participant identifier.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
  /// A fresh random identifier (hyphenated lowercase v4 UUID).
  pub fn generate() -> Self { Self(Uuid::new_v4().hyphenated().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_string(self) -> String { self.0 }
}

impl fmt::Display for ParticipantId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<String> for ParticipantId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for ParticipantId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

// ─── Address ─────────────────────────────────────────────────────────────────

/// A postal address embedded in a participant.
///
/// Addresses are part of the model and are validated, but no store writes or
/// reads them.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Address {
  #[serde(default)]
  pub id:             Option<String>,
  pub street_address: String,
  pub postal_code:    String,
  pub city:           String,
}

// ─── Participant ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  #[serde(default)]
  pub id:               Option<ParticipantId>,
  #[serde(default)]
  pub created_at:       Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at:       Option<DateTime<Utc>>,
  pub first_name:       String,
  pub last_name:        String,
  #[serde(default)]
  pub additional_names: Option<String>,
  #[serde(default)]
  pub addresses:        BTreeSet<Address>,
}

impl Participant {
  /// A new, not-yet-persisted participant.
  pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
    Self {
      id:               None,
      created_at:       None,
      updated_at:       None,
      first_name:       first_name.into(),
      last_name:        last_name.into(),
      additional_names: None,
      addresses:        BTreeSet::new(),
    }
  }

  pub fn with_additional_names(mut self, names: impl Into<String>) -> Self {
    self.additional_names = Some(names.into());
    self
  }

  pub fn with_address(mut self, address: Address) -> Self {
    self.addresses.insert(address);
    self
  }

  /// `true` if the participant has never been persisted.
  pub fn is_new(&self) -> bool { self.id.is_none() }

  /// Check the field constraints, collecting every violation.
  ///
  /// Stores do not call this; it belongs to whoever accepts input.
  pub fn validate(&self) -> Result<()> {
    let mut violations = Vec::new();

    required("first_name", &self.first_name, MAX_NAME_LEN, &mut violations);
    required("last_name", &self.last_name, MAX_NAME_LEN, &mut violations);
    if let Some(names) = &self.additional_names {
      at_most("additional_names", names, MAX_NAME_LEN, &mut violations);
    }

    for (i, address) in self.addresses.iter().enumerate() {
      let field = |name: &str| format!("addresses[{i}].{name}");
      required(
        &field("street_address"),
        &address.street_address,
        MAX_ADDRESS_LINE_LEN,
        &mut violations,
      );
      required(
        &field("postal_code"),
        &address.postal_code,
        MAX_POSTAL_CODE_LEN,
        &mut violations,
      );
      required(&field("city"), &address.city, MAX_ADDRESS_LINE_LEN, &mut violations);
    }

    if violations.is_empty() {
      Ok(())
    } else {
      Err(Error::Validation(violations))
    }
  }
}

fn required(field: &str, value: &str, max: usize, violations: &mut Vec<String>) {
  if value.is_empty() {
    violations.push(format!("{field} must not be empty"));
  } else {
    at_most(field, value, max, violations);
  }
}

fn at_most(field: &str, value: &str, max: usize, violations: &mut Vec<String>) {
  if value.chars().count() > max {
    violations.push(format!("{field} must be at most {max} characters"));
  }
}
