//! Core types and trait definitions for the Roster participant store.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::ParticipantStore`]; application layers depend only on
//! that trait.

pub mod error;
pub mod lifecycle;
pub mod participant;
pub mod store;

pub use error::{Error, Result};
pub use participant::{Address, Participant, ParticipantId};
