//! Domain layer for the Eventownik participant panel.
//!
//! This crate contains:
//! - Domain models (Attribute, Participant, FlattenedParticipant, Block)
//! - Table semantics (column generation, controller state, view projection)
//! - Domain error types

pub mod models;
pub mod table;
