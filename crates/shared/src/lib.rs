//! Shared utilities and common types for the Eventownik panel.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (panel key hashing and generation)
//! - Offset pagination math for in-memory result sets
//! - Attribute value validation logic

pub mod crypto;
pub mod pagination;
pub mod validation;
