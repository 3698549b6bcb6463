//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- bearer tokens for the JSON task API.

pub mod jwt;
pub mod password;
