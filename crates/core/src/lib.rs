//! Domain rules for the Inkwell wiki server.
//!
//! Everything in this crate is free of I/O so it can be shared by the store
//! layer, the HTTP layer and tests without pulling in a runtime.

pub mod error;
pub mod flash;
pub mod session;
pub mod types;
pub mod upload;
pub mod validation;
pub mod wiki;
