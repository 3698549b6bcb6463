//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row and a create DTO for inserts. Nothing is ever updated wholesale, so
//! there are no update DTOs.

pub mod page;
pub mod task;
pub mod user;
