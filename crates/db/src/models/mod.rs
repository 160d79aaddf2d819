//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - Where the resource is listable, a `Deserialize` filter used as the
//!   list endpoint's query string

pub mod annotation;
pub mod dataset;
pub mod detection;
pub mod image;
pub mod job;
pub mod model;
pub mod object_class;
pub mod status;
pub mod training;
