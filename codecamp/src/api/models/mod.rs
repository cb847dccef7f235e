//! API request and response data models.
//!
//! These structures define the public JSON contract and are kept separate from the storage
//! models in [`crate::db::models`]. All of them use camelCase on the wire and are annotated with
//! `utoipa` for the generated OpenAPI document.
//!
//! - [`camps`]: camp payloads, the location value and event date parsing
//! - [`talks`]: talk payloads scoped to a camp
//! - [`speakers`]: speaker details embedded in talks
//! - [`validation`]: field-keyed validation messages returned with 400 responses

pub mod camps;
pub mod speakers;
pub mod talks;
pub mod validation;
