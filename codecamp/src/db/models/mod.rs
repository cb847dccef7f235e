//! Database record models.
//!
//! These are the storage-shaped entities handed out by the repository. They are
//! kept separate from the API models in [`crate::api::models`] so the wire
//! representation can evolve independently of the schema.
//!
//! - [`camps`]: Camps and their inline [`camps::Location`]
//! - [`talks`]: Talks, always owned by exactly one camp
//! - [`speakers`]: The shared, read-only speaker pool
//!
//! Related collections are modelled as `Option`s: `None` means "not loaded",
//! never "empty". Nothing here loads lazily.

pub mod camps;
pub mod speakers;
pub mod talks;
