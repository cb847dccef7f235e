//! HTTP request handlers for the camp and talk resources.
//!
//! Each handler acquires a pooled connection, opens a [`crate::db::handlers::Camps`] session on
//! it, stages its changes and saves them once. Failures convert into [`crate::errors::Error`],
//! which maps to the HTTP status and body.
//!
//! - [`camps`]: camp listing, lookup by moniker, search by date and CRUD
//! - [`talks`]: talks nested under a camp, including speaker attachment

pub mod camps;
pub mod talks;
