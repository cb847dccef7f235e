//! Database layer for data persistence and access.
//!
//! Storage is SQLite accessed through SQLx. The layer follows the repository pattern:
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repository  │  (db::handlers - queries, eager loading, unit of work)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - camps, talks, speakers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   SQLite    │
//! └─────────────┘
//! ```
//!
//! # Migrations
//!
//! The schema lives in `migrations/` and is embedded with `sqlx::migrate!`. It is applied on
//! startup through [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
