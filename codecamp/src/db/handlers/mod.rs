//! Repository implementations for database access.
//!
//! The [`CampRepository`] trait is the data access contract used by the API handlers;
//! [`Camps`] implements it on top of a single SQLite connection.
//!
//! # Usage
//!
//! ```ignore
//! use codecamp::db::handlers::{CampRepository, Camps};
//!
//! async fn example(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
//!     let mut conn = pool.acquire().await?;
//!     let mut repo = Camps::new(&mut conn);
//!
//!     if let Some(camp) = repo.get_camp("NDCOSLO", true).await? {
//!         repo.delete_camp(&camp);
//!         repo.save_changes().await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! A repository is created per request and dropped with it. Reads go straight to the connection;
//! adds, updates and deletes are staged and committed together by `save_changes`.

pub mod camps;
pub mod repository;

pub use camps::Camps;
pub use repository::{CampRepository, Staged};
