//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for camps and talks
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! All resource routes are nested under `/api`:
//!
//! - **Camps** (`/api/camps`, `/api/camps/{moniker}`, `/api/camps/searchByDate/{date}`)
//! - **Talks** (`/api/camps/{moniker}/talks`, `/api/camps/{moniker}/talks/{id}`)
//!
//! # OpenAPI Documentation
//!
//! Endpoints are documented with `utoipa`. The document is served at `/api/openapi.json` and
//! rendered at `/api/docs` when the server is running.

pub mod handlers;
pub mod models;
