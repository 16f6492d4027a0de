//! Shared types for the Cinedex catalog service.
//!
//! `models` holds the catalog and user shapes as they go over the wire,
//! `api` holds request/response bodies and the token claims.

pub mod api;
pub mod models;
