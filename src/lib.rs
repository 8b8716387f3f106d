//! Personalized prompt and creator recommendations for the prompt-sharing
//! platform.
//!
//! The engine reads a user's ratings, bookmarks and comments through a
//! [`db::StoreReader`], derives the categories they like and the items they
//! have already seen, and ranks candidates from the catalog. Results are served
//! over HTTP by the router in [`routes`].

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::{create_router, AppState};
