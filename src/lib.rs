// Library exports for the supplier dashboard backend.
// Integration tests drive the router through these modules.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod geocode;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
