//! GymAR API server library.
//!
//! Exposes the core building blocks (config, state, error handling, routes,
//! QR artifact store) so integration tests, the server binary, and the
//! `generate-qrcodes` maintenance binary can all use them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod qrcodes;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
