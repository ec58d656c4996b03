//! Domain logic for the GymAR exercise catalog.
//!
//! This crate has no database or HTTP dependencies. It holds the shared
//! error type, slug and QR rules used by the backend, the client-side
//! workout plan store, and the AR placement/interaction component.

pub mod ar;
pub mod category;
pub mod error;
pub mod qr;
pub mod slug;
pub mod types;
pub mod workout;
