//! Core business logic for curio.

pub mod services;

pub use services::*;
