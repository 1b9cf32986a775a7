//! OpenProject API client and types.
//!
//! This module provides the interface for communicating with the
//! OpenProject REST API v3.

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::Auth;
pub use client::OpenProjectClient;
pub use error::ApiError;
pub use types::{NewWorkPackage, WorkPackage};
