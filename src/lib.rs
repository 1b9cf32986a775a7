//! OpenProject issue-tracker integration for Sentry-style error-tracking
//! platforms.
//!
//! Two collaborating pieces:
//!
//! - [`api::OpenProjectClient`] builds authenticated HTTP requests to the
//!   OpenProject REST API v3, serializes/deserializes JSON, and raises
//!   typed errors on failure.
//! - [`plugin::OpenProjectPlugin`] implements the [`plugin::IssueTracker`]
//!   callback contract the host platform invokes: configuration checks,
//!   field descriptors, issue creation, issue linking, and autocomplete
//!   search.
//!
//! The host invokes a callback; the adapter builds a client from the
//! project's stored options (read through [`config::OptionStore`]),
//! performs one HTTP exchange, and maps the response or error into the
//! shape the host expects.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod plugin;

pub use error::{PluginError, Result};
pub use plugin::{IssueTracker, OpenProjectPlugin};
