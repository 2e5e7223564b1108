//! Newsdesk Common - shared types for the newsdesk status dashboard
//!
//! View-models for the backend's status endpoints, response envelope parsing,
//! the display-target registry, configuration and text formatting helpers.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod targets;
pub mod text;

pub use api::{parse_body, ApiRequest, Endpoint};
pub use config::DashboardConfig;
pub use error::{ConfigError, FetchError};
pub use models::*;
pub use targets::DisplayTargets;
