//! Newsdeskctl library - status polling and rendering for the newsdesk backend
//!
//! Exposes modules for the binary and for integration tests.

pub mod dashboard;
pub mod errors;
pub mod logging;
pub mod poller;
pub mod render;
pub mod scheduler;
pub mod source;
pub mod status_command;

pub use poller::{PollerOptions, StatusPoller};
pub use render::{IndicatorState, PageModel, Renderer};
pub use source::{FakeStatusSource, HttpStatusSource, StatusSource};
