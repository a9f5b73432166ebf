//! Shared domain types for the packslip widget.
//!
//! This crate holds everything the state machine, the production driver,
//! and the simulation harness agree on:
//!
//! - [`env::Environment`]: the seam between protocol logic and system
//!   resources (time, randomness, the host's identity string)
//! - [`config::WidgetConfig`]: validated, immutable-after-construction
//!   configuration with an explicit [`config::ConfigPatch`] merge type
//! - [`session::SessionState`]: the modal lifecycle phase record
//! - [`transport::SubmissionTransport`]: the async seam to the HTTP stack

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod env;
pub mod session;
pub mod transport;

pub use config::{ConfigError, ConfigPatch, FormOrigin, WidgetConfig};
pub use env::Environment;
pub use session::{Phase, SessionState};
pub use transport::{HttpReply, SubmissionTransport, TransportError};
