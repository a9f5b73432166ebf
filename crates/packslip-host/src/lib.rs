//! Packslip production driver.
//!
//! This crate provides the production runtime around the widget state
//! machine:
//! - Tokio for async execution
//! - Reqwest for the HTTP submission transport
//! - System time and cryptographic RNG
//!
//! ## Architecture
//!
//! ```text
//! packslip-host
//!   ├─ SystemEnv        (production Environment impl)
//!   ├─ ReqwestTransport (HTTP POST via reqwest)
//!   ├─ HostDriver       (sans-IO orchestrator: events in, actions out)
//!   ├─ Embedder         (trait: the surface seam the integrator provides)
//!   ├─ HostCallbacks    (merchant-facing callback registry)
//!   └─ bootstrap        (declarative attribute-driven initialization)
//! ```
//!
//! The embedding surface itself (overlay and frame construction, styling,
//! input wiring) is an external collaborator behind the [`Embedder`]
//! trait. The driver owns everything else: it feeds embedder signals and
//! channel payloads into the widget, executes the returned actions, runs
//! the submission task, and schedules the auto-close.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bootstrap;
mod callbacks;
mod driver;
mod embedder;
mod system_env;
mod transport;

pub use callbacks::HostCallbacks;
pub use driver::HostDriver;
pub use embedder::{Embedder, SurfaceRequest};
pub use packslip_widget::{
    ConfigError, ConfigPatch, FormOrigin, WidgetConfig, WidgetError, WidgetEvent,
};
pub use system_env::SystemEnv;
pub use transport::ReqwestTransport;
