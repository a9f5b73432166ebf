//! Deterministic simulation harness for packslip widget testing.
//!
//! Virtual-clock implementations of the `Environment`, `Embedder`, and
//! `SubmissionTransport` traits for deterministic, reproducible testing of
//! the widget lifecycle and submission protocol.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation for model-based
//! testing. Operations are applied to both the model and real widget, and
//! their observable states are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod sim_embedder;
pub mod sim_env;
pub mod sim_transport;

pub use model::{ModelWidget, Operation};
pub use sim_embedder::{SimEmbedder, SurfaceState};
pub use sim_env::SimEnv;
pub use sim_transport::{ScriptedOutcome, SimTransport};
