//! Reference model for model-based testing.
//!
//! The model captures the lifecycle contract in its simplest form: a
//! boolean open flag with a terminal destroyed flag. Operations are
//! applied to both the model and the real widget, and `is_open` is
//! compared after every step.

mod operation;
mod widget;

pub use operation::Operation;
pub use widget::ModelWidget;
