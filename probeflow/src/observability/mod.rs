//! Observability utilities.

mod logging;
mod timer;

pub use logging::{init_logging, DEFAULT_DIRECTIVE};
pub use timer::StageTimer;
