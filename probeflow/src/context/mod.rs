//! Context types for pipeline builds.
//!
//! This module provides:
//! - `RunIdentity` - Identification of one orchestration invocation
//! - `RunContext` - Event sink and tracing span passed to each stage

mod identity;
mod run;

pub use identity::RunIdentity;
pub use run::RunContext;
