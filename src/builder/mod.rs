//! Builder API for validated state machine construction.
//!
//! This module provides a fluent builder that checks machine definitions
//! before use, and the `event_kind!` macro for declaring closed sets of
//! event kinds.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::{BuildError, DefinitionError};
pub use machine::StateMachineBuilder;
