//! Binary-side orchestration: logging, signal handling and exit status.

pub(crate) mod exit_handler;
pub(crate) mod runtime;
pub(crate) mod terminal;
