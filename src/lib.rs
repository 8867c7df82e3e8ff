// ABOUTME: Root module for troupe - multi-agent task orchestration library.
// ABOUTME: Declares the submodules and re-exports the top-level error type.

pub mod agent;
pub mod error;
pub mod hook;
pub mod llm;
pub mod memory;
pub mod orchestrator;
pub mod prelude;
pub mod task;

#[cfg(test)]
mod test_support;

pub use error::TroupeError;
