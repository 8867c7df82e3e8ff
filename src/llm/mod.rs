// ABOUTME: LLM module - client abstraction for language model providers.
// ABOUTME: Defines types, the client trait, model handles and providers.

mod anthropic;
mod client;
mod model;
mod openai;
mod types;

pub use anthropic::*;
pub use client::*;
pub use model::*;
pub use openai::*;
pub use types::*;

#[cfg(test)]
mod types_test;

#[cfg(test)]
mod anthropic_test;
