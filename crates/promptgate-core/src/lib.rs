//! Core crate for PromptGate.
//!
//! - [`config`] — typed configuration, loaded once from file + environment
//! - [`utils`] — path helpers shared by the other crates

pub mod config;
pub mod utils;
