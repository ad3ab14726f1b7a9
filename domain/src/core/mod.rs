//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] : consensus participants (Claude, Codex, Gemini, custom)
//! - [`clock::Clock`] : injectable time source
//! - [`error::DomainError`] : domain-level errors
//! - [`validation::ConfigIssue`] : non-fatal configuration findings

pub mod clock;
pub mod error;
pub mod model;
pub mod text;
pub mod validation;
