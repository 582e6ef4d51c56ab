//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed greeting repository using Diesel ORM
//! - **gemini**: streaming language model over the Gemini REST API
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod gemini;
pub mod persistence;
