//! Gemini outbound adapters.
//!
//! This module provides a streaming HTTP implementation of the
//! `LanguageModel` port together with its configuration.

mod config;
mod dto;
mod http_model;

pub use config::{AssistantSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use http_model::GeminiLanguageModel;
