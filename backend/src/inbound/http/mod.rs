//! HTTP inbound adapter exposing REST and streaming endpoints.

pub mod assistant;
pub mod error;
pub mod greeting;
pub mod health;
pub mod schemas;
pub mod state;

pub use error::ApiResult;
