//! # Yatube Shared
//!
//! Wire types shared by the HTTP layer: submitted form bodies, query
//! strings and JSON responses.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, HealthStatus};
