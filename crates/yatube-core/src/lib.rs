//! # Yatube Core
//!
//! The domain layer of Yatube: entities, ports, pagination, form validation,
//! and the feed / follow-graph / post services built on top of the ports.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
pub use pagination::{FeedPage, PAGE_SIZE};
