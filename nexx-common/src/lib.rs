//! # NEXX Common Library
//!
//! Shared code for the NEXX repair knowledge-base services:
//! - Database schema and record models
//! - Key-value cache with TTL expiry
//! - Bootstrap configuration loading
//! - Common error type

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use cache::{KvCache, SqliteCache};
pub use error::{Error, Result};
