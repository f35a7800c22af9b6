//! Data models shared across the pipeline.

pub mod config;
pub mod input;
pub mod record;
