//! Data types shared across the pipeline.

pub mod config;
pub mod events;
pub mod page;
pub mod verification;
