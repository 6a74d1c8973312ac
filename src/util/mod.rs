//! Utility modules

pub mod config;
pub mod diagnostic;
pub mod logger;
