//! BTS configuration management
//!
//! This crate provides configuration loading and parsing for the BTS process:
//! - TOML configuration file parsing
//! - Stack configuration structures
//! - L1 message queue configuration

pub mod stack_config;
pub mod stack_config_l1;
pub mod toml_config;

pub use stack_config::*;
pub use stack_config_l1::*;
pub use toml_config::*;
