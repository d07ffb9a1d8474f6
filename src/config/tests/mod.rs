//! Unit tests for infracost configuration.
//!
//! This module contains tests organised into:
//! - [`helpers`] - Shared fixtures and helper functions
//! - [`types_tests`] - Defaults and serialisation of configuration types
//! - [`env_binding_tests`] - Environment variable table binding
//! - [`file_tests`] - Config file parsing and validation
//! - [`store_tests`] - Installation state and credentials persistence
//! - [`layer_precedence_tests`] - Ordering of defaults, file, env and flags

mod env_binding_tests;
mod helpers;
