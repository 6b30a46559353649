//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and operations
//! - Generation-checked handles for arena storage
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
