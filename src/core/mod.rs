//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Unified result model (ResultItem)
//! - Rendering functions for different output formats
//! - Runtime settings and logging setup
//! - Word normalization
//! - Data directory layout and common utilities

pub mod config;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod paths;
pub mod render;
pub mod util;
