//! Pictos module - Word to pictogram resolution
//!
//! Provides:
//! - Semantic alias table (fallback search terms)
//! - Per-session resolution cache
//! - The resolver fallback cascade

pub mod aliases;
pub mod cache;
pub mod resolver;
