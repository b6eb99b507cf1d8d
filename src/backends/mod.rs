//! Backends module - External service integrations
//!
//! Provides:
//! - http: shared blocking HTTP client
//! - arasaac: pictogram search
//! - images: pictogram image download
//! - segment: whitespace and language-model segmentation
//! - doctor: configuration and connectivity checks

pub mod arasaac;
pub mod doctor;
pub mod http;
pub mod images;
pub mod segment;
