//! Export module - Printable artifacts for boards

pub mod pdf;
