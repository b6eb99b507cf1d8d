//! Board module - Board data model, word cleaning and assembly
//!
//! Provides:
//! - Board, BoardItem, PictogramRef and Draft types
//! - Configurable word cleaning applied before assembly
//! - Assembly of resolved cells in input order

pub mod assemble;
pub mod clean;
pub mod model;
