//! Store module - Durable patient data under the data directory
//!
//! Provides:
//! - patients.json: patient registry with per-patient board history
//! - drafts/: the in-progress board of each patient
//! - Store format metadata

pub mod drafts;
pub mod meta;
pub mod patients;
