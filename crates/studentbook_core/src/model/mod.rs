//! Student record domain model.
//!
//! # Responsibility
//! - Define the validated `Student` value shared by store, service and callers.
//! - Keep mark-range validation and derived metrics in one place.
//!
//! # Invariants
//! - Every `Student` in circulation has passed mark validation.
//! - Identity is the surrogate `StudentId`, never the display name.

pub mod student;
