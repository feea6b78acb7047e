//! Core domain logic for Studentbook.
//! This crate is the single source of truth for student record invariants.

pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::student::{
    legacy_student_id, validate_marks, FieldIssue, Grade, Student, StudentId, StudentRecord,
    StudentValidationError, MAX_MARK, MIN_MARK,
};
pub use service::student_service::{
    resolve_selector, ServiceError, ServiceResult, StudentService, MIN_ID_PREFIX_LEN,
};
pub use store::{JsonFileStore, StoreError, StoreResult, StudentStore, DEFAULT_DATA_FILE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
