//! Whole-collection persistence for student records.
//!
//! # Responsibility
//! - Define the load-all/save-all contract used by services.
//! - Translate between persisted records and validated `Student` values.
//!
//! # Invariants
//! - A missing backing file loads as an empty collection.
//! - Loads are fail-fast: one invalid entry fails the whole load.
//! - A successful save leaves the backing file holding exactly the given
//!   sequence, in order.

use crate::model::student::{Student, StudentValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod json_file;

pub use json_file::{JsonFileStore, DEFAULT_DATA_FILE};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for collection load/save operations.
#[derive(Debug)]
pub enum StoreError {
    /// Backing file exists but could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Backing file content is not a JSON list of student records.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// One persisted entry violates a model invariant.
    Validation {
        index: usize,
        source: StudentValidationError,
    },
    /// Collection could not be encoded.
    Encode(serde_json::Error),
    /// Backing file could not be replaced.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StoreError {
    /// Returns whether this error belongs to the load path.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::Read { .. } | Self::Parse { .. } | Self::Validation { .. }
        )
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => write!(
                f,
                "`{}` is not a valid student list: {source}",
                path.display()
            ),
            Self::Validation { index, source } => {
                write!(f, "invalid student at entry {index}: {source}")
            }
            Self::Encode(err) => write!(f, "failed to encode students: {err}"),
            Self::Write { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Validation { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
            Self::Write { source, .. } => Some(source),
        }
    }
}

/// Storage interface for the full student collection.
pub trait StudentStore {
    fn load_all(&self) -> StoreResult<Vec<Student>>;
    fn save_all(&self, students: &[Student]) -> StoreResult<()>;
}
