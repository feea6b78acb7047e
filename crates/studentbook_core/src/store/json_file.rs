//! JSON file implementation of the student collection store.
//!
//! # Responsibility
//! - Read and write the whole collection as one JSON array.
//! - Route every persisted entry through `Student` validation on load.
//!
//! # Invariants
//! - Saves go through a temp file in the target directory followed by a
//!   rename, so readers never observe a half-written file.
//! - Log events carry counts and durations only, never record contents.

use super::{StoreError, StoreResult, StudentStore};
use crate::model::student::{legacy_student_id, Student, StudentRecord};
use log::{error, info};
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

/// File name used when no data path is configured.
pub const DEFAULT_DATA_FILE: &str = "students.json";

const JSON_INDENT: &[u8] = b"    ";

/// Student store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StudentStore for JsonFileStore {
    fn load_all(&self) -> StoreResult<Vec<Student>> {
        let started_at = Instant::now();

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("event=store_load module=store status=ok source=missing count=0");
                return Ok(Vec::new());
            }
            Err(source) => {
                error!(
                    "event=store_load module=store status=error duration_ms={} error_code=read_failed error={}",
                    started_at.elapsed().as_millis(),
                    source
                );
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match decode_students(&self.path, &bytes) {
            Ok(students) => {
                info!(
                    "event=store_load module=store status=ok source=file count={} duration_ms={}",
                    students.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(students)
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    error_code(&err),
                    err
                );
                Err(err)
            }
        }
    }

    fn save_all(&self, students: &[Student]) -> StoreResult<()> {
        let started_at = Instant::now();

        let result = encode_students(students).and_then(|bytes| {
            replace_file(&self.path, &bytes).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
        });

        match &result {
            Ok(()) => info!(
                "event=store_save module=store status=ok count={} duration_ms={}",
                students.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_save module=store status=error count={} duration_ms={} error_code={} error={}",
                students.len(),
                started_at.elapsed().as_millis(),
                error_code(err),
                err
            ),
        }

        result
    }
}

fn decode_students(path: &Path, bytes: &[u8]) -> StoreResult<Vec<Student>> {
    let records: Vec<StudentRecord> =
        serde_json::from_slice(bytes).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, mut record)| {
            if record.id.is_none() {
                record.id = Some(legacy_student_id(index, &record.name));
            }
            Student::try_from(record).map_err(|source| StoreError::Validation { index, source })
        })
        .collect()
}

fn encode_students(students: &[Student]) -> StoreResult<Vec<u8>> {
    let records: Vec<StudentRecord> = students.iter().cloned().map(StudentRecord::from).collect();

    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    records
        .serialize(&mut serializer)
        .map_err(StoreError::Encode)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn replace_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

fn error_code(err: &StoreError) -> &'static str {
    match err {
        StoreError::Read { .. } => "read_failed",
        StoreError::Parse { .. } => "parse_failed",
        StoreError::Validation { .. } => "invalid_entry",
        StoreError::Encode(_) => "encode_failed",
        StoreError::Write { .. } => "write_failed",
    }
}

#[cfg(test)]
mod tests {
    use super::{encode_students, replace_file};
    use crate::model::student::Student;
    use std::collections::BTreeMap;

    #[test]
    fn encode_uses_four_space_indent_and_trailing_newline() {
        let student = Student::new(
            "Ada",
            16,
            10,
            BTreeMap::from([("Math".to_string(), 90)]),
            None,
        )
        .unwrap();

        let text = String::from_utf8(encode_students(&[student]).unwrap()).unwrap();
        assert!(text.starts_with("[\n    {\n        \""));
        assert!(text.ends_with("]\n"));
        assert!(text.contains("\"address\": null"));
    }

    #[test]
    fn replace_file_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("students.json");

        replace_file(&path, b"[]\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]\n");
    }
}
