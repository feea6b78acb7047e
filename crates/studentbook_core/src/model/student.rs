//! Student domain model.
//!
//! # Responsibility
//! - Define the canonical student record persisted by the collection store.
//! - Derive per-student metrics (average mark, letter grade) on demand.
//!
//! # Invariants
//! - Every subject mark is within `MIN_MARK..=MAX_MARK`.
//! - `id` is never the nil UUID.
//! - Age, class level and name are not range-checked here; the input form
//!   owns those bounds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable surrogate identifier for one student.
pub type StudentId = Uuid;

/// Lowest accepted subject mark.
pub const MIN_MARK: i64 = 0;
/// Highest accepted subject mark.
pub const MAX_MARK: i64 = 100;

/// Namespace for ids derived from entries persisted without one.
const LEGACY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2b7e_5d3a_4c81_9e20_7a4b_d5f3_0c19);

/// Derives the id of an entry stored without one.
///
/// Depends only on the entry's position and name, so repeated loads of the
/// same file agree until the next save writes real ids.
pub fn legacy_student_id(index: usize, name: &str) -> StudentId {
    Uuid::new_v5(&LEGACY_ID_NAMESPACE, format!("{index}:{name}").as_bytes())
}

/// Letter grade derived from a student's average mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Maps an average mark onto the grade bands.
    ///
    /// Lower bounds are inclusive: `90.0` is `A`, `89.999` is `B`.
    pub fn from_average(average: f64) -> Self {
        if average >= 90.0 {
            Self::A
        } else if average >= 80.0 {
            Self::B
        } else if average >= 70.0 {
            Self::C
        } else if average >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One offending field reported by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Field path, e.g. `subjects.Math` or `age`.
    pub field: String,
    /// Human-readable message suitable for direct display.
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation failure carrying every offending field.
///
/// # Invariants
/// - `issues` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentValidationError {
    issues: Vec<FieldIssue>,
}

impl StudentValidationError {
    /// Returns `Ok(())` for an empty issue list, an error otherwise.
    pub fn check(issues: Vec<FieldIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self { issues })
        }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<FieldIssue> {
        self.issues
    }

    /// Returns one display line per issue.
    pub fn messages(&self) -> Vec<String> {
        self.issues
            .iter()
            .map(|issue| issue.message.clone())
            .collect()
    }

    /// Returns whether any issue targets `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl Error for StudentValidationError {}

/// Checks every mark against `MIN_MARK..=MAX_MARK`.
///
/// All out-of-range subjects are reported, not only the first one.
pub fn validate_marks(subjects: &BTreeMap<String, i64>) -> Result<(), StudentValidationError> {
    let issues = subjects
        .iter()
        .filter(|(_, mark)| !(MIN_MARK..=MAX_MARK).contains(*mark))
        .map(|(subject, mark)| {
            FieldIssue::new(
                format!("subjects.{subject}"),
                format!(
                    "Marks for {subject} must be between {MIN_MARK} and {MAX_MARK} (got {mark})"
                ),
            )
        })
        .collect();
    StudentValidationError::check(issues)
}

/// Validated student record.
///
/// Fields are private so every value in circulation has passed
/// `validate_marks`. Updating a student means constructing a new one with
/// the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StudentRecord", into = "StudentRecord")]
pub struct Student {
    id: StudentId,
    name: String,
    age: u32,
    class_level: u32,
    subjects: BTreeMap<String, i64>,
    address: Option<String>,
}

impl Student {
    /// Creates a validated student with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        age: u32,
        class_level: u32,
        subjects: BTreeMap<String, i64>,
        address: Option<String>,
    ) -> Result<Self, StudentValidationError> {
        Self::with_id(Uuid::new_v4(), name, age, class_level, subjects, address)
    }

    /// Creates a validated student keeping a caller-provided id.
    ///
    /// Used by updates and by deserialization of persisted records.
    pub fn with_id(
        id: StudentId,
        name: impl Into<String>,
        age: u32,
        class_level: u32,
        subjects: BTreeMap<String, i64>,
        address: Option<String>,
    ) -> Result<Self, StudentValidationError> {
        if id.is_nil() {
            return Err(StudentValidationError {
                issues: vec![FieldIssue::new("id", "Student id must not be nil")],
            });
        }
        validate_marks(&subjects)?;

        Ok(Self {
            id,
            name: name.into(),
            age,
            class_level,
            subjects,
            address,
        })
    }

    pub fn id(&self) -> StudentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn class_level(&self) -> u32 {
        self.class_level
    }

    pub fn subjects(&self) -> &BTreeMap<String, i64> {
        &self.subjects
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Returns the mark for one subject, if recorded.
    pub fn mark(&self, subject: &str) -> Option<i64> {
        self.subjects.get(subject).copied()
    }

    /// Enumerates `(subject, mark)` pairs in subject-name order.
    pub fn marks(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.subjects
            .iter()
            .map(|(subject, mark)| (subject.as_str(), *mark))
    }

    /// Arithmetic mean of all marks, `0.0` when no subject is recorded.
    pub fn average(&self) -> f64 {
        if self.subjects.is_empty() {
            return 0.0;
        }
        let total: i64 = self.subjects.values().sum();
        total as f64 / self.subjects.len() as f64
    }

    pub fn grade(&self) -> Grade {
        Grade::from_average(self.average())
    }
}

/// Persisted field-for-field shape of a student.
///
/// `id` is optional on read so files written before ids existed still load;
/// such entries get a derived id (see `legacy_student_id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StudentId>,
    pub name: String,
    pub age: u32,
    pub class_level: u32,
    pub subjects: BTreeMap<String, i64>,
    #[serde(default)]
    pub address: Option<String>,
}

impl TryFrom<StudentRecord> for Student {
    type Error = StudentValidationError;

    fn try_from(record: StudentRecord) -> Result<Self, Self::Error> {
        Student::with_id(
            record
                .id
                .unwrap_or_else(|| legacy_student_id(0, &record.name)),
            record.name,
            record.age,
            record.class_level,
            record.subjects,
            record.address,
        )
    }
}

impl From<Student> for StudentRecord {
    fn from(student: Student) -> Self {
        Self {
            id: Some(student.id),
            name: student.name,
            age: student.age,
            class_level: student.class_level,
            subjects: student.subjects,
            address: student.address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_marks, Grade};
    use std::collections::BTreeMap;

    #[test]
    fn grade_bands_use_inclusive_lower_bounds() {
        assert_eq!(Grade::from_average(100.0), Grade::A);
        assert_eq!(Grade::from_average(90.0), Grade::A);
        assert_eq!(Grade::from_average(89.999), Grade::B);
        assert_eq!(Grade::from_average(80.0), Grade::B);
        assert_eq!(Grade::from_average(70.0), Grade::C);
        assert_eq!(Grade::from_average(60.0), Grade::D);
        assert_eq!(Grade::from_average(59.999), Grade::F);
        assert_eq!(Grade::from_average(0.0), Grade::F);
    }

    #[test]
    fn validate_marks_reports_every_offending_subject() {
        let subjects = BTreeMap::from([
            ("Art".to_string(), -1),
            ("Math".to_string(), 101),
            ("Music".to_string(), 50),
        ]);

        let err = validate_marks(&subjects).unwrap_err();
        assert_eq!(err.issues().len(), 2);
        assert!(err.mentions("subjects.Art"));
        assert!(err.mentions("subjects.Math"));
        assert!(!err.mentions("subjects.Music"));
    }
}
