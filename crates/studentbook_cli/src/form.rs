//! Explicit form state for creating and editing students.
//!
//! # Responsibility
//! - Hold not-yet-submitted field values, including a growable list of
//!   subject rows.
//! - Enforce input-boundary bounds (name, age, class level) that the core
//!   model leaves to callers, then delegate mark checks to the model.
//!
//! # Invariants
//! - Rows with a blank subject name are ignored on submit.
//! - Submit reports every offending field at once.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use studentbook_core::{validate_marks, FieldIssue, Student, StudentId, StudentValidationError};

pub const AGE_RANGE: RangeInclusive<i64> = 1..=100;
pub const CLASS_LEVEL_RANGE: RangeInclusive<i64> = 1..=12;
pub const DEFAULT_AGE: i64 = 16;
pub const DEFAULT_CLASS_LEVEL: i64 = 10;
pub const DEFAULT_SUBJECT_ROWS: usize = 3;

/// One subject input row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectRow {
    pub name: String,
    pub mark: i64,
}

/// Mutable form values owned by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentForm {
    pub name: String,
    pub age: i64,
    pub class_level: i64,
    pub address: String,
    pub subjects: Vec<SubjectRow>,
}

impl Default for StudentForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: DEFAULT_AGE,
            class_level: DEFAULT_CLASS_LEVEL,
            address: String::new(),
            subjects: vec![SubjectRow::default(); DEFAULT_SUBJECT_ROWS],
        }
    }
}

impl StudentForm {
    /// Prefills the form from a stored student.
    pub fn from_student(student: &Student) -> Self {
        Self {
            name: student.name().to_string(),
            age: i64::from(student.age()),
            class_level: i64::from(student.class_level()),
            address: student.address().unwrap_or_default().to_string(),
            subjects: student
                .marks()
                .map(|(name, mark)| SubjectRow {
                    name: name.to_string(),
                    mark,
                })
                .collect(),
        }
    }

    /// Appends one blank subject row.
    pub fn add_subject_row(&mut self) {
        self.subjects.push(SubjectRow::default());
    }

    /// Sets a subject mark, reusing an existing row or the first blank one.
    pub fn set_subject(&mut self, name: &str, mark: i64) {
        let name = name.trim();
        if let Some(row) = self.subjects.iter_mut().find(|row| row.name.trim() == name) {
            row.mark = mark;
            return;
        }
        if let Some(row) = self.subjects.iter_mut().find(|row| row.name.trim().is_empty()) {
            row.name = name.to_string();
            row.mark = mark;
            return;
        }
        self.add_subject_row();
        if let Some(row) = self.subjects.last_mut() {
            row.name = name.to_string();
            row.mark = mark;
        }
    }

    /// Collects non-blank rows; a repeated subject name keeps the last mark.
    pub fn subject_map(&self) -> BTreeMap<String, i64> {
        self.subjects
            .iter()
            .filter(|row| !row.name.trim().is_empty())
            .map(|row| (row.name.trim().to_string(), row.mark))
            .collect()
    }

    /// Validates the form and builds a new student.
    ///
    /// At least one subject is required for new students.
    pub fn submit_new(&self) -> Result<Student, StudentValidationError> {
        self.submit(None)
    }

    /// Validates the form and builds a replacement for `id`.
    pub fn submit_edit(&self, id: StudentId) -> Result<Student, StudentValidationError> {
        self.submit(Some(id))
    }

    fn submit(&self, id: Option<StudentId>) -> Result<Student, StudentValidationError> {
        let subjects = self.subject_map();

        let mut issues = self.field_issues();
        if id.is_none() && subjects.is_empty() {
            issues.push(FieldIssue::new("subjects", "Please enter at least one subject"));
        }
        if let Err(err) = validate_marks(&subjects) {
            issues.extend(err.into_issues());
        }
        StudentValidationError::check(issues)?;

        // Ranges above guarantee both values fit.
        let age = u32::try_from(self.age).unwrap_or_default();
        let class_level = u32::try_from(self.class_level).unwrap_or_default();
        let address = match self.address.trim() {
            "" => None,
            value => Some(value.to_string()),
        };

        match id {
            Some(id) => Student::with_id(
                id,
                self.name.trim(),
                age,
                class_level,
                subjects,
                address,
            ),
            None => Student::new(self.name.trim(), age, class_level, subjects, address),
        }
    }

    fn field_issues(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(FieldIssue::new("name", "Name must not be empty"));
        }
        if !AGE_RANGE.contains(&self.age) {
            issues.push(FieldIssue::new(
                "age",
                format!(
                    "Age must be between {} and {} (got {})",
                    AGE_RANGE.start(),
                    AGE_RANGE.end(),
                    self.age
                ),
            ));
        }
        if !CLASS_LEVEL_RANGE.contains(&self.class_level) {
            issues.push(FieldIssue::new(
                "class_level",
                format!(
                    "Class level must be between {} and {} (got {})",
                    CLASS_LEVEL_RANGE.start(),
                    CLASS_LEVEL_RANGE.end(),
                    self.class_level
                ),
            ));
        }
        issues
    }
}

/// Parses a `NAME=MARK` argument.
pub fn parse_subject_pair(raw: &str) -> Result<(String, i64), String> {
    let (name, mark) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=MARK, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("subject name is empty in `{raw}`"));
    }
    let mark = mark
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("mark must be a whole number in `{raw}`"))?;
    Ok((name.to_string(), mark))
}
