//! Student use-case service.
//!
//! # Responsibility
//! - Provide id-addressed add/replace/delete/get/list entry points.
//! - Resolve user-typed selectors (id, id prefix, name) to one student.
//!
//! # Invariants
//! - Every call is one reload-mutate-save cycle over the full collection.
//! - Replacement keeps the student's position in the collection.
//! - A selector matching more than one student is rejected, never guessed.

use crate::model::student::{Student, StudentId};
use crate::store::{StoreError, StudentStore};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Shortest id prefix accepted by `resolve`.
pub const MIN_ID_PREFIX_LEN: usize = 4;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error for student use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// No student carries this id.
    NotFound(StudentId),
    /// A student with this id already exists.
    DuplicateId(StudentId),
    /// Selector matched no student.
    NoMatch(String),
    /// Selector matched several students.
    AmbiguousSelector {
        selector: String,
        candidates: Vec<StudentId>,
    },
    /// Load/save failure.
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::DuplicateId(id) => write!(f, "student id already exists: {id}"),
            Self::NoMatch(selector) => write!(f, "no student matches `{selector}`"),
            Self::AmbiguousSelector {
                selector,
                candidates,
            } => {
                let ids = candidates
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "`{selector}` matches {} students ({ids}); use an id instead",
                    candidates.len()
                )
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Use-case service over a whole-collection store.
pub struct StudentService<S: StudentStore> {
    store: S,
}

impl<S: StudentStore> StudentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the full collection in file order.
    pub fn list(&self) -> ServiceResult<Vec<Student>> {
        Ok(self.store.load_all()?)
    }

    pub fn get(&self, id: StudentId) -> ServiceResult<Option<Student>> {
        Ok(self
            .store
            .load_all()?
            .into_iter()
            .find(|student| student.id() == id))
    }

    /// Appends a student and persists the collection.
    pub fn add(&self, student: Student) -> ServiceResult<StudentId> {
        let mut students = self.store.load_all()?;
        let id = student.id();
        if students.iter().any(|existing| existing.id() == id) {
            return Err(ServiceError::DuplicateId(id));
        }

        students.push(student);
        self.store.save_all(&students)?;
        info!(
            "event=student_add module=service status=ok id={} count={}",
            id,
            students.len()
        );
        Ok(id)
    }

    /// Replaces the student sharing `replacement.id()` in place.
    ///
    /// Returns the previous value.
    pub fn replace(&self, replacement: Student) -> ServiceResult<Student> {
        let mut students = self.store.load_all()?;
        let id = replacement.id();
        let slot = students
            .iter_mut()
            .find(|existing| existing.id() == id)
            .ok_or(ServiceError::NotFound(id))?;

        let previous = std::mem::replace(slot, replacement);
        self.store.save_all(&students)?;
        info!("event=student_replace module=service status=ok id={id}");
        Ok(previous)
    }

    /// Removes a student by id and returns it.
    pub fn delete(&self, id: StudentId) -> ServiceResult<Student> {
        let mut students = self.store.load_all()?;
        let position = students
            .iter()
            .position(|student| student.id() == id)
            .ok_or(ServiceError::NotFound(id))?;

        let removed = students.remove(position);
        self.store.save_all(&students)?;
        info!(
            "event=student_delete module=service status=ok id={} count={}",
            id,
            students.len()
        );
        Ok(removed)
    }

    /// Resolves a selector against the current collection.
    pub fn resolve(&self, selector: &str) -> ServiceResult<Student> {
        let students = self.store.load_all()?;
        resolve_selector(&students, selector).cloned()
    }
}

/// Resolves a selector against an in-memory collection.
///
/// Accepted forms, checked together:
/// - a full id (exact match only),
/// - an id prefix of at least `MIN_ID_PREFIX_LEN` hex characters,
/// - an exact, case-sensitive name, as typed or with surrounding
///   whitespace trimmed.
pub fn resolve_selector<'a>(
    students: &'a [Student],
    selector: &str,
) -> ServiceResult<&'a Student> {
    let raw = selector;
    let selector = raw.trim();
    let name_matches = |student: &&Student| {
        student.name() == raw || (!selector.is_empty() && student.name() == selector)
    };

    if let Ok(id) = Uuid::parse_str(selector) {
        if let Some(student) = students.iter().find(|student| student.id() == id) {
            return Ok(student);
        }
        // Names shaped like ids still resolve by name.
        let matches: Vec<&Student> = students.iter().filter(name_matches).collect();
        return pick_one(matches, selector).map_err(|err| match err {
            ServiceError::NoMatch(_) => ServiceError::NotFound(id),
            other => other,
        });
    }

    let prefix = selector.to_ascii_lowercase();
    let prefix_usable = prefix.len() >= MIN_ID_PREFIX_LEN
        && prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-');

    let matches: Vec<&Student> = students
        .iter()
        .filter(|student| {
            name_matches(student)
                || (prefix_usable && student.id().to_string().starts_with(prefix.as_str()))
        })
        .collect();

    pick_one(matches, selector)
}

fn pick_one<'a>(matches: Vec<&'a Student>, selector: &str) -> ServiceResult<&'a Student> {
    match matches.as_slice() {
        [] => Err(ServiceError::NoMatch(selector.to_string())),
        [student] => Ok(*student),
        many => Err(ServiceError::AmbiguousSelector {
            selector: selector.to_string(),
            candidates: many.iter().map(|student| student.id()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_selector, ServiceError};
    use crate::model::student::Student;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn student(id: &str, name: &str) -> Student {
        Student::with_id(
            Uuid::parse_str(id).unwrap(),
            name,
            15,
            9,
            BTreeMap::new(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn resolve_accepts_full_id_prefix_and_name() {
        let students = vec![
            student("aaaa1111-2222-4333-8444-555555555555", "Ada"),
            student("bbbb1111-2222-4333-8444-555555555555", "Grace"),
        ];

        let by_id = resolve_selector(&students, "bbbb1111-2222-4333-8444-555555555555").unwrap();
        assert_eq!(by_id.name(), "Grace");

        let by_prefix = resolve_selector(&students, "AAAA1").unwrap();
        assert_eq!(by_prefix.name(), "Ada");

        let by_name = resolve_selector(&students, " Grace ").unwrap();
        assert_eq!(by_name.name(), "Grace");
    }

    #[test]
    fn resolve_rejects_duplicate_names_and_short_prefixes() {
        let students = vec![
            student("aaaa1111-2222-4333-8444-555555555555", "Sam"),
            student("aaab1111-2222-4333-8444-555555555555", "Sam"),
        ];

        let err = resolve_selector(&students, "Sam").unwrap_err();
        assert!(matches!(
            err,
            ServiceError::AmbiguousSelector { ref candidates, .. } if candidates.len() == 2
        ));

        let err = resolve_selector(&students, "aaa").unwrap_err();
        assert!(matches!(err, ServiceError::NoMatch(_)));

        let found = resolve_selector(&students, "aaaa").unwrap();
        assert_eq!(found.id(), students[0].id());
    }

    #[test]
    fn resolve_matches_names_with_surrounding_whitespace() {
        let students = vec![
            student("aaaa1111-2222-4333-8444-555555555555", " Ada "),
            student("bbbb1111-2222-4333-8444-555555555555", "Grace"),
        ];

        let padded = resolve_selector(&students, " Ada ").unwrap();
        assert_eq!(padded.id(), students[0].id());

        let trimmed = resolve_selector(&students, "Ada").unwrap();
        assert_eq!(trimmed.id(), students[0].id());

        let err = resolve_selector(&students, "   ").unwrap_err();
        assert!(matches!(err, ServiceError::NoMatch(ref selector) if selector.is_empty()));
    }

    #[test]
    fn resolve_id_shaped_name_shared_by_two_students_is_ambiguous() {
        let name = "cccc1111-2222-4333-8444-555555555555";
        let students = vec![
            student("aaaa1111-2222-4333-8444-555555555555", name),
            student("bbbb1111-2222-4333-8444-555555555555", name),
            student("dddd1111-2222-4333-8444-555555555555", "Grace"),
        ];

        let err = resolve_selector(&students, name).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::AmbiguousSelector { ref candidates, .. }
                if candidates == &vec![students[0].id(), students[1].id()]
        ));

        let single = &students[1..];
        let found = resolve_selector(single, name).unwrap();
        assert_eq!(found.id(), single[0].id());
    }

    #[test]
    fn resolve_unknown_full_id_reports_not_found() {
        let students = vec![student("aaaa1111-2222-4333-8444-555555555555", "Ada")];
        let missing = Uuid::parse_str("cccc1111-2222-4333-8444-555555555555").unwrap();

        let err = resolve_selector(&students, &missing.to_string()).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(id) if id == missing));
    }
}
