//! Read-only projections over the in-memory collection.
//!
//! # Responsibility
//! - Filter students by name substring and class level.
//! - Aggregate per-subject class averages.
//! - Render tables and horizontal text bar charts.

use std::collections::BTreeMap;
use studentbook_core::{Student, StudentId, MAX_MARK};

const BAR_WIDTH: usize = 40;
const BAR_GLYPH: char = '#';
const SHORT_ID_LEN: usize = 8;

/// Search/filter state; the default matches every student.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    /// Case-insensitive substring of the name; empty matches all.
    pub name_contains: String,
    /// Exact class level; `0` matches all.
    pub class_level: u32,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        let needle = self.name_contains.trim().to_lowercase();
        let name_ok = needle.is_empty() || student.name().to_lowercase().contains(&needle);
        let class_ok = self.class_level == 0 || student.class_level() == self.class_level;
        name_ok && class_ok
    }

    pub fn apply<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        students
            .iter()
            .filter(|student| self.matches(student))
            .collect()
    }
}

/// Class-wide average for one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectAverage {
    pub subject: String,
    pub average: f64,
}

/// Averages each subject over the students that have it, sorted by subject.
pub fn subject_averages(students: &[Student]) -> Vec<SubjectAverage> {
    let mut totals: BTreeMap<&str, (i64, usize)> = BTreeMap::new();
    for student in students {
        for (subject, mark) in student.marks() {
            let entry = totals.entry(subject).or_insert((0, 0));
            entry.0 += mark;
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(subject, (total, count))| SubjectAverage {
            subject: subject.to_string(),
            average: total as f64 / count as f64,
        })
        .collect()
}

pub fn short_id(id: StudentId) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

/// Renders one line per student: short id, name, age, class, average, grade.
pub fn render_table(students: &[&Student]) -> String {
    let name_width = students
        .iter()
        .map(|student| student.name().chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut lines = vec![format!(
        "{:<8}  {:<name_width$}  {:>3}  {:>5}  {:>7}  GRADE",
        "ID", "NAME", "AGE", "CLASS", "AVERAGE"
    )];
    for student in students {
        lines.push(format!(
            "{:<8}  {:<name_width$}  {:>3}  {:>5}  {:>7.2}  {}",
            short_id(student.id()),
            student.name(),
            student.age(),
            student.class_level(),
            student.average(),
            student.grade()
        ));
    }
    lines.join("\n")
}

/// Renders `(label, value)` rows as bars scaled against the mark ceiling.
pub fn render_bar_chart(rows: &[(String, f64)]) -> String {
    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|(label, value)| {
            let filled = bar_length(*value);
            format!(
                "{label:<label_width$} | {}{} {value:.2}",
                BAR_GLYPH.to_string().repeat(filled),
                " ".repeat(BAR_WIDTH - filled),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Bar rows for one student's marks.
pub fn student_chart_rows(student: &Student) -> Vec<(String, f64)> {
    student
        .marks()
        .map(|(subject, mark)| (subject.to_string(), mark as f64))
        .collect()
}

/// Bar rows for per-subject class averages.
pub fn average_chart_rows(averages: &[SubjectAverage]) -> Vec<(String, f64)> {
    averages
        .iter()
        .map(|entry| (entry.subject.clone(), entry.average))
        .collect()
}

fn bar_length(value: f64) -> usize {
    let ratio = (value / MAX_MARK as f64).clamp(0.0, 1.0);
    (ratio * BAR_WIDTH as f64).round() as usize
}
