//! Command handlers.
//!
//! # Responsibility
//! - Map each subcommand onto one service call plus rendering.
//! - Keep all output on the provided writer so handlers stay testable.
//!
//! # Invariants
//! - Mutating commands run one reload-mutate-save cycle.
//! - Validation failures are returned untouched so the caller can list
//!   every issue.

use crate::args::{AddArgs, Command, EditArgs, ListArgs};
use crate::form::StudentForm;
use crate::view::{
    average_chart_rows, render_bar_chart, render_table, short_id, student_chart_rows,
    subject_averages, StudentFilter,
};
use anyhow::{Context, Result};
use std::io::Write;
use studentbook_core::{Student, StudentService, StudentStore};

/// Runs one subcommand against the service, writing user output to `out`.
pub fn execute<S: StudentStore>(
    command: Command,
    service: &StudentService<S>,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Add(args) => add(args, service, out),
        Command::List(args) => list(args, service, out),
        Command::Show(args) => {
            let student = service.resolve(&args.selector)?;
            show(&student, out)
        }
        Command::Edit(args) => edit(args, service, out),
        Command::Delete(args) => {
            let target = service.resolve(&args.selector)?;
            let removed = service.delete(target.id())?;
            writeln!(
                out,
                "Deleted student {} ({}).",
                removed.name(),
                short_id(removed.id())
            )?;
            Ok(())
        }
        Command::Chart(args) => {
            let student = service.resolve(&args.selector)?;
            chart(&student, out)
        }
        Command::Averages => averages(service, out),
    }
}

fn add<S: StudentStore>(
    args: AddArgs,
    service: &StudentService<S>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut form = StudentForm {
        name: args.name,
        age: args.age,
        class_level: args.class_level,
        address: args.address.unwrap_or_default(),
        subjects: Vec::new(),
    };
    for (subject, mark) in &args.subjects {
        form.set_subject(subject, *mark);
    }

    let student = form.submit_new()?;
    let id = service.add(student.clone()).context("failed to save student")?;
    writeln!(out, "Saved student {} ({}).", student.name(), short_id(id))?;
    show(&student, out)
}

fn list<S: StudentStore>(
    args: ListArgs,
    service: &StudentService<S>,
    out: &mut dyn Write,
) -> Result<()> {
    let students = service.list()?;
    let filter = StudentFilter {
        name_contains: args.name.unwrap_or_default(),
        class_level: args.class_level,
    };

    let matched = filter.apply(&students);
    if matched.is_empty() {
        writeln!(out, "No students found.")?;
        return Ok(());
    }
    writeln!(out, "{}", render_table(&matched))?;
    Ok(())
}

fn edit<S: StudentStore>(
    args: EditArgs,
    service: &StudentService<S>,
    out: &mut dyn Write,
) -> Result<()> {
    let current = service.resolve(&args.selector)?;

    let mut form = StudentForm::from_student(&current);
    if let Some(name) = args.name {
        form.name = name;
    }
    if let Some(age) = args.age {
        form.age = age;
    }
    if let Some(class_level) = args.class_level {
        form.class_level = class_level;
    }
    if let Some(address) = args.address {
        form.address = address;
    }
    if args.clear_address {
        form.address.clear();
    }
    for (subject, mark) in &args.marks {
        form.set_subject(subject, *mark);
    }

    let updated = form.submit_edit(current.id())?;
    service
        .replace(updated.clone())
        .context("failed to save student")?;
    writeln!(
        out,
        "Updated student {} ({}).",
        updated.name(),
        short_id(updated.id())
    )?;
    show(&updated, out)
}

fn show(student: &Student, out: &mut dyn Write) -> Result<()> {
    let json = serde_json::to_string_pretty(student)?;
    writeln!(out, "{json}")?;
    writeln!(
        out,
        "average: {:.2}  grade: {}",
        student.average(),
        student.grade()
    )?;
    Ok(())
}

fn chart(student: &Student, out: &mut dyn Write) -> Result<()> {
    let rows = student_chart_rows(student);
    if rows.is_empty() {
        writeln!(out, "{} has no recorded subjects.", student.name())?;
        return Ok(());
    }
    writeln!(out, "Marks for {}", student.name())?;
    writeln!(out, "{}", render_bar_chart(&rows))?;
    Ok(())
}

fn averages<S: StudentStore>(service: &StudentService<S>, out: &mut dyn Write) -> Result<()> {
    let students = service.list()?;
    let averages = subject_averages(&students);
    if averages.is_empty() {
        writeln!(out, "No students available to visualize yet.")?;
        return Ok(());
    }
    writeln!(out, "Class average per subject")?;
    writeln!(out, "{}", render_bar_chart(&average_chart_rows(&averages)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::execute;
    use crate::args::Cli;
    use clap::Parser;
    use studentbook_core::{
        JsonFileStore, ServiceError, StudentService, StudentStore, StudentValidationError,
    };
    use tempfile::TempDir;

    fn open_service() -> (TempDir, StudentService<JsonFileStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("students.json"));
        (dir, StudentService::new(store))
    }

    fn run(service: &StudentService<JsonFileStore>, argv: &[&str]) -> anyhow::Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("studentbook").chain(argv.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        execute(cli.command, service, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn add_then_list_shows_student_with_grade() {
        let (_dir, service) = open_service();

        let output = run(
            &service,
            &["add", "--name", "Ada", "--subject", "Math=80", "--subject", "Eng=60"],
        )
        .unwrap();
        assert!(output.starts_with("Saved student Ada"));
        assert!(output.contains("average: 70.00  grade: C"));

        let listing = run(&service, &["list"]).unwrap();
        assert!(listing.contains("Ada"));
        assert!(listing.contains("70.00"));
    }

    #[test]
    fn add_without_subjects_is_rejected_and_not_saved() {
        let (_dir, service) = open_service();

        let err = run(&service, &["add", "--name", "Ada"]).unwrap_err();
        let validation = err.downcast_ref::<StudentValidationError>().unwrap();
        assert!(validation.mentions("subjects"));
        assert!(service.store().load_all().unwrap().is_empty());
    }

    #[test]
    fn add_with_out_of_range_mark_reports_subject() {
        let (_dir, service) = open_service();

        let err = run(&service, &["add", "--name", "Ada", "--subject", "Math=101"]).unwrap_err();
        let validation = err.downcast_ref::<StudentValidationError>().unwrap();
        assert!(validation.to_string().contains("Math"));
    }

    #[test]
    fn list_filters_by_name_and_class() {
        let (_dir, service) = open_service();
        run(&service, &["add", "--name", "Ada", "--class", "9", "--subject", "Math=90"]).unwrap();
        run(&service, &["add", "--name", "Bo", "--class", "10", "--subject", "Math=50"]).unwrap();

        let by_class = run(&service, &["list", "--class", "9"]).unwrap();
        assert!(by_class.contains("Ada"));
        assert!(!by_class.contains("Bo"));

        let none = run(&service, &["list", "--name", "zed"]).unwrap();
        assert_eq!(none.trim(), "No students found.");
    }

    #[test]
    fn edit_updates_in_place_and_keeps_id() {
        let (_dir, service) = open_service();
        run(&service, &["add", "--name", "Ada", "--subject", "Math=80"]).unwrap();
        run(&service, &["add", "--name", "Bo", "--subject", "Math=50"]).unwrap();
        let before = service.list().unwrap();

        let output = run(
            &service,
            &["edit", "Ada", "--name", "Ada L", "--mark", "Math=95", "--mark", "Art=85"],
        )
        .unwrap();
        assert!(output.starts_with("Updated student Ada L"));

        let after = service.list().unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].id(), before[0].id());
        assert_eq!(after[0].name(), "Ada L");
        assert_eq!(after[0].mark("Math"), Some(95));
        assert_eq!(after[0].mark("Art"), Some(85));
        assert_eq!(after[1], before[1]);
    }

    #[test]
    fn edit_with_invalid_mark_leaves_record_untouched() {
        let (_dir, service) = open_service();
        run(&service, &["add", "--name", "Ada", "--subject", "Math=80"]).unwrap();
        let before = service.list().unwrap();

        let err = run(&service, &["edit", "Ada", "--mark", "Math=150"]).unwrap_err();
        assert!(err.downcast_ref::<StudentValidationError>().is_some());
        assert_eq!(service.list().unwrap(), before);
    }

    #[test]
    fn delete_by_ambiguous_name_is_refused() {
        let (_dir, service) = open_service();
        run(&service, &["add", "--name", "Sam", "--subject", "Math=80"]).unwrap();
        run(&service, &["add", "--name", "Sam", "--subject", "Math=60"]).unwrap();

        let err = run(&service, &["delete", "Sam"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::AmbiguousSelector { .. })
        ));

        let target = service.list().unwrap()[1].id().to_string();
        let output = run(&service, &["delete", &target]).unwrap();
        assert!(output.starts_with("Deleted student Sam"));
        assert_eq!(service.list().unwrap().len(), 1);
    }

    #[test]
    fn edit_and_delete_work_on_files_without_ids() {
        let (_dir, service) = open_service();
        let path = service.store().path().to_path_buf();
        std::fs::write(
            &path,
            r#"[{"name":"Ada","age":16,"class_level":10,"subjects":{"Math":80},"address":null},
{"name":"Bo","age":15,"class_level":9,"subjects":{"Math":60},"address":null}]"#,
        )
        .unwrap();

        let output = run(&service, &["edit", "Ada", "--mark", "Math=90"]).unwrap();
        assert!(output.starts_with("Updated student Ada"));

        let output = run(&service, &["delete", "Bo"]).unwrap();
        assert!(output.starts_with("Deleted student Bo"));

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Ada");
        assert_eq!(items[0]["subjects"]["Math"], 90);
        assert!(items[0]["id"].is_string());

        let output = run(&service, &["delete", "Ada"]).unwrap();
        assert!(output.starts_with("Deleted student Ada"));
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn chart_and_averages_render_bars() {
        let (_dir, service) = open_service();
        assert_eq!(
            run(&service, &["averages"]).unwrap().trim(),
            "No students available to visualize yet."
        );

        run(&service, &["add", "--name", "Ada", "--subject", "Math=80", "--subject", "Eng=60"])
            .unwrap();
        run(&service, &["add", "--name", "Bo", "--subject", "Math=90"]).unwrap();

        let chart = run(&service, &["chart", "Ada"]).unwrap();
        assert!(chart.starts_with("Marks for Ada"));
        assert!(chart.contains("Math | "));
        assert!(chart.contains("80.00"));

        let averages = run(&service, &["averages"]).unwrap();
        assert!(averages.contains("Eng  | "));
        assert!(averages.contains("85.00"));
    }

    #[test]
    fn show_unknown_selector_fails() {
        let (_dir, service) = open_service();
        let err = run(&service, &["show", "Nobody"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::NoMatch(_))
        ));
    }
}
