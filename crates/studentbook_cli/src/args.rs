//! Command-line surface and configuration.

use crate::form::{parse_subject_pair, DEFAULT_AGE, DEFAULT_CLASS_LEVEL};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use studentbook_core::DEFAULT_DATA_FILE;

#[derive(Debug, Parser)]
#[command(
    name = "studentbook",
    version,
    about = "Create, edit, filter and chart student records kept in a JSON file"
)]
pub struct Cli {
    /// JSON file holding the student list.
    #[arg(long, global = true, env = "STUDENTBOOK_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// Directory for rolling log files; logging is off when unset.
    #[arg(long, global = true, env = "STUDENTBOOK_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "STUDENTBOOK_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a new student.
    Add(AddArgs),
    /// List students, optionally filtered.
    List(ListArgs),
    /// Print one student's full record.
    Show(SelectArgs),
    /// Edit an existing student.
    Edit(EditArgs),
    /// Delete a student.
    Delete(SelectArgs),
    /// Chart one student's marks.
    Chart(SelectArgs),
    /// Chart the class average of every subject.
    Averages,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value_t = DEFAULT_AGE, allow_negative_numbers = true)]
    pub age: i64,

    #[arg(long = "class", default_value_t = DEFAULT_CLASS_LEVEL, allow_negative_numbers = true)]
    pub class_level: i64,

    #[arg(long)]
    pub address: Option<String>,

    /// Subject and mark, repeatable: --subject Math=90 --subject "Art=75"
    #[arg(long = "subject", value_name = "NAME=MARK", value_parser = parse_subject_pair)]
    pub subjects: Vec<(String, i64)>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive name substring.
    #[arg(long)]
    pub name: Option<String>,

    /// Class level; 0 lists every class.
    #[arg(long = "class", default_value_t = 0)]
    pub class_level: u32,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Student id, id prefix (4+ characters) or exact name.
    pub selector: String,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Student id, id prefix (4+ characters) or exact name.
    pub selector: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub age: Option<i64>,

    #[arg(long = "class", allow_negative_numbers = true)]
    pub class_level: Option<i64>,

    #[arg(long, conflicts_with = "clear_address")]
    pub address: Option<String>,

    #[arg(long)]
    pub clear_address: bool,

    /// Set or add a subject mark, repeatable.
    #[arg(long = "mark", value_name = "NAME=MARK", value_parser = parse_subject_pair)]
    pub marks: Vec<(String, i64)>,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_parses_repeated_subjects_and_defaults() {
        let cli = Cli::try_parse_from([
            "studentbook",
            "add",
            "--name",
            "Ada",
            "--subject",
            "Math=90",
            "--subject",
            "Eng=75",
        ])
        .unwrap();

        match cli.command {
            Command::Add(args) => {
                assert_eq!(args.age, 16);
                assert_eq!(args.class_level, 10);
                assert_eq!(
                    args.subjects,
                    vec![("Math".to_string(), 90), ("Eng".to_string(), 75)]
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn edit_rejects_address_with_clear_address() {
        let result = Cli::try_parse_from([
            "studentbook",
            "edit",
            "Ada",
            "--address",
            "x",
            "--clear-address",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_subject_pair_is_rejected() {
        let result = Cli::try_parse_from(["studentbook", "add", "--name", "Ada", "--subject", "Math"]);
        assert!(result.is_err());
    }
}
