//! # Assignment editor command line
//!
//! Saves one assignment through the same submit cycle the editor screen
//! uses.
//!
//! ```text
//! assignment-editor <create|update> [FILE|-] [--from PATH]
//! ```
//!
//! The assignment is read as JSON from `FILE` (stdin when omitted or `-`).
//! The resulting notification is printed to stdout as JSON and the process
//! exits non-zero when it is a danger notification or the form is invalid.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use assignment_editor::{
    AssignmentEditor, AssignmentForm, EditMode, EditorConfig, EditorEvent, Error, EventChannel,
    HttpGateway, LogLevel, Notification, Result, SubmitReconciler,
};
use clap::{Parser, ValueEnum};
use error_stack::ResultExt;
use tracing::{error, info};

/// Save an assignment to the backend
#[derive(Parser, Debug)]
#[command(name = "assignment-editor")]
#[command(version, about, long_about = None)]
struct Args {
    /// Whether the record is new or already exists
    #[arg(value_enum)]
    mode: ModeArg,

    /// Assignment JSON file; stdin when omitted or `-`
    input: Option<PathBuf>,

    /// Path to return to after a successful save
    #[arg(long)]
    from: Option<String>,
}

impl Args {
    /// File to read, `None` meaning stdin
    fn input_file(&self) -> Option<&Path> {
        self.input
            .as_deref()
            .filter(|path| *path != Path::new("-"))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// POST a new assignment
    Create,
    /// PATCH an existing assignment by its `id`
    Update,
}

impl From<ModeArg> for EditMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Create => Self::Create,
            ModeArg::Update => Self::Update,
        }
    }
}

fn read_record(input: Option<&Path>) -> Result<AssignmentForm> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            error_stack::Report::new(Error::Input(format!("{}: {e}", path.display())))
        })?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| error_stack::Report::new(Error::Input(format!("stdin: {e}"))))?;
            buffer
        }
    };

    let json = serde_json::from_str(&raw)
        .map_err(|e| error_stack::Report::new(Error::failed_to("parse assignment JSON", e)))?;
    AssignmentForm::from_json(json).attach("while reading the assignment to save")
}

fn print_notification(notification: &Notification) {
    match serde_json::to_string(notification) {
        Ok(line) => println!("{line}"),
        Err(e) => error!("Failed to print notification: {e}"),
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = EditorConfig::from_env()?;
    let record = read_record(args.input_file())?;

    let (events, mut receiver) = EventChannel::new();
    let events = Arc::new(events);
    let reconciler = SubmitReconciler::new(
        Arc::new(HttpGateway::new(&config)),
        events.clone(),
        events,
        args.from,
    );
    let mut editor = AssignmentEditor::new(args.mode.into(), record, reconciler);
    info!("{} via {}", editor.title(), config.base_url);

    let submission = match editor.submit() {
        Ok(submission) => submission,
        Err(errors) => {
            for (field, messages) in &errors {
                eprintln!("{field}: {}", messages.join(", "));
            }
            return Ok(ExitCode::FAILURE);
        }
    };
    submission.settled().await;

    let mut exit_code = ExitCode::SUCCESS;
    while let Ok(event) = receiver.try_recv() {
        match event {
            EditorEvent::Notify(notification) => {
                if notification.is_danger() {
                    exit_code = ExitCode::FAILURE;
                }
                print_notification(&notification);
            }
            EditorEvent::Navigate(path) => info!("Editor would navigate to {path}"),
        }
    }
    Ok(exit_code)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    LogLevel::from_env().init_file_tracing();
    info!(
        "assignment-editor starting, log level {}",
        LogLevel::current()
    );

    match run(args).await {
        Ok(code) => code,
        Err(report) => {
            error!("{report:?}");
            eprintln!("{}", report.current_context());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "tests fail by panicking"
)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("assignment_editor_{name}_{}.json", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_mode_file_and_origin_are_parsed() {
        let args = Args::try_parse_from([
            "assignment-editor",
            "update",
            "hw1.json",
            "--from",
            "/courses/4/assignments",
        ])
        .unwrap();

        assert_eq!(args.mode, ModeArg::Update);
        assert_eq!(EditMode::from(args.mode), EditMode::Update);
        assert_eq!(args.input_file(), Some(Path::new("hw1.json")));
        assert_eq!(args.from.as_deref(), Some("/courses/4/assignments"));
    }

    #[test]
    fn test_missing_or_dash_input_reads_stdin() {
        let args = Args::try_parse_from(["assignment-editor", "create"]).unwrap();
        assert_eq!(args.input_file(), None);
        assert_eq!(args.from, None);

        let args = Args::try_parse_from(["assignment-editor", "create", "-"]).unwrap();
        assert_eq!(args.input_file(), None);
    }

    #[test]
    fn test_bad_command_lines_are_rejected() {
        let missing_mode = Args::try_parse_from(["assignment-editor"]).unwrap_err();
        assert_eq!(
            missing_mode.kind(),
            ErrorKind::MissingRequiredArgument
        );

        let unknown_mode = Args::try_parse_from(["assignment-editor", "delete"]).unwrap_err();
        assert_eq!(unknown_mode.kind(), ErrorKind::InvalidValue);

        let bare_from = Args::try_parse_from(["assignment-editor", "create", "--from"]).unwrap_err();
        assert_eq!(bare_from.kind(), ErrorKind::InvalidValue);

        let extra = Args::try_parse_from(["assignment-editor", "create", "a.json", "b.json"])
            .unwrap_err();
        assert_eq!(extra.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_record_is_read_from_file() {
        let path = scratch_file("valid", r#"{"id": 7, "name": "HW1", "has_teams": true}"#);

        let record = read_record(Some(path.as_path())).unwrap();

        assert_eq!(record.id, Some(7));
        assert_eq!(record.name, "HW1");
        assert!(record.has_teams);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unreadable_file_is_an_input_error() {
        let path = std::env::temp_dir().join("assignment_editor_missing_input.json");
        let _ = std::fs::remove_file(&path);

        let report = read_record(Some(path.as_path())).unwrap_err();

        assert!(matches!(report.current_context(), Error::Input(message) if message.contains("assignment_editor_missing_input.json")));
    }

    #[test]
    fn test_malformed_json_is_a_serialization_error() {
        let path = scratch_file("malformed", "{ not json");

        let report = read_record(Some(path.as_path())).unwrap_err();

        assert!(matches!(report.current_context(), Error::Serialization(_)));
        let _ = std::fs::remove_file(&path);
    }
}
