use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error};

use crate::{
    board::{BoardSnapshot, BoardStore, remove_card},
    collision::CollisionTarget,
    composer::Composer,
    drag::{CancelPolicy, DragController, DragEvent, DragOutcome},
    editor::{EditField, EditSession},
    ids::{CardIdGenerator, IdGenerator},
    settings::Settings,
    snapshot::{load_or_sample, validate},
    types::Column,
};

const SCHEMA_VERSION: &str = "cli.v1";

#[derive(Debug, Clone, Subcommand)]
pub enum RootCommand {
    /// Validate a board snapshot.
    Check,
    /// Apply a list of board events to a snapshot and print the result.
    Replay(ReplayArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    #[arg(long, value_name = "PATH")]
    pub events: PathBuf,

    /// Restore the pre-drag board when a drag is cancelled.
    #[arg(long)]
    pub restore_on_cancel: bool,
}

/// One scripted step. Targets name a column and optionally the card being
/// hovered; without a card the column's drop zone is meant.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ReplayEvent {
    DragStart {
        card_id: String,
    },
    DragOver {
        #[serde(default)]
        target: Option<ReplayTarget>,
    },
    DragEnd {
        #[serde(default)]
        target: Option<ReplayTarget>,
    },
    DragCancel,
    Compose {
        column_id: String,
        title: String,
        #[serde(default)]
        description: String,
    },
    Edit {
        column_id: String,
        card_id: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        owner: Option<String>,
        #[serde(default)]
        due_date: Option<String>,
        #[serde(default)]
        metric: Option<String>,
    },
    Remove {
        card_id: String,
    },
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayTarget {
    pub column_id: String,
    #[serde(default)]
    pub card_id: Option<String>,
}

impl From<ReplayTarget> for CollisionTarget {
    fn from(target: ReplayTarget) -> Self {
        match target.card_id {
            Some(card_id) => CollisionTarget::card(target.column_id, card_id),
            None => CollisionTarget::drop_zone(target.column_id),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ReplayStep {
    pub index: usize,
    pub event: &'static str,
    pub outcome: String,
    pub revision: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<ReplayStep>,
    pub revision: u64,
    pub board: Vec<Column>,
}

/// Drives the board core with scripted events. Nothing is written back; the
/// resulting board is returned alongside a per-step outcome log.
pub fn replay_events(
    snapshot: BoardSnapshot,
    events: Vec<ReplayEvent>,
    policy: CancelPolicy,
    ids: &mut impl IdGenerator,
    today: NaiveDate,
) -> ReplayReport {
    let mut board = BoardStore::seed(snapshot);
    let mut drag = DragController::new(policy);
    let mut composer = Composer::default();
    let mut steps = Vec::with_capacity(events.len());

    for (index, event) in events.into_iter().enumerate() {
        let name = event_name(&event);
        let outcome = match event {
            ReplayEvent::DragStart { card_id } => {
                drag_outcome(drag.handle(&mut board, DragEvent::Start { card_id }))
            }
            ReplayEvent::DragOver { target } => drag_outcome(
                drag.handle(&mut board, DragEvent::Over(target.map(Into::into))),
            ),
            ReplayEvent::DragEnd { target } => {
                drag_outcome(drag.handle(&mut board, DragEvent::End(target.map(Into::into))))
            }
            ReplayEvent::DragCancel => drag_outcome(drag.handle(&mut board, DragEvent::Cancel)),
            ReplayEvent::Compose {
                column_id,
                title,
                description,
            } => {
                composer.open(column_id.as_str());
                let draft = composer.draft_mut(&column_id);
                draft.title = title;
                draft.description = description;
                match composer.create(&column_id, &mut board, ids, today) {
                    Some(card_id) => format!("created {card_id}"),
                    None => {
                        composer.cancel();
                        "ignored".to_string()
                    }
                }
            }
            ReplayEvent::Edit {
                column_id,
                card_id,
                title,
                description,
                owner,
                due_date,
                metric,
            } => match EditSession::open(&board, &column_id, &card_id) {
                Some(mut session) => {
                    let fields = [
                        (EditField::Title, title),
                        (EditField::Description, description),
                        (EditField::Owner, owner),
                        (EditField::DueDate, due_date),
                        (EditField::Metric, metric),
                    ];
                    for (field, value) in fields {
                        if let Some(value) = value {
                            *session.form.field_mut(field) = value;
                        }
                    }
                    if session.save(&mut board) {
                        "saved".to_string()
                    } else {
                        "rejected".to_string()
                    }
                }
                None => "ignored".to_string(),
            },
            ReplayEvent::Remove { card_id } => {
                if board.apply(|columns| remove_card(columns, &card_id)) {
                    "removed".to_string()
                } else {
                    "ignored".to_string()
                }
            }
        };

        debug!(index, event = name, outcome = %outcome, "replayed event");
        steps.push(ReplayStep {
            index,
            event: name,
            outcome,
            revision: board.revision(),
        });
    }

    ReplayReport {
        steps,
        revision: board.revision(),
        board: board.columns().to_vec(),
    }
}

fn event_name(event: &ReplayEvent) -> &'static str {
    match event {
        ReplayEvent::DragStart { .. } => "drag_start",
        ReplayEvent::DragOver { .. } => "drag_over",
        ReplayEvent::DragEnd { .. } => "drag_end",
        ReplayEvent::DragCancel => "drag_cancel",
        ReplayEvent::Compose { .. } => "compose",
        ReplayEvent::Edit { .. } => "edit",
        ReplayEvent::Remove { .. } => "remove",
    }
}

fn drag_outcome(outcome: DragOutcome) -> String {
    format!("{outcome:?}").to_ascii_lowercase()
}

pub fn run(board: Option<&Path>, command: RootCommand, json_output: bool, quiet: bool) -> i32 {
    match execute(board, command) {
        Ok(output) => {
            print_success(output, json_output, quiet);
            0
        }
        Err(err) => {
            print_error(&err, json_output);
            err.exit_code
        }
    }
}

struct CommandOutput {
    command: &'static str,
    board: String,
    data: Value,
    text: String,
}

#[derive(Debug)]
struct CliError {
    exit_code: i32,
    code: &'static str,
    message: String,
    details: Option<Value>,
}

type CliResult<T> = Result<T, CliError>;

fn execute(board: Option<&Path>, command: RootCommand) -> CliResult<CommandOutput> {
    let snapshot = load_board(board)?;
    let board_label = board.map_or_else(
        || "sample".to_string(),
        |path| path.display().to_string(),
    );

    match command {
        RootCommand::Check => check(&snapshot, board_label),
        RootCommand::Replay(args) => replay(snapshot, board_label, args),
    }
}

fn load_board(board: Option<&Path>) -> CliResult<BoardSnapshot> {
    if let Some(path) = board
        && !path.exists()
    {
        return Err(not_found_error(
            "SNAPSHOT_NOT_FOUND",
            format!("board snapshot '{}' not found", path.display()),
        ));
    }
    load_or_sample(board).map_err(|err| {
        invalid_snapshot_error("SNAPSHOT_UNREADABLE", format!("{err:#}"), None)
    })
}

fn check(snapshot: &BoardSnapshot, board: String) -> CliResult<CommandOutput> {
    let issues = validate(snapshot);
    if !issues.is_empty() {
        let message = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        let details = serde_json::to_value(&issues).ok();
        return Err(invalid_snapshot_error(
            "SNAPSHOT_INVALID",
            format!("{} issue(s): {message}", issues.len()),
            details,
        ));
    }

    let cards = snapshot.iter().map(|column| column.cards.len()).sum::<usize>();
    Ok(CommandOutput {
        command: "check",
        board,
        data: json!({
            "columns": snapshot.len(),
            "cards": cards,
            "issues": []
        }),
        text: format!("ok: {} columns, {cards} cards", snapshot.len()),
    })
}

fn replay(snapshot: BoardSnapshot, board: String, args: ReplayArgs) -> CliResult<CommandOutput> {
    let raw = fs::read_to_string(&args.events)
        .with_context(|| format!("failed to read events '{}'", args.events.display()))
        .map_err(|err| not_found_error("EVENTS_NOT_FOUND", format!("{err:#}")))?;
    let events: Vec<ReplayEvent> = serde_json::from_str(&raw)
        .map_err(|err| usage_error("INVALID_EVENTS", format!("invalid events file: {err}")))?;

    let settings = Settings::load();
    let policy = if args.restore_on_cancel {
        CancelPolicy::RestoreSnapshot
    } else {
        settings.cancel_policy()
    };
    let mut ids = CardIdGenerator::new(settings.id_strategy());
    let report = replay_events(snapshot, events, policy, &mut ids, Local::now().date_naive());

    let text = render_replay_text(&report);
    let data = serde_json::to_value(&report).map_err(runtime_error)?;
    Ok(CommandOutput {
        command: "replay",
        board,
        data,
        text,
    })
}

fn render_replay_text(report: &ReplayReport) -> String {
    let step_rows = report
        .steps
        .iter()
        .map(|step| {
            vec![
                step.index.to_string(),
                step.event.to_string(),
                step.outcome.clone(),
                step.revision.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    let board_rows = report
        .board
        .iter()
        .flat_map(|column| {
            column.cards.iter().enumerate().map(|(position, card)| {
                vec![
                    column.title.clone(),
                    position.to_string(),
                    card.id.clone(),
                    card.title.replace('\n', " "),
                ]
            })
        })
        .collect::<Vec<_>>();

    [
        render_text_table(&["#", "EVENT", "OUTCOME", "REV"], &step_rows),
        render_text_table(&["COLUMN", "POS", "ID", "TITLE"], &board_rows),
    ]
    .join("\n")
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.chars().count());
        }
    }

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|width| "-".repeat(*width + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let format_row = |cells: Vec<&str>| {
        format!(
            "| {} |",
            cells
                .iter()
                .enumerate()
                .map(|(index, cell)| format!("{cell:<width$}", width = widths[index]))
                .collect::<Vec<_>>()
                .join(" | ")
        )
    };

    let mut lines = vec![border.clone(), format_row(headers.to_vec()), border.clone()];
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines.push(border);
    lines.join("\n")
}

fn usage_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError {
        exit_code: 2,
        code,
        message: message.into(),
        details: None,
    }
}

fn not_found_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError {
        exit_code: 3,
        code,
        message: message.into(),
        details: None,
    }
}

fn invalid_snapshot_error(
    code: &'static str,
    message: impl Into<String>,
    details: Option<Value>,
) -> CliError {
    CliError {
        exit_code: 4,
        code,
        message: message.into(),
        details,
    }
}

fn runtime_error(err: impl std::fmt::Display) -> CliError {
    CliError {
        exit_code: 5,
        code: "RUNTIME_ERROR",
        message: err.to_string(),
        details: None,
    }
}

fn print_success(output: CommandOutput, json_output: bool, quiet: bool) {
    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "command": output.command,
            "board": output.board,
            "data": output.data
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => println!("{value}"),
            Err(_) => println!("{payload}"),
        }
        return;
    }

    if quiet {
        return;
    }

    if output.text.is_empty() {
        println!("ok");
    } else {
        println!("{}", output.text);
    }
}

fn print_error(err: &CliError, json_output: bool) {
    error!(
        code = err.code,
        message = %err.message,
        details = ?err.details,
        "cli command failed"
    );

    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "error": {
                "code": err.code,
                "message": err.message,
                "details": err.details
            }
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => eprintln!("{value}"),
            Err(_) => eprintln!("{payload}"),
        }
        return;
    }

    eprintln!("error[{}]: {}", err.code, err.message);
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use super::*;
    use crate::types::Card;

    struct SequenceIds(u32);

    impl IdGenerator for SequenceIds {
        fn next_id(&mut self) -> String {
            self.0 += 1;
            format!("new-{}", self.0)
        }
    }

    fn snapshot() -> BoardSnapshot {
        Arc::from(vec![
            Column::new("todo", "Para estudar")
                .with_cards(vec![Card::new("c1", "Heaps"), Card::new("c2", "Tries")]),
            Column::new("done", "Concluído"),
        ])
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date")
    }

    #[test]
    fn replay_events_parse_from_camel_case_json() {
        let events: Vec<ReplayEvent> = serde_json::from_str(
            r#"[
                {"type": "drag_start", "cardId": "c1"},
                {"type": "drag_over", "target": {"columnId": "done"}},
                {"type": "drag_end", "target": {"columnId": "done", "cardId": "c1"}},
                {"type": "drag_cancel"},
                {"type": "edit", "columnId": "todo", "cardId": "c2", "dueDate": "2024-04-01"}
            ]"#,
        )
        .expect("events parse");

        assert_eq!(
            events[1],
            ReplayEvent::DragOver {
                target: Some(ReplayTarget {
                    column_id: "done".to_string(),
                    card_id: None
                })
            }
        );
        assert!(matches!(
            &events[4],
            ReplayEvent::Edit { due_date: Some(due), .. } if due == "2024-04-01"
        ));
    }

    #[test]
    fn replay_moves_card_and_logs_outcomes() {
        let events = vec![
            ReplayEvent::DragStart {
                card_id: "c1".to_string(),
            },
            ReplayEvent::DragOver {
                target: Some(ReplayTarget {
                    column_id: "done".to_string(),
                    card_id: None,
                }),
            },
            ReplayEvent::DragEnd { target: None },
        ];
        let report = replay_events(
            snapshot(),
            events,
            CancelPolicy::KeepMoves,
            &mut SequenceIds(0),
            today(),
        );

        let outcomes: Vec<&str> = report.steps.iter().map(|step| step.outcome.as_str()).collect();
        assert_eq!(outcomes, vec!["lifted", "moved", "cancelled"]);
        assert_eq!(report.board[1].card_ids(), vec!["c1"]);
        assert_eq!(report.revision, 1);
    }

    #[test]
    fn replay_compose_edit_and_remove() {
        let events = vec![
            ReplayEvent::Compose {
                column_id: "done".to_string(),
                title: "  Mock interview ".to_string(),
                description: String::new(),
            },
            ReplayEvent::Compose {
                column_id: "done".to_string(),
                title: "   ".to_string(),
                description: String::new(),
            },
            ReplayEvent::Edit {
                column_id: "todo".to_string(),
                card_id: "c2".to_string(),
                title: None,
                description: None,
                owner: Some("Ana".to_string()),
                due_date: None,
                metric: None,
            },
            ReplayEvent::Remove {
                card_id: "c1".to_string(),
            },
        ];
        let report = replay_events(
            snapshot(),
            events,
            CancelPolicy::KeepMoves,
            &mut SequenceIds(0),
            today(),
        );

        let outcomes: Vec<&str> = report.steps.iter().map(|step| step.outcome.as_str()).collect();
        assert_eq!(outcomes, vec!["created new-1", "ignored", "saved", "removed"]);
        assert_eq!(report.board[1].cards[0].title, "Mock interview");
        assert_eq!(
            report.board[1].cards[0].meta.as_deref(),
            Some("Criado em 09/03/2024")
        );
        assert_eq!(report.board[0].card_ids(), vec!["c2"]);
        assert_eq!(report.board[0].cards[0].owner.as_deref(), Some("Ana"));
    }

    #[test]
    fn check_reports_issues_as_invalid_snapshot() {
        let broken: BoardSnapshot = Arc::from(vec![
            Column::new("todo", "Para estudar").with_cards(vec![Card::new("c1", "Heaps")]),
            Column::new("todo", "Duplicate").with_cards(vec![Card::new("c1", "Again")]),
        ]);
        let err = check(&broken, "inline".to_string())
            .err()
            .expect("check should fail");
        assert_eq!(err.exit_code, 4);
        assert_eq!(err.code, "SNAPSHOT_INVALID");
        assert!(err.message.starts_with("2 issue(s)"));
    }

    #[test]
    fn missing_board_file_is_not_found() {
        let err = load_board(Some(Path::new("/definitely/not/here.json")))
            .err()
            .expect("missing file");
        assert_eq!(err.exit_code, 3);
    }

    #[test]
    fn malformed_board_file_is_invalid_snapshot() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ not json").expect("write");
        let err = load_board(Some(file.path())).err().expect("parse failure");
        assert_eq!(err.exit_code, 4);
        assert_eq!(err.code, "SNAPSHOT_UNREADABLE");
    }

    #[test]
    fn text_table_pads_columns() {
        let table = render_text_table(&["A", "BB"], &[vec!["xyz".to_string(), "1".to_string()]]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "+-----+----+");
        assert_eq!(lines[1], "| A   | BB |");
        assert_eq!(lines[3], "| xyz | 1  |");
    }
}
