use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tempfile::{NamedTempFile, TempDir};
use tuirealm::ratatui::{Terminal, backend::TestBackend};

use prep_board::app::{App, Message};
use prep_board::board::{
    BoardSnapshot, BoardStore, card_count, move_between_columns, reorder_within_column,
};
use prep_board::collision::CollisionTarget;
use prep_board::composer::Composer;
use prep_board::drag::{CancelPolicy, DragController, DragEvent, DragOutcome};
use prep_board::editor::{EditField, EditSession};
use prep_board::ids::{CardIdGenerator, IdGenerator, IdStrategy};
use prep_board::settings::Settings;
use prep_board::snapshot::{load_snapshot, sample_board, validate};
use prep_board::types::{Card, Column};
use prep_board::ui;

fn two_columns() -> BoardSnapshot {
    Arc::from(vec![
        Column::new("todo", "Para estudar").with_cards(vec![Card::new("c1", "Heaps")]),
        Column::new("done", "Concluído"),
    ])
}

fn four_cards() -> Vec<Column> {
    vec![
        Column::new("todo", "Para estudar").with_cards(
            ["a", "b", "c", "d"]
                .into_iter()
                .map(|id| Card::new(id, id.to_uppercase()))
                .collect(),
        ),
        Column::new("done", "Concluído").with_cards(vec![Card::new("x", "X")]),
    ]
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).expect("valid date")
}

#[test]
fn generated_ids_are_pairwise_distinct() {
    for strategy in [IdStrategy::Uuid, IdStrategy::Timestamp] {
        let mut ids = CardIdGenerator::new(strategy);
        let generated: HashSet<String> = (0..500).map(|_| ids.next_id()).collect();
        assert_eq!(generated.len(), 500, "strategy {strategy:?}");
    }
}

#[test]
fn reorder_keeps_membership_and_relative_order() {
    let columns = four_cards();
    let next = reorder_within_column(&columns, "todo", "a", "c");
    assert_eq!(next[0].card_ids(), vec!["b", "c", "a", "d"]);

    let members: HashSet<&str> = next[0].card_ids().into_iter().collect();
    assert_eq!(members, HashSet::from(["a", "b", "c", "d"]));
    assert_eq!(next[1], columns[1]);
}

#[test]
fn cross_column_move_preserves_total_count() {
    let columns = four_cards();
    let next = move_between_columns(&columns, "todo", "done", "b", "x");
    assert_eq!(next[0].cards.len(), 3);
    assert_eq!(next[1].card_ids(), vec!["b", "x"]);
    assert_eq!(card_count(&next), card_count(&columns));
}

#[test]
fn unknown_ids_leave_board_unchanged() {
    let columns = four_cards();
    assert_eq!(&*reorder_within_column(&columns, "nope", "a", "c"), columns.as_slice());
    assert_eq!(&*reorder_within_column(&columns, "todo", "zz", "c"), columns.as_slice());
    assert_eq!(
        &*move_between_columns(&columns, "todo", "nope", "a", "x"),
        columns.as_slice()
    );
    assert_eq!(
        &*move_between_columns(&columns, "todo", "done", "zz", "x"),
        columns.as_slice()
    );
}

#[test]
fn identical_reorder_is_a_no_op() {
    let columns = four_cards();
    let mut store = BoardStore::from_columns(columns.clone());
    let revision = store.revision();
    assert!(!store.apply(|columns| reorder_within_column(columns, "todo", "b", "b")));
    assert_eq!(store.columns(), columns.as_slice());
    assert_eq!(store.revision(), revision);
}

#[test]
fn composer_rejects_blank_title() {
    let mut store = BoardStore::seed(two_columns());
    let mut composer = Composer::default();
    let mut ids = CardIdGenerator::default();

    composer.open("done");
    composer.draft_mut("done").title = "   ".to_string();
    assert!(!composer.can_create("done"));
    assert_eq!(composer.create("done", &mut store, &mut ids, today()), None);
    assert!(store.columns()[1].cards.is_empty());
}

#[test]
fn composer_appends_card_with_creation_meta() {
    let mut store = BoardStore::seed(two_columns());
    let mut composer = Composer::default();
    let mut ids = CardIdGenerator::default();

    composer.open("done");
    composer.draft_mut("done").title = "System design".to_string();
    let id = composer
        .create("done", &mut store, &mut ids, today())
        .expect("card created");

    let card = &store.columns()[1].cards[0];
    assert_eq!(card.id, id);
    assert_eq!(card.meta.as_deref(), Some("Criado em 17/05/2024"));
    assert_eq!(card.chips[0].label, "Novo");
    assert!(!composer.is_open());
}

#[test]
fn edit_normalizes_blank_owner_to_absent() {
    let mut card = Card::new("c1", "Heaps");
    card.owner = Some("Ana".to_string());
    let snapshot: BoardSnapshot =
        Arc::from(vec![Column::new("todo", "Para estudar").with_cards(vec![card])]);
    let mut store = BoardStore::seed(snapshot);

    let mut session = EditSession::open(&store, "todo", "c1").expect("session");
    session.form.field_mut(EditField::Owner).clear();
    assert!(session.save(&mut store));

    let saved = &store.columns()[0].cards[0];
    assert_eq!(saved.owner, None);
    let json = serde_json::to_value(saved).expect("serialize");
    assert!(json.get("owner").is_none());
}

#[test]
fn drag_across_columns_then_end_moves_card() {
    let mut store = BoardStore::seed(two_columns());
    let mut drag = DragController::default();

    let start = drag.handle(
        &mut store,
        DragEvent::Start {
            card_id: "c1".to_string(),
        },
    );
    assert_eq!(start, DragOutcome::Lifted);
    let over = drag.handle(
        &mut store,
        DragEvent::Over(Some(CollisionTarget::drop_zone("done"))),
    );
    assert_eq!(over, DragOutcome::Moved);
    drag.handle(
        &mut store,
        DragEvent::End(Some(CollisionTarget::drop_zone("done"))),
    );

    assert!(store.columns()[0].cards.is_empty());
    assert_eq!(store.columns()[1].card_ids(), vec!["c1"]);
    assert!(!drag.is_dragging());
}

#[test]
fn cancel_with_keep_moves_policy_leaves_cross_column_move_applied() {
    let mut store = BoardStore::seed(two_columns());
    let mut drag = DragController::new(CancelPolicy::KeepMoves);

    drag.handle(
        &mut store,
        DragEvent::Start {
            card_id: "c1".to_string(),
        },
    );
    drag.handle(
        &mut store,
        DragEvent::Over(Some(CollisionTarget::drop_zone("done"))),
    );
    assert_eq!(drag.handle(&mut store, DragEvent::Cancel), DragOutcome::Cancelled);

    assert!(store.columns()[0].cards.is_empty());
    assert_eq!(store.columns()[1].card_ids(), vec!["c1"]);
}

#[test]
fn cancel_with_restore_snapshot_policy_reverts_cross_column_move() {
    let mut store = BoardStore::seed(two_columns());
    let mut drag = DragController::new(CancelPolicy::RestoreSnapshot);

    drag.handle(
        &mut store,
        DragEvent::Start {
            card_id: "c1".to_string(),
        },
    );
    drag.handle(
        &mut store,
        DragEvent::Over(Some(CollisionTarget::drop_zone("done"))),
    );
    assert_eq!(drag.handle(&mut store, DragEvent::Cancel), DragOutcome::Restored);

    assert_eq!(store.columns()[0].card_ids(), vec!["c1"]);
    assert!(store.columns()[1].cards.is_empty());
}

#[test]
fn release_outside_any_droppable_behaves_like_cancel() {
    let mut store = BoardStore::seed(two_columns());
    let mut drag = DragController::default();

    drag.handle(
        &mut store,
        DragEvent::Start {
            card_id: "c1".to_string(),
        },
    );
    assert_eq!(drag.handle(&mut store, DragEvent::End(None)), DragOutcome::Cancelled);
    assert_eq!(store.columns()[0].card_ids(), vec!["c1"]);
}

#[test]
fn snapshot_file_loads_and_validates() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"[
            {{"id": "todo", "title": "Para estudar", "accentColor": "blue",
              "cards": [{{"id": "c1", "title": "Heaps", "progress": 40,
                          "chips": [{{"label": "Algo", "colorClass": "primary"}}]}}]}},
            {{"id": "done", "title": "Concluído", "highlight": true}}
        ]"#
    )
    .expect("write snapshot");

    let snapshot = load_snapshot(file.path()).expect("load");
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].cards[0].progress, Some(40));
    assert_eq!(snapshot[1].highlight, Some(true));
    assert!(validate(&snapshot).is_empty());
}

#[test]
fn sample_board_is_valid() {
    let sample = sample_board();
    assert!(!sample.is_empty());
    assert!(validate(&sample).is_empty());
}

#[test]
fn settings_round_trip_through_toml() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("settings.toml");

    let settings = Settings {
        cancel_restores_board: true,
        activation_distance: 4,
        ..Settings::default()
    };
    settings.save_to_path(&path).expect("save");

    let loaded = Settings::load_from_path(&path);
    assert_eq!(loaded.activation_distance, 4);
    assert_eq!(loaded.cancel_policy(), CancelPolicy::RestoreSnapshot);
}

#[test]
fn app_pointer_drag_and_render_end_to_end() {
    let mut app = App::new(two_columns(), Settings::default());
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("terminal");
    terminal
        .draw(|frame| ui::render(frame, &mut app))
        .expect("draw");

    let card = app.layout().card_rect("c1").expect("card visible");
    let zone = app.layout().columns[1].drop_zone;
    let press = (card.x + 2, card.y + 1);
    let release = (zone.x + 2 + (press.0 - card.x), zone.y + 1);

    let mouse = |kind, (column, row): (u16, u16)| {
        Message::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    };
    app.update(mouse(MouseEventKind::Down(MouseButton::Left), press))
        .expect("press");
    app.update(mouse(MouseEventKind::Drag(MouseButton::Left), release))
        .expect("drag");
    app.update(mouse(MouseEventKind::Up(MouseButton::Left), release))
        .expect("release");

    assert!(app.board.columns()[0].cards.is_empty());
    assert_eq!(app.board.columns()[1].card_ids(), vec!["c1"]);

    terminal
        .draw(|frame| ui::render(frame, &mut app))
        .expect("redraw");
    let buffer = terminal.backend().buffer().clone();
    let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
    assert!(text.contains("Heaps"));
    assert!(text.contains("Concluído"));
}

#[test]
fn app_quits_on_q() {
    let mut app = App::new(sample_board(), Settings::default());
    app.update(Message::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)))
        .expect("quit key");
    assert!(app.should_quit());
}
