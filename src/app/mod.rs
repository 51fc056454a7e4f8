mod input;
pub mod interaction;
pub mod messages;
pub mod state;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use chrono::Local;
use tracing::{debug, warn};
use tuirealm::ratatui::layout::Rect;

pub use self::interaction::{InteractionKind, InteractionLayer, InteractionMap};
pub use self::messages::Message;
pub use self::state::{ActiveDialog, BoardFocus};

use crate::board::{
    BoardSnapshot, BoardStore, column_of_card, find_card_location, find_column_index, remove_card,
};
use crate::collision::{ClosestCorners, CollisionStrategy, CollisionTarget};
use crate::composer::Composer;
use crate::drag::{
    DragController, DragEvent, DragOutcome, KeyboardDirection, KeyboardSensor, PointerSensor,
};
use crate::editor::EditSession;
use crate::ids::CardIdGenerator;
use crate::keybindings::Keybindings;
use crate::layout::BoardLayout;
use crate::settings::Settings;
use crate::snapshot::{SnapshotIssue, load_or_sample, sample_board, validate};
use crate::theme::{Theme, ThemePreset};

const THEME_ENV: &str = "PREP_BOARD_THEME";
const DEFAULT_VIEWPORT: Rect = Rect {
    x: 0,
    y: 0,
    width: 120,
    height: 36,
};

#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub board_path: Option<PathBuf>,
    pub theme_override: Option<ThemePreset>,
}

pub struct App {
    pub should_quit: bool,
    pub theme: Theme,
    pub viewport: Rect,
    pub board: BoardStore,
    snapshot: BoardSnapshot,
    snapshot_path: Option<PathBuf>,
    pub drag: DragController,
    pub pointer: PointerSensor,
    pub keyboard: KeyboardSensor,
    /// Where the lifted card is drawn while a drag is in flight.
    pub drag_rect: Option<Rect>,
    pub composer: Composer,
    ids: CardIdGenerator,
    pub focus: BoardFocus,
    pub active_dialog: ActiveDialog,
    pub footer_notice: Option<String>,
    pub interaction_map: InteractionMap,
    pub hovered_message: Option<Message>,
    pub keybindings: Keybindings,
    pub settings: Settings,
}

impl App {
    pub fn new(snapshot: BoardSnapshot, settings: Settings) -> Self {
        let theme = Theme::from_preset(settings.theme_preset());
        let mut app = Self {
            should_quit: false,
            theme,
            viewport: DEFAULT_VIEWPORT,
            board: BoardStore::seed(BoardSnapshot::clone(&snapshot)),
            snapshot,
            snapshot_path: None,
            drag: DragController::new(settings.cancel_policy()),
            pointer: PointerSensor::new(settings.activation_distance),
            keyboard: KeyboardSensor::default(),
            drag_rect: None,
            composer: Composer::default(),
            ids: CardIdGenerator::new(settings.id_strategy()),
            focus: BoardFocus::default(),
            active_dialog: ActiveDialog::None,
            footer_notice: None,
            interaction_map: InteractionMap::default(),
            hovered_message: None,
            keybindings: Keybindings::from_config(&settings.keybindings),
            settings,
        };
        app.sync_focus();
        app
    }

    /// Loads settings and the board snapshot the way the binary does. Theme
    /// precedence: command line, then `PREP_BOARD_THEME`, then settings.
    pub fn from_options(options: AppOptions) -> Result<Self> {
        let settings = Settings::load();
        let snapshot = load_or_sample(options.board_path.as_deref())?;
        let env_theme = std::env::var(THEME_ENV)
            .ok()
            .and_then(|value| ThemePreset::from_str(&value).ok());

        let issues = validate(&snapshot);
        let mut app = Self::new(snapshot, settings);
        app.report_snapshot_issues(&issues);
        if let Some(preset) = options.theme_override.or(env_theme) {
            app.theme = Theme::from_preset(preset);
        }
        app.snapshot_path = options.board_path;
        Ok(app)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.snapshot
    }

    pub fn layout(&self) -> BoardLayout {
        BoardLayout::compute(
            self.viewport,
            self.board.columns(),
            self.composer.open_column(),
        )
    }

    pub fn focused_column_id(&self) -> Option<&str> {
        self.board
            .columns()
            .get(self.focus.column)
            .map(|column| column.id.as_str())
    }

    /// Adopts a snapshot from the outside. Only a different allocation resets
    /// local edits; any in-flight drag is dropped with them.
    pub fn replace_snapshot(&mut self, snapshot: BoardSnapshot) -> bool {
        self.snapshot = snapshot;
        if !self.board.sync_snapshot(&self.snapshot) {
            return false;
        }
        self.drag.reset();
        self.pointer.reset();
        self.keyboard.release();
        self.drag_rect = None;
        if let ActiveDialog::EditCard(_) = self.active_dialog {
            self.active_dialog = ActiveDialog::None;
        }
        let composer_orphaned = self
            .composer
            .open_column()
            .is_some_and(|column_id| find_column_index(self.board.columns(), column_id).is_none());
        if composer_orphaned {
            self.composer.cancel();
        }
        self.sync_focus();
        true
    }

    pub fn update(&mut self, message: Message) -> Result<()> {
        match message {
            Message::Key(key) => self.handle_key(key)?,
            Message::Mouse(mouse) => self.handle_mouse(mouse)?,
            Message::Resize(width, height) => {
                self.viewport = Rect::new(0, 0, width, height);
                self.interaction_map.clear();
                self.hovered_message = None;
            }
            Message::Tick => {}
            Message::Quit => self.should_quit = true,
            Message::ToggleHelp => {
                self.active_dialog = match self.active_dialog {
                    ActiveDialog::Help => ActiveDialog::None,
                    _ => ActiveDialog::Help,
                };
            }
            Message::DismissDialog => self.active_dialog = ActiveDialog::None,
            Message::DismissNotice => self.footer_notice = None,
            Message::FocusColumn(index) => {
                if index < self.board.columns().len() && index != self.focus.column {
                    self.focus.column = index;
                    self.focus.card_id = None;
                    self.sync_focus();
                }
            }
            Message::SelectCard(card_id) => {
                if let Some(location) = find_card_location(self.board.columns(), &card_id) {
                    self.focus = BoardFocus {
                        column: location.column_index,
                        card_id: Some(card_id),
                    };
                }
            }
            Message::SelectUp => self.step_selection(-1),
            Message::SelectDown => self.step_selection(1),
            Message::NavigateLeft => self.step_column(-1),
            Message::NavigateRight => self.step_column(1),
            Message::OpenComposer(column_id) => {
                if let Some(index) = self
                    .board
                    .columns()
                    .iter()
                    .position(|column| column.id == column_id)
                {
                    self.focus.column = index;
                    self.composer.open(column_id);
                }
            }
            Message::FocusComposerField(field) => {
                if self.composer.is_open() && self.composer.focused_field() != field {
                    self.composer.cycle_field();
                }
            }
            Message::SubmitComposer => self.submit_composer(),
            Message::CancelComposer => self.composer.cancel(),
            Message::OpenEditor => self.open_editor(),
            Message::FocusEditField(field) => {
                if let ActiveDialog::EditCard(session) = &mut self.active_dialog {
                    session.focused_field = field;
                }
            }
            Message::SaveEdit => self.save_edit(),
            Message::RemoveSelectedCard => self.remove_selected_card(),
            Message::ReloadSnapshot => self.reload_snapshot(),
        }
        Ok(())
    }

    fn step_selection(&mut self, delta: isize) {
        let Some(column) = self.board.columns().get(self.focus.column) else {
            return;
        };
        if column.cards.is_empty() {
            self.focus.card_id = None;
            return;
        }
        let last = column.cards.len() - 1;
        let next = match self
            .focus
            .card_id
            .as_deref()
            .and_then(|id| column.cards.iter().position(|card| card.id == id))
        {
            Some(current) => current.saturating_add_signed(delta).min(last),
            None => 0,
        };
        self.focus.card_id = Some(column.cards[next].id.clone());
    }

    fn step_column(&mut self, delta: isize) {
        let count = self.board.columns().len();
        if count == 0 {
            return;
        }
        let row = self.focused_card_index().unwrap_or(0);
        let next = self.focus.column.saturating_add_signed(delta).min(count - 1);
        if next == self.focus.column {
            return;
        }
        self.focus.column = next;
        let cards = &self.board.columns()[next].cards;
        self.focus.card_id = cards
            .get(row.min(cards.len().saturating_sub(1)))
            .map(|card| card.id.clone());
    }

    fn focused_card_index(&self) -> Option<usize> {
        let id = self.focus.card_id.as_deref()?;
        find_card_location(self.board.columns(), id).map(|location| location.card_index)
    }

    /// Re-anchors focus after the board changed underneath it.
    pub(crate) fn sync_focus(&mut self) {
        let columns = self.board.columns();
        if let Some(location) = self
            .focus
            .card_id
            .as_deref()
            .and_then(|id| find_card_location(columns, id))
        {
            self.focus.column = location.column_index;
            return;
        }

        self.focus.column = self.focus.column.min(columns.len().saturating_sub(1));
        self.focus.card_id = columns
            .get(self.focus.column)
            .and_then(|column| column.cards.first())
            .map(|card| card.id.clone());
    }

    fn submit_composer(&mut self) {
        let Some(column_id) = self.composer.open_column().map(str::to_string) else {
            return;
        };
        let today = Local::now().date_naive();
        // Blank titles leave the composer open and untouched.
        if let Some(card_id) =
            self.composer
                .create(&column_id, &mut self.board, &mut self.ids, today)
        {
            self.focus.card_id = Some(card_id);
            self.sync_focus();
        }
    }

    fn open_editor(&mut self) {
        let Some(card_id) = self.focus.card_id.clone() else {
            return;
        };
        let Some(column_id) = column_of_card(self.board.columns(), &card_id).map(str::to_string)
        else {
            return;
        };
        if let Some(session) = EditSession::open(&self.board, &column_id, &card_id) {
            self.active_dialog = ActiveDialog::EditCard(session);
        }
    }

    fn save_edit(&mut self) {
        let ActiveDialog::EditCard(session) = &self.active_dialog else {
            return;
        };
        if !session.can_save() {
            return;
        }
        if session.save(&mut self.board) {
            self.active_dialog = ActiveDialog::None;
            self.sync_focus();
        } else {
            warn!(card_id = %session.card_id, "edited card no longer on the board");
            self.active_dialog = ActiveDialog::None;
        }
    }

    fn remove_selected_card(&mut self) {
        let Some(card_id) = self.focus.card_id.clone() else {
            return;
        };
        let row = self.focused_card_index().unwrap_or(0);
        if !self.board.apply(|columns| remove_card(columns, &card_id)) {
            return;
        }
        debug!(card_id = %card_id, "card removed");
        self.focus.card_id = self
            .board
            .columns()
            .get(self.focus.column)
            .and_then(|column| column.cards.get(row).or(column.cards.last()))
            .map(|card| card.id.clone());
    }

    fn reload_snapshot(&mut self) {
        let snapshot = match self.snapshot_path.as_deref() {
            Some(path) => match load_or_sample(Some(path)) {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    warn!("failed to reload board snapshot: {error:#}");
                    self.footer_notice = Some(format!("Reload failed: {error}"));
                    return;
                }
            },
            None => sample_board(),
        };
        let issues = validate(&snapshot);
        if self.replace_snapshot(snapshot) {
            self.footer_notice = Some("Board reloaded".to_string());
        }
        self.report_snapshot_issues(&issues);
    }

    /// Issues are logged one by one; the footer only carries the count.
    fn report_snapshot_issues(&mut self, issues: &[SnapshotIssue]) {
        if issues.is_empty() {
            return;
        }
        for issue in issues {
            warn!("board snapshot: {issue}");
        }
        self.footer_notice = Some(format!(
            "Board snapshot has {} issue(s); run `prep-board check` for details",
            issues.len()
        ));
    }

    fn resolve_target(&self, layout: &BoardLayout, dragged: Rect) -> Option<CollisionTarget> {
        ClosestCorners::within(layout.surface).resolve(dragged, &layout.droppables())
    }

    /// Feeds one event to the drag controller and keeps sensors, overlay and
    /// focus consistent with the outcome.
    pub(crate) fn dispatch_drag(&mut self, event: DragEvent) -> DragOutcome {
        let outcome = self.drag.handle(&mut self.board, event);
        match outcome {
            DragOutcome::Lifted => {
                if let Some(active) = self.drag.active() {
                    self.focus.card_id = Some(active.card.id.clone());
                }
                self.sync_focus();
            }
            DragOutcome::Moved | DragOutcome::Hovering => self.sync_focus(),
            DragOutcome::Reordered
            | DragOutcome::Dropped
            | DragOutcome::Cancelled
            | DragOutcome::Restored => {
                self.drag_rect = None;
                self.keyboard.release();
                self.pointer.reset();
                self.sync_focus();
            }
            DragOutcome::Ignored => {
                if !self.drag.is_dragging() {
                    self.drag_rect = None;
                    self.keyboard.release();
                }
            }
        }
        outcome
    }

    pub(crate) fn begin_keyboard_drag(&mut self) {
        let Some(card_id) = self.focus.card_id.clone() else {
            return;
        };
        let Some(rect) = self.layout().card_rect(&card_id) else {
            self.footer_notice = Some("Scroll the card into view to pick it up".to_string());
            return;
        };
        self.keyboard.pick_up(rect);
        self.drag_rect = Some(rect);
        self.dispatch_drag(DragEvent::Start { card_id });
    }

    pub(crate) fn step_keyboard_drag(&mut self, direction: KeyboardDirection) {
        let Some(active_id) = self.drag.active().map(|active| active.card.id.clone()) else {
            return;
        };
        let layout = self.layout();
        let Some(rect) = self
            .keyboard
            .step(direction, &layout.droppables(), &active_id)
        else {
            return;
        };
        self.drag_rect = Some(rect);
        let target = self.resolve_target(&layout, rect);
        self.dispatch_drag(DragEvent::Over(target));
    }

    pub(crate) fn drop_keyboard_drag(&mut self) {
        let target = self.keyboard.release().and_then(|rect| {
            let layout = self.layout();
            self.resolve_target(&layout, rect)
        });
        self.dispatch_drag(DragEvent::End(target));
    }

    pub(crate) fn pointer_drag_over(&mut self, dragged: Rect) {
        self.drag_rect = Some(dragged);
        let layout = self.layout();
        let target = self.resolve_target(&layout, dragged);
        self.dispatch_drag(DragEvent::Over(target));
    }

    pub(crate) fn pointer_drag_end(&mut self, dragged: Rect) {
        let layout = self.layout();
        let target = self.resolve_target(&layout, dragged);
        self.dispatch_drag(DragEvent::End(target));
    }
}
