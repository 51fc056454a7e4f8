use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    KeyCode as CrosstermKeyCode, KeyEvent as CrosstermKeyEvent,
    KeyModifiers as CrosstermKeyModifiers, MouseButton as CrosstermMouseButton,
    MouseEvent as CrosstermMouseEvent, MouseEventKind as CrosstermMouseEventKind,
};
use tuirealm::{
    Application, AttrValue, Attribute, Component, Event, EventListenerCfg, Frame, MockComponent,
    NoUserEvent, Props, State,
    command::{Cmd, CmdResult},
    event::{
        Key as RealmKey, KeyEvent as RealmKeyEvent, KeyModifiers as RealmKeyModifiers,
        MouseButton as RealmMouseButton, MouseEvent as RealmMouseEvent,
        MouseEventKind as RealmMouseEventKind,
    },
    ratatui::layout::Rect,
};

use crate::{
    app::{App, Message},
    ui,
};

pub type SharedApp = Arc<Mutex<App>>;

/// Mouse motion arrives far more often than keys; a short poll keeps drags
/// smooth without spinning.
const INPUT_POLL: Duration = Duration::from_millis(10);
const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ScreenId {
    Board,
}

pub fn init_application(app: SharedApp) -> Result<Application<ScreenId, Message, NoUserEvent>> {
    let mut application: Application<ScreenId, Message, NoUserEvent> = Application::init(
        EventListenerCfg::default()
            .crossterm_input_listener(INPUT_POLL, 8)
            .poll_timeout(INPUT_POLL)
            .tick_interval(TICK_INTERVAL),
    );

    application
        .mount(ScreenId::Board, Box::new(BoardScreen::new(app)), Vec::new())
        .context("failed to mount board screen")?;
    application
        .active(&ScreenId::Board)
        .context("failed to focus board screen")?;

    Ok(application)
}

pub fn apply_message(shared_app: &SharedApp, message: Message) -> Result<()> {
    let mut app = lock_app(shared_app)?;
    app.update(message)
}

pub fn should_quit(shared_app: &SharedApp) -> Result<bool> {
    let app = lock_app(shared_app)?;
    Ok(app.should_quit())
}

fn lock_app(shared_app: &SharedApp) -> Result<MutexGuard<'_, App>> {
    shared_app
        .lock()
        .map_err(|_| anyhow!("board state lock poisoned"))
}

/// The whole board is a single component; layout and hit-testing live in
/// `App` so pointer and keyboard drags share one geometry.
struct BoardScreen {
    props: Props,
    app: SharedApp,
}

impl BoardScreen {
    fn new(app: SharedApp) -> Self {
        Self {
            props: Props::default(),
            app,
        }
    }
}

impl MockComponent for BoardScreen {
    fn view(&mut self, frame: &mut Frame, _area: Rect) {
        if let Ok(mut app) = self.app.lock() {
            ui::render(frame, &mut app);
        }
    }

    fn query(&self, attr: Attribute) -> Option<AttrValue> {
        self.props.get(attr)
    }

    fn attr(&mut self, attr: Attribute, value: AttrValue) {
        self.props.set(attr, value);
    }

    fn state(&self) -> State {
        State::None
    }

    fn perform(&mut self, _cmd: Cmd) -> CmdResult {
        CmdResult::None
    }
}

impl Component<Message, NoUserEvent> for BoardScreen {
    fn on(&mut self, ev: Event<NoUserEvent>) -> Option<Message> {
        match ev {
            Event::Keyboard(key) => Some(Message::Key(key_event(key))),
            Event::Mouse(mouse) => Some(Message::Mouse(mouse_event(mouse))),
            Event::WindowResize(width, height) => Some(Message::Resize(width, height)),
            Event::Tick => Some(Message::Tick),
            _ => None,
        }
    }
}

fn key_event(key: RealmKeyEvent) -> CrosstermKeyEvent {
    CrosstermKeyEvent::new(key_code(key.code), modifiers(key.modifiers))
}

fn key_code(key: RealmKey) -> CrosstermKeyCode {
    match key {
        RealmKey::Backspace => CrosstermKeyCode::Backspace,
        RealmKey::Enter => CrosstermKeyCode::Enter,
        RealmKey::Left => CrosstermKeyCode::Left,
        RealmKey::Right => CrosstermKeyCode::Right,
        RealmKey::Up => CrosstermKeyCode::Up,
        RealmKey::Down => CrosstermKeyCode::Down,
        RealmKey::Tab => CrosstermKeyCode::Tab,
        RealmKey::BackTab => CrosstermKeyCode::BackTab,
        RealmKey::Delete => CrosstermKeyCode::Delete,
        RealmKey::Char(ch) => CrosstermKeyCode::Char(ch),
        RealmKey::Esc => CrosstermKeyCode::Esc,
        _ => CrosstermKeyCode::Null,
    }
}

fn modifiers(modifiers: RealmKeyModifiers) -> CrosstermKeyModifiers {
    [
        (RealmKeyModifiers::SHIFT, CrosstermKeyModifiers::SHIFT),
        (RealmKeyModifiers::CONTROL, CrosstermKeyModifiers::CONTROL),
        (RealmKeyModifiers::ALT, CrosstermKeyModifiers::ALT),
    ]
    .into_iter()
    .filter(|(realm, _)| modifiers.contains(*realm))
    .fold(CrosstermKeyModifiers::empty(), |acc, (_, crossterm)| {
        acc | crossterm
    })
}

fn mouse_event(mouse: RealmMouseEvent) -> CrosstermMouseEvent {
    CrosstermMouseEvent {
        kind: mouse_kind(mouse.kind),
        column: mouse.column,
        row: mouse.row,
        modifiers: modifiers(mouse.modifiers),
    }
}

fn mouse_kind(kind: RealmMouseEventKind) -> CrosstermMouseEventKind {
    match kind {
        RealmMouseEventKind::Down(button) => CrosstermMouseEventKind::Down(mouse_button(button)),
        RealmMouseEventKind::Up(button) => CrosstermMouseEventKind::Up(mouse_button(button)),
        RealmMouseEventKind::Drag(button) => CrosstermMouseEventKind::Drag(mouse_button(button)),
        RealmMouseEventKind::Moved => CrosstermMouseEventKind::Moved,
        RealmMouseEventKind::ScrollDown => CrosstermMouseEventKind::ScrollDown,
        RealmMouseEventKind::ScrollUp => CrosstermMouseEventKind::ScrollUp,
        RealmMouseEventKind::ScrollLeft => CrosstermMouseEventKind::ScrollLeft,
        RealmMouseEventKind::ScrollRight => CrosstermMouseEventKind::ScrollRight,
    }
}

fn mouse_button(button: RealmMouseButton) -> CrosstermMouseButton {
    match button {
        RealmMouseButton::Left => CrosstermMouseButton::Left,
        RealmMouseButton::Right => CrosstermMouseButton::Right,
        RealmMouseButton::Middle => CrosstermMouseButton::Middle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes_used_by_the_board() {
        assert_eq!(key_code(RealmKey::Char(' ')), CrosstermKeyCode::Char(' '));
        assert_eq!(key_code(RealmKey::Enter), CrosstermKeyCode::Enter);
        assert_eq!(key_code(RealmKey::Esc), CrosstermKeyCode::Esc);
        assert_eq!(key_code(RealmKey::BackTab), CrosstermKeyCode::BackTab);
        assert_eq!(key_code(RealmKey::Home), CrosstermKeyCode::Null);
    }

    #[test]
    fn test_modifiers_combine() {
        let converted = modifiers(RealmKeyModifiers::SHIFT | RealmKeyModifiers::CONTROL);
        assert!(converted.contains(CrosstermKeyModifiers::SHIFT));
        assert!(converted.contains(CrosstermKeyModifiers::CONTROL));
        assert!(!converted.contains(CrosstermKeyModifiers::ALT));
        assert_eq!(
            modifiers(RealmKeyModifiers::empty()),
            CrosstermKeyModifiers::empty()
        );
    }

    #[test]
    fn test_left_drag_survives_conversion() {
        let converted = mouse_event(RealmMouseEvent {
            kind: RealmMouseEventKind::Drag(RealmMouseButton::Left),
            column: 42,
            row: 7,
            modifiers: RealmKeyModifiers::empty(),
        });
        assert_eq!(converted.column, 42);
        assert_eq!(converted.row, 7);
        assert_eq!(
            converted.kind,
            CrosstermMouseEventKind::Drag(CrosstermMouseButton::Left)
        );
    }

    #[test]
    fn test_horizontal_scroll_is_preserved() {
        assert_eq!(
            mouse_kind(RealmMouseEventKind::ScrollLeft),
            CrosstermMouseEventKind::ScrollLeft
        );
    }
}
