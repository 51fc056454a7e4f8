use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{ActiveDialog, App, Message};
use crate::drag::{DragEvent, KeyboardDirection};
use crate::keybindings::{KeyAction, KeyContext};

fn is_text_input(key: KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(ch)
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT) =>
        {
            Some(ch)
        }
        _ => None,
    }
}

impl App {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.active_dialog.is_open() {
            return self.handle_dialog_key(key);
        }
        if self.composer.is_open() {
            return self.handle_composer_key(key);
        }
        if self.drag.is_dragging() {
            return self.handle_drag_key(key);
        }

        if let Some(action) = self.keybindings.action_for_key(KeyContext::Global, key) {
            match action {
                KeyAction::ToggleHelp => self.update(Message::ToggleHelp)?,
                KeyAction::Quit => self.update(Message::Quit)?,
                _ => {}
            }
            return Ok(());
        }

        let Some(action) = self.keybindings.action_for_key(KeyContext::Board, key) else {
            return Ok(());
        };
        match action {
            KeyAction::NavigateLeft => self.update(Message::NavigateLeft)?,
            KeyAction::NavigateRight => self.update(Message::NavigateRight)?,
            KeyAction::SelectUp => self.update(Message::SelectUp)?,
            KeyAction::SelectDown => self.update(Message::SelectDown)?,
            KeyAction::PickUp => self.begin_keyboard_drag(),
            KeyAction::NewCard => {
                if let Some(column_id) = self.focused_column_id().map(str::to_string) {
                    self.update(Message::OpenComposer(column_id))?;
                }
            }
            KeyAction::EditCard => self.update(Message::OpenEditor)?,
            KeyAction::RemoveCard => self.update(Message::RemoveSelectedCard)?,
            KeyAction::Reload => self.update(Message::ReloadSnapshot)?,
            KeyAction::Dismiss => self.update(Message::DismissNotice)?,
            _ => {}
        }
        Ok(())
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) -> Result<()> {
        match &mut self.active_dialog {
            ActiveDialog::None => {}
            ActiveDialog::Help => {
                let toggles = self.keybindings.action_for_key(KeyContext::Global, key)
                    == Some(KeyAction::ToggleHelp);
                if toggles || key.code == KeyCode::Esc {
                    self.active_dialog = ActiveDialog::None;
                }
            }
            ActiveDialog::EditCard(session) => match key.code {
                KeyCode::Esc => self.active_dialog = ActiveDialog::None,
                KeyCode::Enter => self.update(Message::SaveEdit)?,
                KeyCode::Tab => session.focus_next(),
                KeyCode::BackTab => session.focus_previous(),
                KeyCode::Backspace => session.backspace(),
                _ => {
                    if let Some(ch) = is_text_input(key) {
                        session.push_char(ch);
                    }
                }
            },
        }
        Ok(())
    }

    fn handle_composer_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.update(Message::CancelComposer)?,
            KeyCode::Enter => self.update(Message::SubmitComposer)?,
            KeyCode::Tab | KeyCode::BackTab => self.composer.cycle_field(),
            KeyCode::Backspace => self.composer.backspace(),
            _ => {
                if let Some(ch) = is_text_input(key) {
                    self.composer.push_char(ch);
                }
            }
        }
        Ok(())
    }

    fn handle_drag_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.pointer.is_active() {
            // Pointer drags only listen for an abort from the keyboard.
            if key.code == KeyCode::Esc {
                self.dispatch_drag(DragEvent::Cancel);
            }
            return Ok(());
        }

        let Some(action) = self.keybindings.action_for_key(KeyContext::Drag, key) else {
            return Ok(());
        };
        match action {
            KeyAction::DragLeft => self.step_keyboard_drag(KeyboardDirection::Left),
            KeyAction::DragRight => self.step_keyboard_drag(KeyboardDirection::Right),
            KeyAction::DragUp => self.step_keyboard_drag(KeyboardDirection::Up),
            KeyAction::DragDown => self.step_keyboard_drag(KeyboardDirection::Down),
            KeyAction::Drop => self.drop_keyboard_drag(),
            KeyAction::CancelDrag => {
                self.dispatch_drag(DragEvent::Cancel);
            }
            _ => {}
        }
        Ok(())
    }
}
