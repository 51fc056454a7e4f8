use crossterm::event::{KeyEvent, MouseEvent};

use crate::composer::ComposerField;
use crate::editor::EditField;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Message {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    Quit,
    ToggleHelp,
    DismissDialog,
    DismissNotice,
    FocusColumn(usize),
    SelectCard(String),
    SelectUp,
    SelectDown,
    NavigateLeft,
    NavigateRight,
    OpenComposer(String),
    FocusComposerField(ComposerField),
    SubmitComposer,
    CancelComposer,
    OpenEditor,
    FocusEditField(EditField),
    SaveEdit,
    RemoveSelectedCard,
    ReloadSnapshot,
}
