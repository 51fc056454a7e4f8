use crate::editor::EditSession;

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub enum ActiveDialog {
    #[default]
    None,
    Help,
    EditCard(EditSession),
}

impl ActiveDialog {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Keyboard focus: a column, and optionally a card in it tracked by id so it
/// survives reorders and moves.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct BoardFocus {
    pub column: usize,
    pub card_id: Option<String>,
}
