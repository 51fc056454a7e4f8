use tracing::debug;

use crate::board::{BoardStore, find_column_index, replace_card};
use crate::types::Card;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum EditField {
    #[default]
    Title,
    Description,
    Owner,
    DueDate,
    Metric,
}

impl EditField {
    pub const ALL: [Self; 5] = [
        Self::Title,
        Self::Description,
        Self::Owner,
        Self::DueDate,
        Self::Metric,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Description => "Description",
            Self::Owner => "Owner",
            Self::DueDate => "Due date",
            Self::Metric => "Metric",
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Title => Self::Description,
            Self::Description => Self::Owner,
            Self::Owner => Self::DueDate,
            Self::DueDate => Self::Metric,
            Self::Metric => Self::Title,
        }
    }

    pub const fn previous(self) -> Self {
        match self {
            Self::Title => Self::Metric,
            Self::Description => Self::Title,
            Self::Owner => Self::Description,
            Self::DueDate => Self::Owner,
            Self::Metric => Self::DueDate,
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct EditForm {
    pub title: String,
    pub description: String,
    pub owner: String,
    pub due_date: String,
    pub metric: String,
}

impl EditForm {
    pub fn from_card(card: &Card) -> Self {
        Self {
            title: card.title.clone(),
            description: card.description.clone().unwrap_or_default(),
            owner: card.owner.clone().unwrap_or_default(),
            due_date: card.due_date.clone().unwrap_or_default(),
            metric: card.metric.clone().unwrap_or_default(),
        }
    }

    pub fn field(&self, field: EditField) -> &str {
        match field {
            EditField::Title => &self.title,
            EditField::Description => &self.description,
            EditField::Owner => &self.owner,
            EditField::DueDate => &self.due_date,
            EditField::Metric => &self.metric,
        }
    }

    pub fn field_mut(&mut self, field: EditField) -> &mut String {
        match field {
            EditField::Title => &mut self.title,
            EditField::Description => &mut self.description,
            EditField::Owner => &mut self.owner,
            EditField::DueDate => &mut self.due_date,
            EditField::Metric => &mut self.metric,
        }
    }

    /// Merges the form into `card`. Blank optional fields become absent.
    pub fn apply_to(&self, card: &Card) -> Card {
        Card {
            title: self.title.trim().to_string(),
            description: non_blank(&self.description),
            owner: non_blank(&self.owner),
            due_date: non_blank(&self.due_date),
            metric: non_blank(&self.metric),
            ..card.clone()
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EditSession {
    pub column_id: String,
    pub card_id: String,
    pub form: EditForm,
    pub focused_field: EditField,
}

impl EditSession {
    /// Loads the card's editable fields. `None` when the card is not in the
    /// given column.
    pub fn open(board: &BoardStore, column_id: &str, card_id: &str) -> Option<Self> {
        let column_index = find_column_index(board.columns(), column_id)?;
        let card = board.columns()[column_index]
            .cards
            .iter()
            .find(|card| card.id == card_id)?;

        Some(Self {
            column_id: column_id.to_string(),
            card_id: card_id.to_string(),
            form: EditForm::from_card(card),
            focused_field: EditField::Title,
        })
    }

    pub fn can_save(&self) -> bool {
        !self.form.title.trim().is_empty()
    }

    pub fn push_char(&mut self, ch: char) {
        self.form.field_mut(self.focused_field).push(ch);
    }

    pub fn backspace(&mut self) {
        self.form.field_mut(self.focused_field).pop();
    }

    pub fn focus_next(&mut self) {
        self.focused_field = self.focused_field.next();
    }

    pub fn focus_previous(&mut self) {
        self.focused_field = self.focused_field.previous();
    }

    /// Writes the form back into the board. Returns `false` when saving is not
    /// allowed (blank title) or the card has disappeared; the session is left
    /// for the caller to keep open in that case.
    pub fn save(&self, board: &mut BoardStore) -> bool {
        if !self.can_save() {
            return false;
        }
        let Some(column_index) = find_column_index(board.columns(), &self.column_id) else {
            return false;
        };
        let Some(current) = board.columns()[column_index]
            .cards
            .iter()
            .find(|card| card.id == self.card_id)
        else {
            return false;
        };

        let merged = self.form.apply_to(current);
        board.apply(|columns| replace_card(columns, &self.column_id, merged));
        debug!(card_id = %self.card_id, column_id = %self.column_id, "card edited");
        true
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
