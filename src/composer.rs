use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::board::{BoardStore, append_card, find_card_location, find_column_index};
use crate::ids::{IdGenerator, timestamp_id};
use crate::types::{Card, Chip};

pub const NEW_CARD_CHIP_LABEL: &str = "Novo";
pub const NEW_CARD_CHIP_COLOR: &str = "neutral";
const MAX_ID_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Draft {
    pub title: String,
    pub description: String,
}

impl Draft {
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum ComposerField {
    #[default]
    Title,
    Description,
}

impl ComposerField {
    pub const fn next(self) -> Self {
        match self {
            Self::Title => Self::Description,
            Self::Description => Self::Title,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Composer {
    drafts: HashMap<String, Draft>,
    open_column: Option<String>,
    focused_field: ComposerField,
}

impl Composer {
    /// Opens the composer under `column_id`, closing any other column's
    /// composer. Drafts of other columns are kept.
    pub fn open(&mut self, column_id: impl Into<String>) {
        let column_id = column_id.into();
        self.drafts.entry(column_id.clone()).or_default();
        self.open_column = Some(column_id);
        self.focused_field = ComposerField::Title;
    }

    /// Closes the open composer and clears its draft.
    pub fn cancel(&mut self) {
        if let Some(column_id) = self.open_column.take() {
            self.drafts.insert(column_id, Draft::default());
        }
        self.focused_field = ComposerField::Title;
    }

    pub fn is_open(&self) -> bool {
        self.open_column.is_some()
    }

    pub fn open_column(&self) -> Option<&str> {
        self.open_column.as_deref()
    }

    pub fn focused_field(&self) -> ComposerField {
        self.focused_field
    }

    pub fn cycle_field(&mut self) {
        self.focused_field = self.focused_field.next();
    }

    pub fn draft(&self, column_id: &str) -> Option<&Draft> {
        self.drafts.get(column_id)
    }

    pub fn draft_mut(&mut self, column_id: &str) -> &mut Draft {
        self.drafts.entry(column_id.to_string()).or_default()
    }

    pub fn push_char(&mut self, ch: char) {
        if let Some(field) = self.focused_input() {
            field.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focused_input() {
            field.pop();
        }
    }

    pub fn can_create(&self, column_id: &str) -> bool {
        self.draft(column_id).is_some_and(Draft::has_title)
    }

    /// Appends a card built from the column's draft. Blank titles and unknown
    /// columns leave everything untouched and return `None`.
    pub fn create(
        &mut self,
        column_id: &str,
        board: &mut BoardStore,
        ids: &mut impl IdGenerator,
        created_on: NaiveDate,
    ) -> Option<String> {
        let draft = self.drafts.get(column_id)?;
        if !draft.has_title() || find_column_index(board.columns(), column_id).is_none() {
            return None;
        }

        let id = unique_id(board, ids);
        let card = build_card(&id, draft, created_on);
        if !board.apply(|columns| append_card(columns, column_id, card)) {
            return None;
        }

        debug!(card_id = %id, column_id, "card created from composer");
        self.drafts.insert(column_id.to_string(), Draft::default());
        if self.open_column.as_deref() == Some(column_id) {
            self.open_column = None;
            self.focused_field = ComposerField::Title;
        }
        Some(id)
    }

    fn focused_input(&mut self) -> Option<&mut String> {
        let column_id = self.open_column.as_ref()?;
        let draft = self.drafts.get_mut(column_id)?;
        Some(match self.focused_field {
            ComposerField::Title => &mut draft.title,
            ComposerField::Description => &mut draft.description,
        })
    }
}

pub fn build_card(id: &str, draft: &Draft, created_on: NaiveDate) -> Card {
    let description = draft.description.trim();
    Card {
        id: id.to_string(),
        title: draft.title.trim().to_string(),
        description: (!description.is_empty()).then(|| description.to_string()),
        chips: vec![Chip::new(NEW_CARD_CHIP_LABEL, NEW_CARD_CHIP_COLOR)],
        meta: Some(created_label(created_on)),
        ..Card::default()
    }
}

pub fn created_label(created_on: NaiveDate) -> String {
    format!("Criado em {}", created_on.format("%d/%m/%Y"))
}

fn unique_id(board: &BoardStore, ids: &mut impl IdGenerator) -> String {
    for _ in 0..MAX_ID_ATTEMPTS {
        let candidate = ids.next_id();
        if find_card_location(board.columns(), &candidate).is_none() {
            return candidate;
        }
    }
    timestamp_id()
}
