use tuirealm::ratatui::layout::Rect;

use crate::collision::Droppable;
use crate::types::{Card, Column};

const HEADER_HEIGHT: u16 = 1;
const FOOTER_HEIGHT: u16 = 1;
const COLUMN_GAP: u16 = 1;
const COLUMN_HEADER_HEIGHT: u16 = 2;
const ADD_BUTTON_HEIGHT: u16 = 1;
pub const COMPOSER_HEIGHT: u16 = 5;
const MAX_VISIBLE_ITEMS: usize = 3;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CardSlot {
    pub card_id: String,
    pub card_index: usize,
    pub rect: Rect,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ColumnSlot {
    pub column_id: String,
    pub rect: Rect,
    pub header: Rect,
    pub body: Rect,
    /// Empty space under the last card; dropping here appends.
    pub drop_zone: Rect,
    pub add_button: Option<Rect>,
    pub composer: Option<Rect>,
    pub cards: Vec<CardSlot>,
    pub hidden_cards: usize,
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct BoardLayout {
    pub header: Rect,
    pub surface: Rect,
    pub footer: Rect,
    pub columns: Vec<ColumnSlot>,
}

impl BoardLayout {
    pub fn compute(area: Rect, columns: &[Column], composer_column: Option<&str>) -> Self {
        let header = Rect {
            height: HEADER_HEIGHT.min(area.height),
            ..area
        };
        let footer_y = area.bottom().saturating_sub(FOOTER_HEIGHT).max(header.bottom());
        let footer = Rect::new(area.x, footer_y, area.width, area.bottom() - footer_y);
        let surface = Rect::new(
            area.x,
            header.bottom(),
            area.width,
            footer.y.saturating_sub(header.bottom()),
        );

        let slots = column_rects(surface, columns.len())
            .into_iter()
            .zip(columns)
            .map(|(rect, column)| {
                layout_column(rect, column, composer_column == Some(column.id.as_str()))
            })
            .collect();

        Self {
            header,
            surface,
            footer,
            columns: slots,
        }
    }

    /// Every card slot plus every column's drop zone, cards first in board
    /// order so ties resolve toward cards.
    pub fn droppables(&self) -> Vec<Droppable> {
        let cards = self.columns.iter().flat_map(|column| {
            column
                .cards
                .iter()
                .map(|slot| Droppable::card(&column.column_id, &slot.card_id, slot.rect))
        });
        let zones = self
            .columns
            .iter()
            .map(|column| Droppable::column(&column.column_id, column.drop_zone));
        cards.chain(zones).collect()
    }

    pub fn card_rect(&self, card_id: &str) -> Option<Rect> {
        self.columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .find(|slot| slot.card_id == card_id)
            .map(|slot| slot.rect)
    }

    pub fn card_at(&self, x: u16, y: u16) -> Option<&CardSlot> {
        self.columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .find(|slot| contains(slot.rect, x, y))
    }

    pub fn column_index_at(&self, x: u16, y: u16) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| contains(column.rect, x, y))
    }
}

/// Rows a card needs, borders included.
pub fn card_height(card: &Card) -> u16 {
    let mut rows: u16 = 2 + 1;
    if !card.chips.is_empty() {
        rows += 1;
    }
    if card.description.is_some() {
        rows += 1;
    }
    if card.metric.is_some() || card.progress.is_some() {
        rows += 1;
    }
    if card.owner.is_some() || card.due_date.is_some() {
        rows += 1;
    }
    if card.meta.is_some() {
        rows += 1;
    }
    if let Some(items) = card.items.as_ref() {
        rows += items.len().min(MAX_VISIBLE_ITEMS) as u16;
    }
    rows
}

fn column_rects(surface: Rect, count: usize) -> Vec<Rect> {
    if count == 0 || surface.width == 0 {
        return vec![Rect::new(surface.x, surface.y, 0, surface.height); count];
    }
    let count_u16 = u16::try_from(count).unwrap_or(u16::MAX);
    let gaps = COLUMN_GAP.saturating_mul(count_u16 - 1);
    let usable = surface.width.saturating_sub(gaps);
    let base = usable / count_u16;
    let remainder = usable % count_u16;

    let mut x = surface.x;
    (0..count_u16)
        .map(|index| {
            let width = base + u16::from(index < remainder);
            let rect = Rect::new(x, surface.y, width, surface.height);
            x = x.saturating_add(width + COLUMN_GAP);
            rect
        })
        .collect()
}

fn layout_column(rect: Rect, column: &Column, composer_open: bool) -> ColumnSlot {
    let inner = Rect::new(
        rect.x.saturating_add(1),
        rect.y.saturating_add(1),
        rect.width.saturating_sub(2),
        rect.height.saturating_sub(2),
    );
    let header = Rect {
        height: COLUMN_HEADER_HEIGHT.min(inner.height),
        ..inner
    };

    let footer_height = if composer_open {
        COMPOSER_HEIGHT
    } else {
        ADD_BUTTON_HEIGHT
    };
    let footer_height = footer_height.min(inner.height.saturating_sub(header.height));
    let footer = Rect::new(
        inner.x,
        inner.bottom().saturating_sub(footer_height),
        inner.width,
        footer_height,
    );
    let body = Rect::new(
        inner.x,
        header.bottom(),
        inner.width,
        footer.y.saturating_sub(header.bottom()),
    );

    let mut cards = Vec::new();
    let mut y = body.y;
    for (card_index, card) in column.cards.iter().enumerate() {
        let height = card_height(card);
        if y.saturating_add(height) > body.bottom() {
            break;
        }
        cards.push(CardSlot {
            card_id: card.id.clone(),
            card_index,
            rect: Rect::new(body.x, y, body.width, height),
        });
        y += height;
    }
    let hidden_cards = column.cards.len() - cards.len();

    let remaining = body.bottom().saturating_sub(y);
    let drop_zone = if remaining > 0 {
        Rect::new(body.x, y, body.width, remaining)
    } else {
        body
    };

    let (add_button, composer) = if footer.height == 0 {
        (None, None)
    } else if composer_open {
        (None, Some(footer))
    } else {
        (Some(footer), None)
    };

    ColumnSlot {
        column_id: column.id.clone(),
        rect,
        header,
        body,
        drop_zone,
        add_button,
        composer,
        cards,
        hidden_cards,
    }
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.right() && y >= rect.y && y < rect.bottom()
}
