mod store;

use std::borrow::Cow;

use crate::types::{Card, Column};

pub use self::store::{BoardSnapshot, BoardStore};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CardLocation {
    pub column_index: usize,
    pub card_index: usize,
}

pub fn clone_board(columns: &[Column]) -> Vec<Column> {
    columns.to_vec()
}

pub fn find_column_index(columns: &[Column], column_id: &str) -> Option<usize> {
    columns.iter().position(|column| column.id == column_id)
}

pub fn find_card_location(columns: &[Column], card_id: &str) -> Option<CardLocation> {
    columns
        .iter()
        .enumerate()
        .find_map(|(column_index, column)| {
            column
                .cards
                .iter()
                .position(|card| card.id == card_id)
                .map(|card_index| CardLocation {
                    column_index,
                    card_index,
                })
        })
}

pub fn find_card<'a>(columns: &'a [Column], card_id: &str) -> Option<&'a Card> {
    let location = find_card_location(columns, card_id)?;
    columns[location.column_index]
        .cards
        .get(location.card_index)
}

pub fn column_of_card<'a>(columns: &'a [Column], card_id: &str) -> Option<&'a str> {
    let location = find_card_location(columns, card_id)?;
    Some(columns[location.column_index].id.as_str())
}

pub fn card_count(columns: &[Column]) -> usize {
    columns.iter().map(|column| column.cards.len()).sum()
}

// `Cow::Borrowed` from any transformation below means nothing changed.

/// Moves `active_card_id` to the slot currently held by `over_card_id`,
/// shifting the cards in between. An `over_card_id` that is not a card of the
/// column (for example the column id itself) sends the card to the end.
pub fn reorder_within_column<'a>(
    columns: &'a [Column],
    column_id: &str,
    active_card_id: &str,
    over_card_id: &str,
) -> Cow<'a, [Column]> {
    let Some(column_index) = find_column_index(columns, column_id) else {
        return Cow::Borrowed(columns);
    };
    let cards = &columns[column_index].cards;
    let Some(from) = cards.iter().position(|card| card.id == active_card_id) else {
        return Cow::Borrowed(columns);
    };
    let to = cards
        .iter()
        .position(|card| card.id == over_card_id)
        .unwrap_or(cards.len() - 1);

    if from == to {
        return Cow::Borrowed(columns);
    }

    let mut next = clone_board(columns);
    let target = &mut next[column_index].cards;
    let card = target.remove(from);
    target.insert(to, card);
    Cow::Owned(next)
}

/// Transfers `card_id` from one column to another, inserting it before
/// `over_card_id` or appending when that id is not a card of the destination.
pub fn move_between_columns<'a>(
    columns: &'a [Column],
    from_column_id: &str,
    to_column_id: &str,
    card_id: &str,
    over_card_id: &str,
) -> Cow<'a, [Column]> {
    if from_column_id == to_column_id {
        return Cow::Borrowed(columns);
    }
    let (Some(from_index), Some(to_index)) = (
        find_column_index(columns, from_column_id),
        find_column_index(columns, to_column_id),
    ) else {
        return Cow::Borrowed(columns);
    };
    let Some(card_index) = columns[from_index]
        .cards
        .iter()
        .position(|card| card.id == card_id)
    else {
        return Cow::Borrowed(columns);
    };

    let mut next = clone_board(columns);
    let card = next[from_index].cards.remove(card_index);
    let destination = &mut next[to_index].cards;
    let insert_at = destination
        .iter()
        .position(|candidate| candidate.id == over_card_id)
        .unwrap_or(destination.len());
    destination.insert(insert_at, card);
    Cow::Owned(next)
}

/// Appends `card` to the end of a column. Refuses ids that already exist
/// anywhere on the board.
pub fn append_card<'a>(columns: &'a [Column], column_id: &str, card: Card) -> Cow<'a, [Column]> {
    let Some(column_index) = find_column_index(columns, column_id) else {
        return Cow::Borrowed(columns);
    };
    if find_card_location(columns, &card.id).is_some() {
        return Cow::Borrowed(columns);
    }

    let mut next = clone_board(columns);
    next[column_index].cards.push(card);
    Cow::Owned(next)
}

/// Replaces the card with the same id inside `column_id`, keeping its slot.
pub fn replace_card<'a>(columns: &'a [Column], column_id: &str, card: Card) -> Cow<'a, [Column]> {
    let Some(column_index) = find_column_index(columns, column_id) else {
        return Cow::Borrowed(columns);
    };
    let Some(card_index) = columns[column_index]
        .cards
        .iter()
        .position(|candidate| candidate.id == card.id)
    else {
        return Cow::Borrowed(columns);
    };
    if columns[column_index].cards[card_index] == card {
        return Cow::Borrowed(columns);
    }

    let mut next = clone_board(columns);
    next[column_index].cards[card_index] = card;
    Cow::Owned(next)
}

pub fn remove_card<'a>(columns: &'a [Column], card_id: &str) -> Cow<'a, [Column]> {
    let Some(location) = find_card_location(columns, card_id) else {
        return Cow::Borrowed(columns);
    };

    let mut next = clone_board(columns);
    next[location.column_index]
        .cards
        .remove(location.card_index);
    Cow::Owned(next)
}
