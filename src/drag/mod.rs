//! Drag session state machine.
//!
//! Pointer and keyboard input are both reduced to [`DragEvent`]s before they
//! reach the [`DragController`], so a single transition table drives either
//! modality:
//!
//! | State    | Event          | Effect                                              |
//! |----------|----------------|-----------------------------------------------------|
//! | Idle     | Start(card)    | lift the card, enter Dragging (unknown card: stay)  |
//! | Dragging | Over(target)   | other column: move the card now; same column: none  |
//! | Dragging | End(target)    | same column: commit the reorder; back to Idle       |
//! | Dragging | End(none)      | treated as Cancel                                   |
//! | Dragging | Cancel         | back to Idle, moves kept or restored per policy     |
//!
//! Cross-column moves are committed eagerly on every Over, so the final board
//! depends on the whole path the drag took, not only on its endpoints.

pub mod keyboard;
pub mod pointer;

use tracing::debug;

use crate::board::{
    BoardStore, column_of_card, find_card, move_between_columns, reorder_within_column,
};
use crate::collision::CollisionTarget;
use crate::types::{Card, Column};

pub use self::keyboard::{KeyboardDirection, KeyboardSensor};
pub use self::pointer::{PointerSensor, PointerSignal};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
}

/// What Cancel does with cross-column moves already applied during the drag.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum CancelPolicy {
    #[default]
    KeepMoves,
    RestoreSnapshot,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DragEvent {
    Start { card_id: String },
    Over(Option<CollisionTarget>),
    End(Option<CollisionTarget>),
    Cancel,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DragOutcome {
    Ignored,
    Lifted,
    Moved,
    Hovering,
    Reordered,
    Dropped,
    Cancelled,
    Restored,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ActiveDrag {
    pub card: Card,
    pub origin_column_id: String,
    pub last_target: Option<CollisionTarget>,
    pre_drag: Option<Vec<Column>>,
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    policy: CancelPolicy,
    active: Option<ActiveDrag>,
}

impl DragController {
    pub fn new(policy: CancelPolicy) -> Self {
        Self {
            policy,
            active: None,
        }
    }

    pub fn policy(&self) -> CancelPolicy {
        self.policy
    }

    pub fn phase(&self) -> DragPhase {
        if self.active.is_some() {
            DragPhase::Dragging
        } else {
            DragPhase::Idle
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveDrag> {
        self.active.as_ref()
    }

    /// The card rendered in the drag overlay.
    pub fn lifted_card(&self) -> Option<&Card> {
        self.active.as_ref().map(|active| &active.card)
    }

    /// Drops any session without touching the board. Used when the board is
    /// re-seeded underneath an in-flight drag.
    pub fn reset(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(card_id = %active.card.id, "drag session discarded");
        }
    }

    pub fn handle(&mut self, board: &mut BoardStore, event: DragEvent) -> DragOutcome {
        match event {
            DragEvent::Start { card_id } => self.start(board, &card_id),
            DragEvent::Over(target) => self.over(board, target),
            DragEvent::End(Some(target)) => self.end(board, target),
            DragEvent::End(None) | DragEvent::Cancel => self.cancel(board),
        }
    }

    fn start(&mut self, board: &BoardStore, card_id: &str) -> DragOutcome {
        if self.active.is_some() {
            return DragOutcome::Ignored;
        }
        let columns = board.columns();
        let (Some(card), Some(column_id)) =
            (find_card(columns, card_id), column_of_card(columns, card_id))
        else {
            return DragOutcome::Ignored;
        };

        debug!(card_id, column_id, "drag started");
        self.active = Some(ActiveDrag {
            card: card.clone(),
            origin_column_id: column_id.to_string(),
            last_target: None,
            pre_drag: match self.policy {
                CancelPolicy::KeepMoves => None,
                CancelPolicy::RestoreSnapshot => Some(columns.to_vec()),
            },
        });
        DragOutcome::Lifted
    }

    fn over(&mut self, board: &mut BoardStore, target: Option<CollisionTarget>) -> DragOutcome {
        let Some(active) = self.active.as_mut() else {
            return DragOutcome::Ignored;
        };
        let Some(target) = target else {
            return DragOutcome::Ignored;
        };
        let card_id = active.card.id.clone();
        let Some(current_column) = column_of_card(board.columns(), &card_id).map(str::to_string)
        else {
            return DragOutcome::Ignored;
        };

        let outcome = if current_column == target.container_id {
            DragOutcome::Hovering
        } else if board.apply(|columns| {
            move_between_columns(
                columns,
                &current_column,
                &target.container_id,
                &card_id,
                &target.over_id,
            )
        }) {
            debug!(
                card_id = %card_id,
                from = %current_column,
                to = %target.container_id,
                "card moved across columns during drag"
            );
            DragOutcome::Moved
        } else {
            DragOutcome::Ignored
        };

        active.last_target = Some(target);
        outcome
    }

    fn end(&mut self, board: &mut BoardStore, target: CollisionTarget) -> DragOutcome {
        let Some(active) = self.active.take() else {
            return DragOutcome::Ignored;
        };
        let card_id = active.card.id;
        let current_column = column_of_card(board.columns(), &card_id).map(str::to_string);

        let reordered = current_column.as_deref() == Some(target.container_id.as_str())
            && board.apply(|columns| {
                reorder_within_column(columns, &target.container_id, &card_id, &target.over_id)
            });

        debug!(
            card_id = %card_id,
            column = %target.container_id,
            reordered,
            "drag ended"
        );
        if reordered {
            DragOutcome::Reordered
        } else {
            DragOutcome::Dropped
        }
    }

    fn cancel(&mut self, board: &mut BoardStore) -> DragOutcome {
        let Some(active) = self.active.take() else {
            return DragOutcome::Ignored;
        };

        match active.pre_drag {
            Some(pre_drag) if pre_drag.as_slice() != board.columns() => {
                debug!(card_id = %active.card.id, "drag cancelled, board restored");
                board.replace(pre_drag);
                DragOutcome::Restored
            }
            _ => {
                debug!(card_id = %active.card.id, "drag cancelled");
                DragOutcome::Cancelled
            }
        }
    }
}
