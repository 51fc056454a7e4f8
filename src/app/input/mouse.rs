use anyhow::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::app::{ActiveDialog, App, InteractionKind, InteractionLayer, Message};
use crate::drag::{DragEvent, PointerSignal};

impl App {
    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        let position = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.hovered_message = None;

                let node = self
                    .interaction_map
                    .resolve_node(mouse.column, mouse.row, InteractionKind::Press)
                    .filter(|node| {
                        !self.active_dialog.is_open() || node.layer != InteractionLayer::Base
                    })
                    .cloned();
                match node {
                    Some(node) if node.draggable && !self.drag.is_dragging() => {
                        if let Message::SelectCard(card_id) = node.message {
                            self.pointer.press(card_id, node.rect, position);
                        }
                    }
                    // Buttons stay inert until the lifted card is dropped or cancelled.
                    Some(node) if node.clickable && !self.drag.is_dragging() => {
                        self.update(node.message)?
                    }
                    _ => {
                        if self.active_dialog == ActiveDialog::Help {
                            self.active_dialog = ActiveDialog::None;
                        }
                    }
                }
            }

            MouseEventKind::Drag(MouseButton::Left) => match self.pointer.motion(position) {
                PointerSignal::Start { card_id, dragged } => {
                    self.drag_rect = Some(dragged);
                    self.dispatch_drag(DragEvent::Start { card_id });
                    if self.drag.is_dragging() {
                        self.pointer_drag_over(dragged);
                    } else {
                        self.pointer.reset();
                        self.drag_rect = None;
                    }
                }
                PointerSignal::Move { dragged } if self.drag.is_dragging() => {
                    self.pointer_drag_over(dragged);
                }
                _ => {}
            },

            MouseEventKind::Up(MouseButton::Left) => match self.pointer.release(position) {
                PointerSignal::Click { card_id } => self.update(Message::SelectCard(card_id))?,
                PointerSignal::Release { dragged } if self.drag.is_dragging() => {
                    self.pointer_drag_end(dragged);
                }
                _ => {}
            },

            MouseEventKind::Moved => {
                let hit = self.interaction_map.resolve_message(
                    mouse.column,
                    mouse.row,
                    InteractionKind::Hover,
                );
                self.hovered_message = hit;
            }

            _ => {}
        }

        Ok(())
    }
}
