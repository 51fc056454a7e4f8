use tuirealm::ratatui::layout::Rect;

use crate::collision::{Droppable, DroppableKind};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KeyboardDirection {
    Up,
    Down,
    Left,
    Right,
}

impl KeyboardDirection {
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

/// Keyboard pick-up/move/drop. Holds a virtual dragged rectangle that jumps
/// between droppables; the collision strategy then resolves it exactly like a
/// pointer-driven rectangle.
#[derive(Debug, Clone, Default)]
pub struct KeyboardSensor {
    rect: Option<Rect>,
}

impl KeyboardSensor {
    pub fn pick_up(&mut self, card_rect: Rect) {
        self.rect = Some(card_rect);
    }

    pub fn is_holding(&self) -> bool {
        self.rect.is_some()
    }

    pub fn current(&self) -> Option<Rect> {
        self.rect
    }

    /// Moves the virtual rectangle onto the nearest droppable in `direction`,
    /// skipping the lifted card's own slot. Returns the new rectangle, or
    /// `None` when nothing lies that way.
    pub fn step(
        &mut self,
        direction: KeyboardDirection,
        droppables: &[Droppable],
        active_card_id: &str,
    ) -> Option<Rect> {
        let current = self.rect?;
        let next = nearest_in_direction(current, direction, droppables, active_card_id)?;
        self.rect = Some(next);
        Some(next)
    }

    pub fn release(&mut self) -> Option<Rect> {
        self.rect.take()
    }
}

fn nearest_in_direction(
    current: Rect,
    direction: KeyboardDirection,
    droppables: &[Droppable],
    active_card_id: &str,
) -> Option<Rect> {
    let (cx, cy) = center(current);
    let mut best: Option<(i32, Rect)> = None;

    for droppable in droppables {
        if matches!(&droppable.kind, DroppableKind::Card { card_id, .. } if card_id == active_card_id)
        {
            continue;
        }
        let (tx, ty) = center(droppable.rect);
        let (primary, secondary) = match direction {
            KeyboardDirection::Up => (cy - ty, (tx - cx).abs()),
            KeyboardDirection::Down => (ty - cy, (tx - cx).abs()),
            KeyboardDirection::Left => (cx - tx, (ty - cy).abs()),
            KeyboardDirection::Right => (tx - cx, (ty - cy).abs()),
        };
        if primary <= 0 {
            continue;
        }
        // Vertical steps stay inside the current column; horizontal steps
        // favour targets on the same row.
        if direction.is_vertical() && !overlaps_horizontally(current, droppable.rect) {
            continue;
        }
        let score = primary + secondary * 2;
        match best {
            Some((best_score, _)) if score >= best_score => {}
            _ => best = Some((score, droppable.rect)),
        }
    }

    best.map(|(_, rect)| rect)
}

fn center(rect: Rect) -> (i32, i32) {
    (
        i32::from(rect.x) + i32::from(rect.width) / 2,
        i32::from(rect.y) + i32::from(rect.height) / 2,
    )
}

fn overlaps_horizontally(a: Rect, b: Rect) -> bool {
    let a_end = u32::from(a.x) + u32::from(a.width);
    let b_end = u32::from(b.x) + u32::from(b.width);
    u32::from(a.x) < b_end && u32::from(b.x) < a_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn droppables() -> Vec<Droppable> {
        vec![
            Droppable::card("todo", "c1", Rect::new(1, 2, 20, 3)),
            Droppable::card("todo", "c2", Rect::new(1, 5, 20, 3)),
            Droppable::column("todo", Rect::new(1, 8, 20, 10)),
            Droppable::card("done", "c3", Rect::new(23, 2, 20, 3)),
            Droppable::column("done", Rect::new(23, 5, 20, 13)),
        ]
    }

    #[test]
    fn step_down_skips_active_card() {
        let mut sensor = KeyboardSensor::default();
        sensor.pick_up(Rect::new(1, 2, 20, 3));
        let next = sensor.step(KeyboardDirection::Down, &droppables(), "c1");
        assert_eq!(next, Some(Rect::new(1, 5, 20, 3)));

        let next = sensor.step(KeyboardDirection::Down, &droppables(), "c1");
        assert_eq!(next, Some(Rect::new(1, 8, 20, 10)));
    }

    #[test]
    fn step_right_prefers_same_row() {
        let mut sensor = KeyboardSensor::default();
        sensor.pick_up(Rect::new(1, 2, 20, 3));
        let next = sensor.step(KeyboardDirection::Right, &droppables(), "c1");
        assert_eq!(next, Some(Rect::new(23, 2, 20, 3)));
    }

    #[test]
    fn step_without_target_keeps_position() {
        let mut sensor = KeyboardSensor::default();
        sensor.pick_up(Rect::new(1, 2, 20, 3));
        assert_eq!(sensor.step(KeyboardDirection::Left, &droppables(), "c1"), None);
        assert_eq!(sensor.current(), Some(Rect::new(1, 2, 20, 3)));
        assert_eq!(sensor.release(), Some(Rect::new(1, 2, 20, 3)));
        assert!(!sensor.is_holding());
    }

    #[test]
    fn step_requires_pick_up() {
        let mut sensor = KeyboardSensor::default();
        assert_eq!(sensor.step(KeyboardDirection::Down, &droppables(), "c1"), None);
    }
}
