use tuirealm::ratatui::layout::Rect;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DroppableKind {
    Card { column_id: String, card_id: String },
    Column { column_id: String },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Droppable {
    pub kind: DroppableKind,
    pub rect: Rect,
}

impl Droppable {
    pub fn card(column_id: impl Into<String>, card_id: impl Into<String>, rect: Rect) -> Self {
        Self {
            kind: DroppableKind::Card {
                column_id: column_id.into(),
                card_id: card_id.into(),
            },
            rect,
        }
    }

    pub fn column(column_id: impl Into<String>, rect: Rect) -> Self {
        Self {
            kind: DroppableKind::Column {
                column_id: column_id.into(),
            },
            rect,
        }
    }

    pub fn container_id(&self) -> &str {
        match &self.kind {
            DroppableKind::Card { column_id, .. } | DroppableKind::Column { column_id } => {
                column_id
            }
        }
    }

    pub fn over_id(&self) -> &str {
        match &self.kind {
            DroppableKind::Card { card_id, .. } => card_id,
            DroppableKind::Column { column_id } => column_id,
        }
    }

    pub fn target(&self) -> CollisionTarget {
        CollisionTarget {
            container_id: self.container_id().to_string(),
            over_id: self.over_id().to_string(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CollisionTarget {
    pub container_id: String,
    pub over_id: String,
}

impl CollisionTarget {
    pub fn drop_zone(column_id: impl Into<String>) -> Self {
        let column_id = column_id.into();
        Self {
            over_id: column_id.clone(),
            container_id: column_id,
        }
    }

    pub fn card(column_id: impl Into<String>, card_id: impl Into<String>) -> Self {
        Self {
            container_id: column_id.into(),
            over_id: card_id.into(),
        }
    }

    pub fn is_drop_zone(&self) -> bool {
        self.container_id == self.over_id
    }
}

/// Maps the dragged rect onto one of the droppables. A target whose `over_id`
/// equals its `container_id` is the empty area of a column.
pub trait CollisionStrategy {
    fn resolve(&self, dragged: Rect, candidates: &[Droppable]) -> Option<CollisionTarget>;
}

/// Scores each candidate by the summed distance between its four corners and
/// the dragged rectangle's corners. Candidates under the dragged rectangle's
/// center are preferred over the rest; equal scores keep registration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosestCorners {
    surface: Option<Rect>,
}

impl ClosestCorners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts resolution to drags whose center lies inside `surface`.
    pub fn within(surface: Rect) -> Self {
        Self {
            surface: Some(surface),
        }
    }
}

impl CollisionStrategy for ClosestCorners {
    fn resolve(&self, dragged: Rect, candidates: &[Droppable]) -> Option<CollisionTarget> {
        let center = rect_center(dragged);
        if let Some(surface) = self.surface
            && !contains_point(surface, center)
        {
            return None;
        }

        let under_center: Vec<&Droppable> = candidates
            .iter()
            .filter(|candidate| contains_point(candidate.rect, center))
            .collect();
        let pool: Vec<&Droppable> = if under_center.is_empty() {
            candidates.iter().collect()
        } else {
            under_center
        };

        let mut best: Option<(f64, &Droppable)> = None;
        for candidate in pool {
            let score = corner_distance(dragged, candidate.rect);
            match best {
                Some((best_score, _)) if score >= best_score => {}
                _ => best = Some((score, candidate)),
            }
        }

        best.map(|(_, droppable)| droppable.target())
    }
}

fn corners(rect: Rect) -> [(f64, f64); 4] {
    let left = f64::from(rect.x);
    let top = f64::from(rect.y);
    let right = left + f64::from(rect.width);
    let bottom = top + f64::from(rect.height);
    [(left, top), (right, top), (left, bottom), (right, bottom)]
}

fn corner_distance(a: Rect, b: Rect) -> f64 {
    corners(a)
        .iter()
        .zip(corners(b).iter())
        .map(|((ax, ay), (bx, by))| ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt())
        .sum()
}

fn rect_center(rect: Rect) -> (u16, u16) {
    (
        rect.x.saturating_add(rect.width / 2),
        rect.y.saturating_add(rect.height / 2),
    )
}

fn contains_point(rect: Rect, (col, row): (u16, u16)) -> bool {
    col >= rect.x
        && u32::from(col) < u32::from(rect.x) + u32::from(rect.width)
        && row >= rect.y
        && u32::from(row) < u32::from(rect.y) + u32::from(rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Droppable> {
        vec![
            Droppable::card("todo", "c1", Rect::new(1, 2, 20, 3)),
            Droppable::card("todo", "c2", Rect::new(1, 6, 20, 3)),
            Droppable::column("todo", Rect::new(1, 9, 20, 10)),
            Droppable::card("done", "c3", Rect::new(23, 2, 20, 3)),
            Droppable::column("done", Rect::new(23, 5, 20, 14)),
        ]
    }

    #[test]
    fn resolves_card_under_pointer() {
        let target = ClosestCorners::new()
            .resolve(Rect::new(2, 6, 20, 3), &candidates())
            .expect("target");
        assert_eq!(target, CollisionTarget::card("todo", "c2"));
        assert!(!target.is_drop_zone());
    }

    #[test]
    fn resolves_empty_area_to_column_drop_zone() {
        let target = ClosestCorners::new()
            .resolve(Rect::new(24, 10, 20, 3), &candidates())
            .expect("target");
        assert_eq!(target, CollisionTarget::drop_zone("done"));
        assert!(target.is_drop_zone());
    }

    #[test]
    fn falls_back_to_nearest_corners_between_targets() {
        // Center lands in the gap between c1 and c2.
        let target = ClosestCorners::new()
            .resolve(Rect::new(1, 3, 20, 4), &candidates())
            .expect("target");
        assert_eq!(target, CollisionTarget::card("todo", "c1"));
    }

    #[test]
    fn ties_are_broken_by_registration_order() {
        let rect = Rect::new(0, 0, 10, 2);
        let tied = vec![
            Droppable::card("a", "first", rect),
            Droppable::card("b", "second", rect),
        ];
        let strategy = ClosestCorners::new();
        for _ in 0..3 {
            assert_eq!(
                strategy.resolve(rect, &tied),
                Some(CollisionTarget::card("a", "first"))
            );
        }
    }

    #[test]
    fn outside_surface_resolves_nothing() {
        let strategy = ClosestCorners::within(Rect::new(0, 0, 44, 20));
        assert!(strategy.resolve(Rect::new(60, 30, 20, 3), &candidates()).is_none());
        assert!(strategy.resolve(Rect::new(2, 6, 20, 3), &candidates()).is_some());
    }

    #[test]
    fn empty_candidates_resolve_nothing() {
        assert!(ClosestCorners::new().resolve(Rect::new(0, 0, 4, 4), &[]).is_none());
    }
}
