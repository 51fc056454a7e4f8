use tuirealm::ratatui::layout::Rect;

pub const DEFAULT_ACTIVATION_DISTANCE: u16 = 2;

/// What a pointer gesture means once the activation threshold is taken into
/// account.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PointerSignal {
    None,
    Click { card_id: String },
    Start { card_id: String, dragged: Rect },
    Move { dragged: Rect },
    Release { dragged: Rect },
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct PendingPress {
    card_id: String,
    card_rect: Rect,
    origin: (u16, u16),
    activated: bool,
}

/// Turns press/motion/release into drag signals. A press only becomes a drag
/// once the pointer has travelled `activation_distance` cells (Chebyshev
/// distance); anything shorter is reported as a click on release.
#[derive(Debug, Clone)]
pub struct PointerSensor {
    activation_distance: u16,
    pending: Option<PendingPress>,
}

impl Default for PointerSensor {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_DISTANCE)
    }
}

impl PointerSensor {
    pub fn new(activation_distance: u16) -> Self {
        Self {
            activation_distance: activation_distance.max(1),
            pending: None,
        }
    }

    pub fn activation_distance(&self) -> u16 {
        self.activation_distance
    }

    pub fn is_active(&self) -> bool {
        self.pending.as_ref().is_some_and(|press| press.activated)
    }

    pub fn press(&mut self, card_id: impl Into<String>, card_rect: Rect, position: (u16, u16)) {
        self.pending = Some(PendingPress {
            card_id: card_id.into(),
            card_rect,
            origin: position,
            activated: false,
        });
    }

    pub fn motion(&mut self, position: (u16, u16)) -> PointerSignal {
        let activation_distance = self.activation_distance;
        let Some(press) = self.pending.as_mut() else {
            return PointerSignal::None;
        };
        let dragged = translate(press.card_rect, press.origin, position);

        if press.activated {
            return PointerSignal::Move { dragged };
        }
        if chebyshev(press.origin, position) < activation_distance {
            return PointerSignal::None;
        }

        press.activated = true;
        PointerSignal::Start {
            card_id: press.card_id.clone(),
            dragged,
        }
    }

    pub fn release(&mut self, position: (u16, u16)) -> PointerSignal {
        let Some(press) = self.pending.take() else {
            return PointerSignal::None;
        };
        if press.activated {
            PointerSignal::Release {
                dragged: translate(press.card_rect, press.origin, position),
            }
        } else {
            PointerSignal::Click {
                card_id: press.card_id,
            }
        }
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }
}

fn chebyshev(a: (u16, u16), b: (u16, u16)) -> u16 {
    a.0.abs_diff(b.0).max(a.1.abs_diff(b.1))
}

fn translate(rect: Rect, origin: (u16, u16), position: (u16, u16)) -> Rect {
    let dx = i32::from(position.0) - i32::from(origin.0);
    let dy = i32::from(position.1) - i32::from(origin.1);
    let clamp = |value: i32| value.clamp(0, i32::from(u16::MAX)) as u16;
    Rect {
        x: clamp(i32::from(rect.x) + dx),
        y: clamp(i32::from(rect.y) + dy),
        ..rect
    }
}
