use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::settings::KeybindingsConfig;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum KeyContext {
    Global,
    Board,
    Drag,
}

impl KeyContext {
    const ALL: [Self; 3] = [Self::Global, Self::Board, Self::Drag];

    const fn title(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Board => "Board",
            Self::Drag => "While dragging",
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum KeyAction {
    ToggleHelp,
    Quit,
    NavigateLeft,
    NavigateRight,
    SelectUp,
    SelectDown,
    PickUp,
    NewCard,
    EditCard,
    RemoveCard,
    Reload,
    Dismiss,
    DragLeft,
    DragRight,
    DragUp,
    DragDown,
    Drop,
    CancelDrag,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    fn matches(&self, key: KeyEvent) -> bool {
        match (&self.code, key.code) {
            (KeyCode::Char(left), KeyCode::Char(right)) => {
                let left = normalize_char(*left, self.modifiers);
                let right = normalize_char(right, key.modifiers);
                left == right
                    && normalize_modifiers(self.modifiers) == normalize_modifiers(key.modifiers)
            }
            _ => self.code == key.code && self.modifiers == key.modifiers,
        }
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }

        parts.push(match self.code {
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::F(n) => format!("F{n}"),
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(ch) => ch.to_string(),
            _ => "Unknown".to_string(),
        });

        write!(f, "{}", parts.join("+"))
    }
}

#[derive(Debug, Clone)]
pub struct ActionBinding {
    pub id: &'static str,
    pub action: KeyAction,
    pub description: &'static str,
    pub bindings: Vec<KeyBinding>,
}

#[derive(Debug, Clone)]
pub struct Keybindings {
    global: Vec<ActionBinding>,
    board: Vec<ActionBinding>,
    drag: Vec<ActionBinding>,
}

struct ActionDef {
    id: &'static str,
    action: KeyAction,
    description: &'static str,
    defaults: &'static [&'static str],
}

const GLOBAL_DEFS: &[ActionDef] = &[
    ActionDef {
        id: "toggle_help",
        action: KeyAction::ToggleHelp,
        description: "toggle help",
        defaults: &["?"],
    },
    ActionDef {
        id: "quit",
        action: KeyAction::Quit,
        description: "quit",
        defaults: &["q", "Ctrl+C"],
    },
];

const BOARD_DEFS: &[ActionDef] = &[
    ActionDef {
        id: "navigate_left",
        action: KeyAction::NavigateLeft,
        description: "focus previous column",
        defaults: &["h", "Left"],
    },
    ActionDef {
        id: "navigate_right",
        action: KeyAction::NavigateRight,
        description: "focus next column",
        defaults: &["l", "Right"],
    },
    ActionDef {
        id: "select_up",
        action: KeyAction::SelectUp,
        description: "select previous card",
        defaults: &["k", "Up"],
    },
    ActionDef {
        id: "select_down",
        action: KeyAction::SelectDown,
        description: "select next card",
        defaults: &["j", "Down"],
    },
    ActionDef {
        id: "pick_up",
        action: KeyAction::PickUp,
        description: "pick up selected card",
        defaults: &["Space"],
    },
    ActionDef {
        id: "new_card",
        action: KeyAction::NewCard,
        description: "add card to column",
        defaults: &["n"],
    },
    ActionDef {
        id: "edit_card",
        action: KeyAction::EditCard,
        description: "edit selected card",
        defaults: &["e", "Enter"],
    },
    ActionDef {
        id: "remove_card",
        action: KeyAction::RemoveCard,
        description: "remove selected card",
        defaults: &["d"],
    },
    ActionDef {
        id: "reload",
        action: KeyAction::Reload,
        description: "reload board snapshot",
        defaults: &["r"],
    },
    ActionDef {
        id: "dismiss",
        action: KeyAction::Dismiss,
        description: "clear notice",
        defaults: &["Esc"],
    },
];

const DRAG_DEFS: &[ActionDef] = &[
    ActionDef {
        id: "drag_left",
        action: KeyAction::DragLeft,
        description: "carry card to previous column",
        defaults: &["h", "Left"],
    },
    ActionDef {
        id: "drag_right",
        action: KeyAction::DragRight,
        description: "carry card to next column",
        defaults: &["l", "Right"],
    },
    ActionDef {
        id: "drag_up",
        action: KeyAction::DragUp,
        description: "carry card up",
        defaults: &["k", "Up"],
    },
    ActionDef {
        id: "drag_down",
        action: KeyAction::DragDown,
        description: "carry card down",
        defaults: &["j", "Down"],
    },
    ActionDef {
        id: "drop",
        action: KeyAction::Drop,
        description: "drop card",
        defaults: &["Enter", "Space"],
    },
    ActionDef {
        id: "cancel_drag",
        action: KeyAction::CancelDrag,
        description: "cancel drag",
        defaults: &["Esc"],
    },
];

impl Default for Keybindings {
    fn default() -> Self {
        Self::from_config(&KeybindingsConfig::default())
    }
}

impl Keybindings {
    pub fn from_config(config: &KeybindingsConfig) -> Self {
        let keybindings = Self {
            global: build_section(KeyContext::Global, GLOBAL_DEFS, &config.global),
            board: build_section(KeyContext::Board, BOARD_DEFS, &config.board),
            drag: build_section(KeyContext::Drag, DRAG_DEFS, &config.drag),
        };

        keybindings.validate_conflicts();
        keybindings
    }

    pub fn action_for_key(&self, context: KeyContext, key: KeyEvent) -> Option<KeyAction> {
        self.bindings_for(context)
            .iter()
            .find(|binding| {
                binding
                    .bindings
                    .iter()
                    .any(|candidate| candidate.matches(key))
            })
            .map(|binding| binding.action)
    }

    pub fn display_for(&self, context: KeyContext, action: KeyAction) -> Option<String> {
        self.bindings_for(context)
            .iter()
            .find(|binding| binding.action == action)
            .map(|binding| {
                binding
                    .bindings
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" / ")
            })
    }

    pub fn help_lines(&self) -> Vec<String> {
        let mut lines = vec!["Keyboard shortcuts".to_string()];
        for context in KeyContext::ALL {
            lines.push(String::new());
            lines.push(context.title().to_string());
            for binding in self.bindings_for(context) {
                let keys = binding
                    .bindings
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" / ");
                lines.push(format!("  {keys}: {}", binding.description));
            }
        }
        lines.extend([
            String::new(),
            "Composer and editor".to_string(),
            "  Tab / BackTab: next / previous field".to_string(),
            "  Enter: confirm".to_string(),
            "  Esc: cancel".to_string(),
            String::new(),
            "Mouse".to_string(),
            "  drag a card to move it, click to select".to_string(),
        ]);
        lines
    }

    fn bindings_for(&self, context: KeyContext) -> &[ActionBinding] {
        match context {
            KeyContext::Global => &self.global,
            KeyContext::Board => &self.board,
            KeyContext::Drag => &self.drag,
        }
    }

    fn validate_conflicts(&self) {
        for context in KeyContext::ALL {
            let mut seen: HashMap<String, &'static str> = HashMap::new();
            for binding in self.bindings_for(context) {
                for key in &binding.bindings {
                    let key_name = key.to_string();
                    if let Some(first_action) = seen.get(&key_name) {
                        warn!(
                            "keybinding conflict in {:?}: '{}' used by '{}' and '{}' (first wins)",
                            context, key_name, first_action, binding.id
                        );
                    } else {
                        seen.insert(key_name, binding.id);
                    }
                }
            }
        }
    }
}

fn build_section(
    context: KeyContext,
    defs: &[ActionDef],
    overrides: &HashMap<String, Vec<String>>,
) -> Vec<ActionBinding> {
    for unknown in overrides
        .keys()
        .filter(|id| !defs.iter().any(|def| def.id == id.as_str()))
    {
        warn!("unknown keybinding action '{}' in {:?}; ignoring", unknown, context);
    }

    defs.iter()
        .map(|def| {
            let mut parsed: Vec<KeyBinding> = match overrides.get(def.id) {
                Some(raw_bindings) => raw_bindings
                    .iter()
                    .filter_map(|raw| {
                        let binding = parse_binding(raw);
                        if binding.is_none() {
                            warn!(
                                "invalid keybinding '{}' for action '{}' in {:?}; ignoring",
                                raw, def.id, context
                            );
                        }
                        binding
                    })
                    .collect(),
                None => Vec::new(),
            };

            if parsed.is_empty() {
                if overrides.contains_key(def.id) {
                    warn!(
                        "no valid keybindings for action '{}' in {:?}; falling back to defaults",
                        def.id, context
                    );
                }
                parsed = def
                    .defaults
                    .iter()
                    .filter_map(|raw| parse_binding(raw))
                    .collect();
            }

            ActionBinding {
                id: def.id,
                action: def.action,
                description: def.description,
                bindings: parsed,
            }
        })
        .collect()
}

fn normalize_modifiers(mut modifiers: KeyModifiers) -> KeyModifiers {
    modifiers.remove(KeyModifiers::SHIFT);
    modifiers
}

fn normalize_char(ch: char, modifiers: KeyModifiers) -> char {
    if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        ch.to_ascii_lowercase()
    } else {
        ch
    }
}

pub fn parse_binding(raw: &str) -> Option<KeyBinding> {
    let mut modifiers = KeyModifiers::empty();
    let mut key: Option<&str> = None;

    for part in raw.split('+').map(str::trim).filter(|s| !s.is_empty()) {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers.insert(KeyModifiers::CONTROL),
            "alt" => modifiers.insert(KeyModifiers::ALT),
            "shift" => modifiers.insert(KeyModifiers::SHIFT),
            _ => {
                if key.is_some() {
                    return None;
                }
                key = Some(part);
            }
        }
    }

    let key = key?;
    let lower = key.to_ascii_lowercase();
    let code = match lower.as_str() {
        "enter" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "delete" | "del" => KeyCode::Delete,
        "space" => KeyCode::Char(' '),
        _ if lower.starts_with('f') && (2..=3).contains(&lower.len()) => {
            KeyCode::F(lower[1..].parse::<u8>().ok()?)
        }
        _ if key.chars().count() == 1 => {
            KeyCode::Char(normalize_char(key.chars().next()?, modifiers))
        }
        _ => return None,
    };

    Some(KeyBinding { code, modifiers })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn parse_ctrl_binding() {
        let binding = parse_binding("Ctrl+C").expect("binding");
        assert_eq!(binding.code, KeyCode::Char('c'));
        assert!(binding.modifiers.contains(KeyModifiers::CONTROL));
    }

    #[test]
    fn parse_space_binding_displays_name() {
        let binding = parse_binding("space").expect("binding");
        assert_eq!(binding.code, KeyCode::Char(' '));
        assert_eq!(binding.to_string(), "Space");
    }

    #[test]
    fn shifted_symbol_matches_without_shift_modifier() {
        let binding = parse_binding("?").expect("binding");
        assert!(binding.matches(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT)));
    }

    #[test]
    fn invalid_binding_returns_none() {
        assert!(parse_binding("Ctrl+Left+Right").is_none());
        assert!(parse_binding("fancy").is_none());
    }

    #[test]
    fn defaults_resolve_per_context() {
        let keys = Keybindings::default();
        assert_eq!(
            keys.action_for_key(KeyContext::Global, press(KeyCode::Char('q'))),
            Some(KeyAction::Quit)
        );
        assert_eq!(
            keys.action_for_key(KeyContext::Board, press(KeyCode::Char(' '))),
            Some(KeyAction::PickUp)
        );
        assert_eq!(
            keys.action_for_key(KeyContext::Drag, press(KeyCode::Right)),
            Some(KeyAction::DragRight)
        );
        assert_eq!(
            keys.action_for_key(KeyContext::Drag, press(KeyCode::Esc)),
            Some(KeyAction::CancelDrag)
        );
    }

    #[test]
    fn overrides_replace_defaults_and_invalid_ones_fall_back() {
        let mut config = KeybindingsConfig::default();
        config
            .board
            .insert("remove_card".to_string(), vec!["x".to_string()]);
        config
            .drag
            .insert("drop".to_string(), vec!["NotAKey".to_string()]);

        let keys = Keybindings::from_config(&config);
        assert_eq!(
            keys.action_for_key(KeyContext::Board, press(KeyCode::Char('x'))),
            Some(KeyAction::RemoveCard)
        );
        assert_eq!(
            keys.action_for_key(KeyContext::Board, press(KeyCode::Char('d'))),
            None
        );
        assert_eq!(
            keys.display_for(KeyContext::Drag, KeyAction::Drop).as_deref(),
            Some("Enter / Space")
        );
    }

    #[test]
    fn help_lines_list_every_context() {
        let lines = Keybindings::default().help_lines();
        assert!(lines.iter().any(|line| line == "While dragging"));
        assert!(lines.iter().any(|line| line == "  d: remove selected card"));
    }
}
