use std::str::FromStr;

use tuirealm::ratatui::style::Color;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum ThemePreset {
    #[default]
    Default,
    Light,
    HighContrast,
    Mono,
}

impl ThemePreset {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Light => "light",
            Self::HighContrast => "high-contrast",
            Self::Mono => "mono",
        }
    }
}

impl FromStr for ThemePreset {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" | "dark" => Ok(Self::Default),
            "light" | "day" => Ok(Self::Light),
            "high-contrast" | "high_contrast" | "contrast" => Ok(Self::HighContrast),
            "mono" | "monochrome" => Ok(Self::Mono),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: BasePalette,
    pub interactive: InteractivePalette,
    pub board: BoardPalette,
    pub chip: ChipPalette,
    pub dialog: DialogPalette,
}

#[derive(Debug, Clone, Copy)]
pub struct BasePalette {
    pub canvas: Color,
    pub text: Color,
    pub text_muted: Color,
    pub header: Color,
    pub accent: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct InteractivePalette {
    pub focus: Color,
    pub selected_bg: Color,
    pub selected_border: Color,
    pub border: Color,
}

/// Column chrome and drag feedback.
#[derive(Debug, Clone, Copy)]
pub struct BoardPalette {
    pub column_highlight: Color,
    pub highlighted_card: Color,
    pub drop_zone: Color,
    pub drag_target: Color,
    pub lifted_bg: Color,
    pub lifted_border: Color,
    pub placeholder: Color,
    pub progress_fill: Color,
    pub progress_done: Color,
}

/// Colors behind the free-form `colorClass` keys carried by chips and column
/// accents.
#[derive(Debug, Clone, Copy)]
pub struct ChipPalette {
    pub primary: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub neutral: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct DialogPalette {
    pub surface: Color,
    pub input_bg: Color,
    pub input_focus_bg: Color,
    pub button_bg: Color,
    pub button_fg: Color,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CardStateColors {
    pub background: Color,
    pub border: Color,
}

impl Theme {
    pub fn from_preset(preset: ThemePreset) -> Self {
        match preset {
            ThemePreset::Default => Self {
                base: BasePalette {
                    canvas: Color::Rgb(30, 33, 46),
                    text: Color::White,
                    text_muted: Color::DarkGray,
                    header: Color::Cyan,
                    accent: Color::Magenta,
                },
                interactive: InteractivePalette {
                    focus: Color::Cyan,
                    selected_bg: Color::Rgb(48, 44, 68),
                    selected_border: Color::Rgb(255, 187, 120),
                    border: Color::DarkGray,
                },
                board: BoardPalette {
                    column_highlight: Color::Rgb(125, 207, 255),
                    highlighted_card: Color::Rgb(187, 154, 247),
                    drop_zone: Color::Rgb(65, 72, 104),
                    drag_target: Color::LightGreen,
                    lifted_bg: Color::Rgb(59, 66, 97),
                    lifted_border: Color::LightGreen,
                    placeholder: Color::Rgb(86, 95, 137),
                    progress_fill: Color::Cyan,
                    progress_done: Color::Green,
                },
                chip: ChipPalette {
                    primary: Color::Blue,
                    secondary: Color::Magenta,
                    success: Color::Green,
                    warning: Color::Yellow,
                    danger: Color::Red,
                    neutral: Color::Gray,
                },
                dialog: DialogPalette {
                    surface: Color::Rgb(36, 40, 56),
                    input_bg: Color::Rgb(30, 33, 46),
                    input_focus_bg: Color::Rgb(48, 44, 68),
                    button_bg: Color::Cyan,
                    button_fg: Color::Black,
                },
            },
            ThemePreset::Light => Self {
                base: BasePalette {
                    canvas: Color::Rgb(246, 248, 252),
                    text: Color::Rgb(32, 38, 51),
                    text_muted: Color::Rgb(95, 105, 122),
                    header: Color::Rgb(37, 99, 235),
                    accent: Color::Rgb(2, 132, 199),
                },
                interactive: InteractivePalette {
                    focus: Color::Rgb(37, 99, 235),
                    selected_bg: Color::Rgb(227, 237, 255),
                    selected_border: Color::Rgb(59, 130, 246),
                    border: Color::Rgb(196, 208, 224),
                },
                board: BoardPalette {
                    column_highlight: Color::Rgb(37, 99, 235),
                    highlighted_card: Color::Rgb(124, 58, 237),
                    drop_zone: Color::Rgb(203, 213, 225),
                    drag_target: Color::Rgb(22, 163, 74),
                    lifted_bg: Color::Rgb(236, 253, 245),
                    lifted_border: Color::Rgb(22, 163, 74),
                    placeholder: Color::Rgb(148, 163, 184),
                    progress_fill: Color::Rgb(2, 132, 199),
                    progress_done: Color::Rgb(22, 163, 74),
                },
                chip: ChipPalette {
                    primary: Color::Rgb(37, 99, 235),
                    secondary: Color::Rgb(124, 58, 237),
                    success: Color::Rgb(22, 163, 74),
                    warning: Color::Rgb(202, 138, 4),
                    danger: Color::Rgb(185, 28, 28),
                    neutral: Color::Rgb(71, 85, 105),
                },
                dialog: DialogPalette {
                    surface: Color::Rgb(255, 255, 255),
                    input_bg: Color::Rgb(241, 245, 249),
                    input_focus_bg: Color::Rgb(227, 237, 255),
                    button_bg: Color::Rgb(37, 99, 235),
                    button_fg: Color::White,
                },
            },
            ThemePreset::HighContrast => Self {
                base: BasePalette {
                    canvas: Color::Rgb(20, 20, 20),
                    text: Color::White,
                    text_muted: Color::Gray,
                    header: Color::LightCyan,
                    accent: Color::LightBlue,
                },
                interactive: InteractivePalette {
                    focus: Color::LightCyan,
                    selected_bg: Color::Rgb(36, 36, 36),
                    selected_border: Color::LightYellow,
                    border: Color::Gray,
                },
                board: BoardPalette {
                    column_highlight: Color::LightCyan,
                    highlighted_card: Color::LightMagenta,
                    drop_zone: Color::Gray,
                    drag_target: Color::LightGreen,
                    lifted_bg: Color::Rgb(40, 40, 40),
                    lifted_border: Color::LightGreen,
                    placeholder: Color::White,
                    progress_fill: Color::LightCyan,
                    progress_done: Color::LightGreen,
                },
                chip: ChipPalette {
                    primary: Color::LightBlue,
                    secondary: Color::LightMagenta,
                    success: Color::LightGreen,
                    warning: Color::LightYellow,
                    danger: Color::LightRed,
                    neutral: Color::White,
                },
                dialog: DialogPalette {
                    surface: Color::Rgb(20, 20, 20),
                    input_bg: Color::Black,
                    input_focus_bg: Color::Rgb(48, 48, 48),
                    button_bg: Color::LightCyan,
                    button_fg: Color::Black,
                },
            },
            ThemePreset::Mono => Self {
                base: BasePalette {
                    canvas: Color::Rgb(26, 26, 26),
                    text: Color::White,
                    text_muted: Color::Gray,
                    header: Color::White,
                    accent: Color::Gray,
                },
                interactive: InteractivePalette {
                    focus: Color::White,
                    selected_bg: Color::Rgb(35, 35, 35),
                    selected_border: Color::White,
                    border: Color::Gray,
                },
                board: BoardPalette {
                    column_highlight: Color::White,
                    highlighted_card: Color::White,
                    drop_zone: Color::DarkGray,
                    drag_target: Color::White,
                    lifted_bg: Color::Rgb(45, 45, 45),
                    lifted_border: Color::White,
                    placeholder: Color::Gray,
                    progress_fill: Color::Gray,
                    progress_done: Color::White,
                },
                chip: ChipPalette {
                    primary: Color::White,
                    secondary: Color::Gray,
                    success: Color::White,
                    warning: Color::Gray,
                    danger: Color::White,
                    neutral: Color::Gray,
                },
                dialog: DialogPalette {
                    surface: Color::Rgb(26, 26, 26),
                    input_bg: Color::Black,
                    input_focus_bg: Color::Rgb(45, 45, 45),
                    button_bg: Color::White,
                    button_fg: Color::Black,
                },
            },
        }
    }

    /// Maps a chip `colorClass` onto the palette. Semantic keys match exactly;
    /// utility-class strings such as `bg-blue-100 text-blue-700` match on the
    /// color word they contain.
    pub fn chip_color(&self, color_class: &str) -> Color {
        let key = color_class.trim().to_ascii_lowercase();
        match key.as_str() {
            "primary" | "info" => return self.chip.primary,
            "secondary" => return self.chip.secondary,
            "success" => return self.chip.success,
            "warning" => return self.chip.warning,
            "danger" | "error" => return self.chip.danger,
            "neutral" | "" => return self.chip.neutral,
            _ => {}
        }

        let words = [
            ("blue", self.chip.primary),
            ("sky", self.chip.primary),
            ("purple", self.chip.secondary),
            ("violet", self.chip.secondary),
            ("green", self.chip.success),
            ("emerald", self.chip.success),
            ("amber", self.chip.warning),
            ("yellow", self.chip.warning),
            ("red", self.chip.danger),
        ];
        words
            .iter()
            .find(|(word, _)| key.contains(word))
            .map_or(self.chip.neutral, |(_, color)| *color)
    }

    pub fn column_accent(&self, accent_color: Option<&str>) -> Color {
        match accent_color.map(str::trim) {
            Some(key) if !key.is_empty() => self.chip_color(key),
            _ => self.base.accent,
        }
    }

    pub fn card_colors(&self, focused: bool, highlighted: bool) -> CardStateColors {
        match (focused, highlighted) {
            (true, _) => CardStateColors {
                background: self.interactive.selected_bg,
                border: self.interactive.selected_border,
            },
            (false, true) => CardStateColors {
                background: Color::Reset,
                border: self.board.highlighted_card,
            },
            (false, false) => CardStateColors {
                background: Color::Reset,
                border: self.interactive.border,
            },
        }
    }

    pub fn progress_color(&self, progress: u8) -> Color {
        if progress >= 100 {
            self.board.progress_done
        } else {
            self.board.progress_fill
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_preset(ThemePreset::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_default_preset() {
        let theme = Theme::default();
        assert_eq!(theme.base.header, Color::Cyan);
        assert_eq!(theme.interactive.focus, Color::Cyan);
        assert_eq!(theme.chip.neutral, Color::Gray);
    }

    #[test]
    fn test_chip_color_semantic_and_utility_keys() {
        let theme = Theme::from_preset(ThemePreset::Light);
        assert_eq!(theme.chip_color("primary"), theme.chip.primary);
        assert_eq!(theme.chip_color("bg-blue-100 text-blue-700"), theme.chip.primary);
        assert_eq!(theme.chip_color("bg-purple-100"), theme.chip.secondary);
        assert_eq!(theme.chip_color("bg-amber-50"), theme.chip.warning);
        assert_eq!(theme.chip_color("neutral"), theme.chip.neutral);
        assert_eq!(theme.chip_color("bg-slate-100"), theme.chip.neutral);
        assert_eq!(theme.chip_color("mystery"), theme.chip.neutral);
    }

    #[test]
    fn test_column_accent_falls_back_to_base_accent() {
        let theme = Theme::default();
        assert_eq!(theme.column_accent(None), theme.base.accent);
        assert_eq!(theme.column_accent(Some("  ")), theme.base.accent);
        assert_eq!(theme.column_accent(Some("success")), theme.chip.success);
    }

    #[test]
    fn test_card_colors_prefer_focus_over_highlight() {
        let theme = Theme::default();
        assert_eq!(
            theme.card_colors(true, true).border,
            theme.interactive.selected_border
        );
        assert_eq!(
            theme.card_colors(false, true).border,
            theme.board.highlighted_card
        );
        assert_eq!(theme.card_colors(false, false).border, theme.interactive.border);
    }

    #[test]
    fn test_theme_preset_parse() {
        assert_eq!(ThemePreset::from_str("default"), Ok(ThemePreset::Default));
        assert_eq!(ThemePreset::from_str("Day"), Ok(ThemePreset::Light));
        assert_eq!(
            ThemePreset::from_str("high_contrast"),
            Ok(ThemePreset::HighContrast)
        );
        assert_eq!(ThemePreset::from_str("monochrome"), Ok(ThemePreset::Mono));
        assert!(ThemePreset::from_str("retro").is_err());
    }
}
