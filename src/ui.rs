use tuirealm::ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::app::{ActiveDialog, App, InteractionLayer, InteractionMap, Message};
use crate::composer::ComposerField;
use crate::editor::{EditField, EditSession};
use crate::keybindings::{KeyAction, KeyContext};
use crate::layout::{BoardLayout, ColumnSlot};
use crate::theme::Theme;
use crate::types::{Card, Column};

const MAX_CARD_ITEMS: usize = 3;

pub fn render(frame: &mut Frame<'_>, app: &mut App) {
    let mut map = std::mem::take(&mut app.interaction_map);
    map.clear();
    app.viewport = frame.area();

    let layout = app.layout();
    frame.render_widget(
        Block::default().style(Style::default().bg(app.theme.base.canvas)),
        frame.area(),
    );

    render_header(frame, layout.header, app);
    render_columns(frame, &layout, app, &mut map);
    render_footer(frame, layout.footer, app);
    render_drag_overlay(frame, app);

    match &app.active_dialog {
        ActiveDialog::None => {}
        ActiveDialog::Help => render_help_overlay(frame, app),
        ActiveDialog::EditCard(session) => render_edit_dialog(frame, app, session, &mut map),
    }

    app.interaction_map = map;
}

fn render_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " prep-board ",
            Style::default()
                .fg(app.theme.base.header)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "interview preparation",
            Style::default().fg(app.theme.base.text_muted),
        ),
    ]));
    let summary = Paragraph::new(format!(
        " {} cards · rev {} ",
        app.board.card_count(),
        app.board.revision()
    ))
    .alignment(Alignment::Right)
    .style(Style::default().fg(app.theme.base.text_muted));

    frame.render_widget(title, area);
    frame.render_widget(summary, area);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let (text, color) = match app.footer_notice.as_deref() {
        Some(notice) => (format!(" {notice} "), app.theme.interactive.focus),
        None => (footer_hints(app), app.theme.base.text_muted),
    };
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(color)),
        area,
    );
}

fn footer_hints(app: &App) -> String {
    let hint = |context: KeyContext, action: KeyAction, label: &str| {
        app.keybindings
            .display_for(context, action)
            .map(|keys| format!("{keys}: {label}"))
    };

    let hints: Vec<Option<String>> = if app.drag.is_dragging() {
        vec![
            hint(KeyContext::Drag, KeyAction::DragRight, "move"),
            hint(KeyContext::Drag, KeyAction::Drop, "drop"),
            hint(KeyContext::Drag, KeyAction::CancelDrag, "cancel"),
        ]
    } else if app.composer.is_open() {
        vec![
            Some("Tab: switch field".to_string()),
            Some("Enter: add".to_string()),
            Some("Esc: cancel".to_string()),
        ]
    } else {
        vec![
            hint(KeyContext::Board, KeyAction::PickUp, "pick up"),
            hint(KeyContext::Board, KeyAction::NewCard, "new card"),
            hint(KeyContext::Board, KeyAction::EditCard, "edit"),
            hint(KeyContext::Global, KeyAction::ToggleHelp, "help"),
            hint(KeyContext::Global, KeyAction::Quit, "quit"),
        ]
    };

    let joined = hints.into_iter().flatten().collect::<Vec<_>>().join("  ");
    format!(" {joined} ")
}

fn render_columns(frame: &mut Frame<'_>, layout: &BoardLayout, app: &App, map: &mut InteractionMap) {
    let columns = app.board.columns();
    if columns.is_empty() {
        render_empty_state(frame, layout.surface, app);
        return;
    }

    let active = app.drag.active();
    let lifted_id = active.map(|active| active.card.id.as_str());
    let target = active.and_then(|active| active.last_target.as_ref());

    for (index, (slot, column)) in layout.columns.iter().zip(columns).enumerate() {
        let is_focused = index == app.focus.column && !app.drag.is_dragging();
        let is_target = target.is_some_and(|target| target.container_id == column.id);
        render_column_frame(frame, slot, column, app, is_focused, is_target);
        map.register_click(InteractionLayer::Base, slot.header, Message::FocusColumn(index));

        for card_slot in &slot.cards {
            let Some(card) = column.cards.get(card_slot.card_index) else {
                continue;
            };
            if lifted_id == Some(card.id.as_str()) {
                render_placeholder(frame, card_slot.rect, &app.theme);
            } else {
                let focused = !app.drag.is_dragging()
                    && app.focus.card_id.as_deref() == Some(card.id.as_str());
                let colors = app.theme.card_colors(focused, card.is_highlighted());
                render_card(
                    frame,
                    card_slot.rect,
                    card,
                    &app.theme,
                    Style::default().bg(colors.background),
                    Style::default().fg(colors.border),
                    BorderType::Rounded,
                );
            }
            map.register_card(
                InteractionLayer::Base,
                card_slot.rect,
                Message::SelectCard(card.id.clone()),
            );
        }

        if target.is_some_and(|target| target.is_drop_zone() && target.container_id == column.id)
        {
            render_drop_zone(frame, slot.drop_zone, &app.theme);
        } else if column.cards.is_empty() {
            frame.render_widget(
                Paragraph::new("No cards yet")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(app.theme.base.text_muted)),
                slot.drop_zone,
            );
        }

        if let Some(button) = slot.add_button {
            let hovered = app.hovered_message.as_ref()
                == Some(&Message::OpenComposer(column.id.clone()));
            render_add_button(frame, button, &app.theme, hovered);
            map.register_click(
                InteractionLayer::Base,
                button,
                Message::OpenComposer(column.id.clone()),
            );
        }
        if let Some(area) = slot.composer {
            render_composer(frame, area, &column.id, app, map);
        }
    }
}

fn render_column_frame(
    frame: &mut Frame<'_>,
    slot: &ColumnSlot,
    column: &Column,
    app: &App,
    is_focused: bool,
    is_target: bool,
) {
    let theme = &app.theme;
    let accent = theme.column_accent(column.accent_color.as_deref());
    let border_color = if is_target {
        theme.board.drag_target
    } else if is_focused {
        theme.interactive.focus
    } else if column.highlight.unwrap_or(false) {
        theme.board.column_highlight
    } else {
        theme.interactive.border
    };
    let border_type = if is_focused || is_target {
        BorderType::Double
    } else {
        BorderType::Plain
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color))
        .title(Line::from(vec![
            Span::styled(
                format!(" {} ", column.title),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("({}) ", column.cards.len()),
                Style::default().fg(theme.base.text_muted),
            ),
        ]));
    if slot.hidden_cards > 0 {
        block = block
            .title_bottom(format!(" +{} more ", slot.hidden_cards))
            .title_alignment(Alignment::Left);
    }
    frame.render_widget(block, slot.rect);

    let subtitle = column.subtitle.as_deref().unwrap_or_default();
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            subtitle.to_string(),
            Style::default().fg(theme.base.text_muted),
        )),
        Line::from(Span::styled(
            "─".repeat(usize::from(slot.header.width)),
            Style::default().fg(accent),
        )),
    ]);
    frame.render_widget(header, slot.header);
}

fn render_card(
    frame: &mut Frame<'_>,
    area: Rect,
    card: &Card,
    theme: &Theme,
    style: Style,
    border_style: Style,
    border_type: BorderType,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .style(style);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(card_lines(card, theme, inner.width)), inner);
}

/// One line per row reserved by `layout::card_height`, in the same order.
fn card_lines<'a>(card: &'a Card, theme: &Theme, width: u16) -> Vec<Line<'a>> {
    let muted = Style::default().fg(theme.base.text_muted);
    let mut lines = Vec::new();

    let mut title_style = Style::default()
        .fg(theme.base.text)
        .add_modifier(Modifier::BOLD);
    if card.is_highlighted() {
        title_style = title_style.fg(theme.board.highlighted_card);
    }
    lines.push(Line::from(Span::styled(card.title.as_str(), title_style)));

    if !card.chips.is_empty() {
        let mut spans = Vec::new();
        for chip in &card.chips {
            if !spans.is_empty() {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(
                format!("[{}]", chip.label),
                Style::default().fg(theme.chip_color(&chip.color_class)),
            ));
        }
        lines.push(Line::from(spans));
    }

    if let Some(description) = card.description.as_deref() {
        lines.push(Line::from(Span::styled(description, muted)));
    }

    if card.metric.is_some() || card.progress.is_some() {
        let mut spans = Vec::new();
        if let Some(progress) = card.progress {
            let label = format!(" {progress}%");
            let metric_width = card.metric.as_deref().map_or(0, |metric| metric.len() + 1);
            let bar_width = usize::from(width)
                .saturating_sub(label.len() + metric_width)
                .min(20);
            spans.push(Span::styled(
                progress_bar(progress, bar_width),
                Style::default().fg(theme.progress_color(progress)),
            ));
            spans.push(Span::styled(label, muted));
            if card.metric.is_some() {
                spans.push(Span::raw(" "));
            }
        }
        if let Some(metric) = card.metric.as_deref() {
            spans.push(Span::styled(metric, Style::default().fg(theme.base.accent)));
        }
        lines.push(Line::from(spans));
    }

    if card.owner.is_some() || card.due_date.is_some() {
        let owner = match (card.owner_label.as_deref(), card.owner.as_deref()) {
            (Some(label), Some(owner)) => Some(format!("{label}: {owner}")),
            (None, Some(owner)) => Some(owner.to_string()),
            _ => None,
        };
        let due = card.due_date.as_deref().map(|due| format!("due {due}"));
        let text = [owner, due].into_iter().flatten().collect::<Vec<_>>().join(" · ");
        lines.push(Line::from(Span::styled(text, muted)));
    }

    if let Some(meta) = card.meta.as_deref() {
        lines.push(Line::from(Span::styled(
            meta,
            muted.add_modifier(Modifier::ITALIC),
        )));
    }

    if let Some(items) = card.items.as_ref() {
        for item in items.iter().take(MAX_CARD_ITEMS) {
            lines.push(Line::from(vec![
                Span::styled("• ", Style::default().fg(theme.base.accent)),
                Span::styled(item.as_str(), Style::default().fg(theme.base.text)),
            ]));
        }
    }

    lines
}

pub fn progress_bar(progress: u8, width: usize) -> String {
    let filled = usize::from(progress.min(100)) * width / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn render_placeholder(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.board.placeholder));
    frame.render_widget(block, area);
}

fn render_drop_zone(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.board.drag_target))
        .style(Style::default().bg(theme.board.drop_zone));
    frame.render_widget(
        Paragraph::new("Drop here")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.board.drag_target))
            .block(block),
        area,
    );
}

fn render_add_button(frame: &mut Frame<'_>, area: Rect, theme: &Theme, hovered: bool) {
    let style = if hovered {
        Style::default()
            .fg(theme.interactive.focus)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.base.text_muted)
    };
    frame.render_widget(
        Paragraph::new("+ Add card")
            .alignment(Alignment::Center)
            .style(style),
        area,
    );
}

fn render_composer(
    frame: &mut Frame<'_>,
    area: Rect,
    column_id: &str,
    app: &App,
    map: &mut InteractionMap,
) {
    let theme = &app.theme;
    let draft = app.composer.draft(column_id);
    let title = draft.map_or("", |draft| draft.title.as_str());
    let description = draft.map_or("", |draft| draft.description.as_str());
    let focused = app.composer.focused_field();

    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(theme.interactive.focus))
        .title(" New card ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let fields = [
        (ComposerField::Title, "Title", title, rows[0]),
        (ComposerField::Description, "Description", description, rows[1]),
    ];
    for (field, label, value, rect) in fields {
        render_inline_input(frame, rect, label, value, focused == field, theme);
        map.register_click(
            InteractionLayer::Overlay,
            rect,
            Message::FocusComposerField(field),
        );
    }

    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    let can_create = app.composer.can_create(column_id);
    render_inline_button(frame, buttons[0], "Add", can_create, theme);
    render_inline_button(frame, buttons[1], "Cancel", true, theme);
    map.register_click(InteractionLayer::Overlay, buttons[0], Message::SubmitComposer);
    map.register_click(InteractionLayer::Overlay, buttons[1], Message::CancelComposer);
}

fn render_inline_input(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    is_focused: bool,
    theme: &Theme,
) {
    let bg = if is_focused {
        theme.dialog.input_focus_bg
    } else {
        theme.dialog.input_bg
    };
    let cursor = if is_focused { "▏" } else { "" };
    let line = Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(theme.base.text_muted)),
        Span::styled(format!("{value}{cursor}"), Style::default().fg(theme.base.text)),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}

fn render_inline_button(frame: &mut Frame<'_>, area: Rect, label: &str, enabled: bool, theme: &Theme) {
    let style = if enabled {
        Style::default()
            .bg(theme.dialog.button_bg)
            .fg(theme.dialog.button_fg)
    } else {
        Style::default().fg(theme.base.text_muted)
    };
    frame.render_widget(
        Paragraph::new(format!("[ {label} ]"))
            .alignment(Alignment::Center)
            .style(style),
        area,
    );
}

fn render_drag_overlay(frame: &mut Frame<'_>, app: &App) {
    let (Some(card), Some(rect)) = (app.drag.lifted_card(), app.drag_rect) else {
        return;
    };
    let area = rect.intersection(frame.area());
    if area.is_empty() {
        return;
    }

    frame.render_widget(Clear, area);
    render_card(
        frame,
        area,
        card,
        &app.theme,
        Style::default().bg(app.theme.board.lifted_bg),
        Style::default().fg(app.theme.board.lifted_border),
        BorderType::Thick,
    );
}

fn render_empty_state(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.theme.interactive.border));
    frame.render_widget(
        Paragraph::new("The board has no columns")
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.base.text_muted))
            .block(block),
        area,
    );
}

fn render_edit_dialog(
    frame: &mut Frame<'_>,
    app: &App,
    session: &EditSession,
    map: &mut InteractionMap,
) {
    let theme = &app.theme;
    let area = centered_fixed(64, 23, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(theme.interactive.focus))
        .title(" Edit card ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(theme.dialog.surface));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(3); EditField::ALL.len()];
    constraints.push(Constraint::Length(3));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (field, rect) in EditField::ALL.into_iter().zip(rows.iter().copied()) {
        render_input_field(
            frame,
            rect,
            field.label(),
            session.form.field(field),
            session.focused_field == field,
            theme,
        );
        map.register_click(InteractionLayer::Dialog, rect, Message::FocusEditField(field));
    }

    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[EditField::ALL.len()]);
    render_button(frame, buttons[0], "Save", session.can_save(), theme);
    render_button(frame, buttons[1], "Cancel", false, theme);
    map.register_click(InteractionLayer::Dialog, buttons[0], Message::SaveEdit);
    map.register_click(InteractionLayer::Dialog, buttons[1], Message::DismissDialog);
}

fn render_input_field(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    is_focused: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {label} "))
        .border_style(if is_focused {
            Style::default().fg(theme.interactive.focus)
        } else {
            Style::default().fg(theme.interactive.border)
        })
        .style(Style::default().bg(if is_focused {
            theme.dialog.input_focus_bg
        } else {
            theme.dialog.input_bg
        }));
    frame.render_widget(
        Paragraph::new(value)
            .style(Style::default().fg(theme.base.text))
            .block(block),
        area,
    );
}

fn render_button(frame: &mut Frame<'_>, area: Rect, label: &str, is_primary: bool, theme: &Theme) {
    let (bg, fg) = if is_primary {
        (theme.dialog.button_bg, theme.dialog.button_fg)
    } else {
        (Color::Reset, theme.base.text)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_primary {
            Style::default().fg(theme.dialog.button_bg)
        } else {
            Style::default().fg(theme.interactive.border)
        })
        .style(Style::default().bg(bg).fg(fg));
    frame.render_widget(
        Paragraph::new(label)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn render_help_overlay(frame: &mut Frame<'_>, app: &App) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(app.theme.dialog.surface));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = app.keybindings.help_lines().join("\n");
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(app.theme.base.text)),
        inner,
    );
}

fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect::new(
        r.x + (r.width - width) / 2,
        r.y + (r.height - height) / 2,
        width,
        height,
    )
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tuirealm::ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    use super::*;
    use crate::app::InteractionKind;
    use crate::board::BoardSnapshot;
    use crate::settings::Settings;
    use crate::types::Chip;

    fn app() -> App {
        let mut tagged = Card::new("c2", "Graphs");
        tagged.chips = vec![Chip::new("Algoritmos", "bg-blue-100 text-blue-700")];
        tagged.progress = Some(50);
        let snapshot: BoardSnapshot = Arc::from(vec![
            Column::new("todo", "Para estudar")
                .with_cards(vec![Card::new("c1", "Heaps"), tagged]),
            Column::new("done", "Concluído"),
        ]);
        App::new(snapshot, Settings::default())
    }

    fn draw(app: &mut App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal
            .draw(|frame| render(frame, app))
            .expect("draw");
        terminal.backend().buffer().clone()
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn renders_columns_cards_and_chips() {
        let mut app = app();
        let text = buffer_text(&draw(&mut app, 100, 30));
        assert!(text.contains("Para estudar"));
        assert!(text.contains("Concluído"));
        assert!(text.contains("Heaps"));
        assert!(text.contains("[Algoritmos]"));
        assert!(text.contains("50%"));
        assert!(text.contains("No cards yet"));
        assert!(text.contains("+ Add card"));
    }

    #[test]
    fn render_registers_card_and_button_nodes() {
        let mut app = app();
        draw(&mut app, 100, 30);
        let rect = app.layout().card_rect("c1").expect("card visible");

        let node = app
            .interaction_map
            .resolve_node(rect.x + 1, rect.y + 1, InteractionKind::Press)
            .expect("card node");
        assert!(node.draggable);
        assert_eq!(node.message, Message::SelectCard("c1".to_string()));

        let button = app.layout().columns[1].add_button.expect("add button");
        assert_eq!(
            app.interaction_map
                .resolve_message(button.x + 2, button.y, InteractionKind::LeftClick),
            Some(Message::OpenComposer("done".to_string()))
        );
    }

    #[test]
    fn drag_overlay_and_placeholder_follow_the_lifted_card() {
        let mut app = app();
        draw(&mut app, 100, 30);
        app.begin_keyboard_drag();
        let text = buffer_text(&draw(&mut app, 100, 30));
        assert!(app.drag_rect.is_some());
        assert!(text.contains("Heaps"));
        assert!(text.contains("drop"));
    }

    #[test]
    fn help_overlay_lists_bindings() {
        let mut app = app();
        app.update(Message::ToggleHelp).expect("help");
        let text = buffer_text(&draw(&mut app, 100, 40));
        assert!(text.contains("Help"));
        assert!(text.contains("quit"));
    }

    #[test]
    fn progress_bar_scales_with_width() {
        assert_eq!(progress_bar(50, 10), "█████░░░░░");
        assert_eq!(progress_bar(100, 4), "████");
        assert_eq!(progress_bar(0, 3), "░░░");
    }
}
