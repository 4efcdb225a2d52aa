use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use chrono::Local;
use askbox_core::{ChatMessage, ChatRole, ChatState, MAX_DRAFT_CHARS};
use crate::app::{App, cursor_row_col};

/// Turn `**bold**` runs into styled spans; an unclosed `**` stays literal
fn parse_markdown_line(text: &str) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    // An even number of parts means the last `**` never closed
    let closed = parts.len() % 2 == 1;
    let mut spans: Vec<Span<'static>> = Vec::new();

    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;
        if i % 2 == 1 && (closed || !is_last) && !part.is_empty() {
            spans.push(Span::styled(part.to_string(), Style::default().add_modifier(Modifier::BOLD)));
        } else if i % 2 == 1 {
            spans.push(Span::raw(format!("**{}{}", part, if closed || !is_last { "**" } else { "" })));
        } else if !part.is_empty() {
            spans.push(Span::raw(part.to_string()));
        }
    }

    Line::from(spans)
}

/// Role label followed by the local time the message was created
fn role_line(label: &'static str, color: Color, msg: &ChatMessage) -> Line<'static> {
    let time = msg.timestamp().with_timezone(&Local).format("%H:%M").to_string();
    Line::from(vec![
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {}", time), Style::default().fg(Color::DarkGray)),
    ])
}

/// Lines for one message bubble: role label, one paragraph per content
/// line, then a blank separator
pub fn message_lines(msg: &ChatMessage) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(msg.lines().len() + 2);

    match (msg.role(), msg.is_error()) {
        (ChatRole::User, _) => {
            lines.push(role_line("You:", Color::Cyan, msg));
            lines.extend(msg.lines().iter().map(|l| Line::from(l.clone())));
        }
        (ChatRole::Assistant, false) => {
            lines.push(role_line("AI:", Color::Yellow, msg));
            lines.extend(msg.lines().iter().map(|l| parse_markdown_line(l)));
        }
        (ChatRole::Assistant, true) => {
            lines.push(role_line("AI:", Color::Red, msg));
            lines.extend(msg.lines().iter().map(|l| {
                Line::from(Span::styled(
                    l.clone(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::ITALIC),
                ))
            }));
        }
    }

    lines.push(Line::default());
    lines
}

/// "Thinking" lines, present only while a request is in flight
pub fn typing_indicator(in_flight: bool, animation_frame: u8) -> Option<Vec<Line<'static>>> {
    if !in_flight {
        return None;
    }
    // Animated ellipsis: cycles through ".", "..", "..."
    let dots = ".".repeat((animation_frame as usize % 3) + 1);
    Some(vec![
        Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ])
}

/// Word-wrapped conversation, without a block. Scroll limits are measured
/// on this same paragraph so they match what gets drawn.
pub fn chat_paragraph(state: &ChatState, animation_frame: u8) -> Paragraph<'static> {
    let mut lines: Vec<Line<'static>> = state
        .conversation()
        .iter()
        .flat_map(message_lines)
        .collect();
    if let Some(indicator) = typing_indicator(state.is_in_flight(), animation_frame) {
        lines.extend(indicator);
    }

    Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false })
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(app.input_height()),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" askbox ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("[{}]", app.provider_label), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store chat area for mouse hit-testing and scroll calculations (inner size minus borders)
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    if app.follow_bottom {
        app.scroll_to_bottom();
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Conversation ");

    let chat = chat_paragraph(app.state(), app.animation_frame)
        .block(chat_block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let in_flight = app.state().is_in_flight();
    let border_color = if in_flight { Color::DarkGray } else { Color::Yellow };
    let title = if in_flight { " Waiting for answer... " } else { " Ask " };

    let count_style = if app.draft_chars() >= MAX_DRAFT_CHARS {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title)
        .title_bottom(
            Line::from(Span::styled(
                format!(" {}/{} ", app.draft_chars(), MAX_DRAFT_CHARS),
                count_style,
            ))
            .right_aligned(),
        );

    // Keep the cursor inside the visible window, both directions
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let (row, col) = cursor_row_col(app.draft(), app.cursor);
    let scroll_x = if inner_width > 0 && col >= inner_width { col - inner_width + 1 } else { 0 };
    let scroll_y = if inner_height > 0 && row >= inner_height { row - inner_height + 1 } else { 0 };

    let input = if app.draft().is_empty() {
        Paragraph::new(Span::styled(
            "Type a question...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        // Use cyan text to match the "You:" style
        Paragraph::new(app.draft().to_string())
            .style(Style::default().fg(Color::Cyan))
            .scroll((scroll_y as u16, scroll_x as u16))
    };

    frame.render_widget(input.block(input_block), area);

    frame.set_cursor_position((
        area.x + 1 + (col - scroll_x) as u16,
        area.y + 1 + (row - scroll_y) as u16,
    ));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = if app.state().is_in_flight() {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    } else {
        Style::default().bg(Color::Blue).fg(Color::White)
    };
    let mode_text = if app.state().is_in_flight() { " WAITING " } else { " READY " };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    spans.extend(vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" Alt+Enter ", key_style),
        Span::styled(" newline ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
