use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{App, InputMode};

const BG: Color = Color::Rgb(9, 15, 25);
const PANEL: Color = Color::Rgb(16, 27, 44);
const ACCENT: Color = Color::Rgb(52, 211, 153);
const MUTED: Color = Color::Rgb(140, 156, 178);
const WARN: Color = Color::Rgb(251, 191, 36);
const SEARCH: Color = Color::Rgb(238, 111, 248);
const PL_A: Color = Color::Rgb(17, 94, 89);
const PL_B: Color = Color::Rgb(30, 64, 175);
const PL_C: Color = Color::Rgb(55, 48, 163);

const HEADER_HEIGHT: u16 = 1;
const FOOTER_HEIGHT: u16 = 1;
const BORDER_SIZE: u16 = 2;
const ROW_PREFIX_WIDTH: usize = 2;
/// Columns the header keeps for its left side before the descriptor is shown.
const HEADER_LEFT_MIN_WIDTH: u16 = 24;

const BROWSE_LABEL: &str = "[ RESOURCES ]";
const SEARCH_LABEL: &str = "[ SEARCH ]";

/// Size of the list area inside a terminal of `width` x `height`.
pub fn list_viewport(width: u16, height: u16) -> (u16, u16) {
    let list_width = width.saturating_sub(BORDER_SIZE).max(1);
    let list_height = height
        .saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT + BORDER_SIZE)
        .max(1);
    (list_width, list_height)
}

pub fn render(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(BORDER_SIZE + 1),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(frame.area());

    render_header(frame, root[0], app);
    render_body(frame, root[1], app);
    render_footer(frame, root[2], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let left_line = header_line(app);
    let right_line = descriptor_line(app);
    let right_width = spans_width(&right_line.spans) as u16;
    if right_width == 0 || right_width.saturating_add(HEADER_LEFT_MIN_WIDTH) >= area.width {
        frame.render_widget(
            Paragraph::new(left_line).style(Style::default().bg(BG).fg(Color::White)),
            area,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(right_width)])
        .split(area);
    frame.render_widget(
        Paragraph::new(left_line).style(Style::default().bg(BG).fg(Color::White)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(right_line)
            .style(Style::default().bg(BG))
            .alignment(Alignment::Right),
        chunks[1],
    );
}

fn header_line(app: &App) -> Line<'static> {
    let catalog = app.catalog();
    let mut spans = Vec::new();
    push_powerline_segment(&mut spans, " Kestrel ", Color::Black, ACCENT, PL_A);
    push_powerline_segment(
        &mut spans,
        format!(" 󱃾 {} ", compact_text(app.context(), 18)),
        Color::White,
        PL_A,
        PL_B,
    );
    push_powerline_segment(
        &mut spans,
        format!(
            " 󰠳 {} ",
            compact_text(&display_cluster_endpoint(app.cluster()), 26)
        ),
        Color::White,
        PL_B,
        PL_C,
    );

    let summary = if catalog.is_empty() {
        format!(" no kinds · {} ", catalog.fetched_at().format("%H:%M:%S"))
    } else {
        format!(
            " {} kinds · {} ",
            catalog.len(),
            catalog.fetched_at().format("%H:%M:%S")
        )
    };
    let failed = catalog.warnings().len();
    if failed == 0 {
        push_powerline_segment(&mut spans, summary, Color::White, PL_C, BG);
    } else {
        push_powerline_segment(&mut spans, summary, Color::White, PL_C, WARN);
        let noun = if failed == 1 { "group" } else { "groups" };
        push_powerline_segment(
            &mut spans,
            format!(" ⚠ {failed} {noun} unavailable "),
            Color::Black,
            WARN,
            BG,
        );
    }
    Line::from(spans)
}

fn descriptor_line(app: &App) -> Line<'static> {
    let Some(descriptor) = app.selected_descriptor() else {
        return Line::default();
    };

    Line::from(vec![
        Span::styled(
            descriptor.gvr.to_string(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" · ", Style::default().fg(MUTED)),
        Span::styled(descriptor.kind.clone(), Style::default().fg(Color::White)),
        Span::styled(" · ", Style::default().fg(MUTED)),
        Span::styled(descriptor.scope_label(), Style::default().fg(MUTED)),
        Span::raw(" "),
    ])
}

fn render_body(frame: &mut Frame, area: Rect, app: &App) {
    let mut block = Block::default()
        .title(format!("Resources ({})", app.active_list().len()))
        .borders(Borders::ALL)
        .border_style(match app.mode() {
            InputMode::Browse => Style::default().fg(ACCENT),
            InputMode::Search => Style::default().fg(SEARCH),
        })
        .style(Style::default().bg(PANEL));
    if let Some(range) = window_range_label(app) {
        block = block.title_bottom(Line::from(range).right_aligned());
    }

    frame.render_widget(Paragraph::new(body_lines(app)).block(block), area);
}

/// 1-based `first-last/total` of the rows in the scroll window.
fn window_range_label(app: &App) -> Option<String> {
    let total = app.active_list().len();
    if total == 0 {
        return None;
    }
    let first = app.scroll_offset() + 1;
    let last = (app.scroll_offset() + app.viewport_height() as usize).min(total);
    Some(format!(" {first}-{last}/{total} "))
}

fn selected_row_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

fn row_style() -> Style {
    Style::default().fg(Color::White)
}

/// One line per row of the scroll window; the row at the cursor is the only
/// one drawn with the selection style.
fn body_lines(app: &App) -> Vec<Line<'static>> {
    let max_chars = (app.viewport_width() as usize)
        .saturating_sub(ROW_PREFIX_WIDTH)
        .max(1);
    app.visible_rows()
        .map(|(index, name)| {
            if index == app.cursor() {
                Line::from(format!("󰜴 {}", compact_text(name, max_chars)))
                    .style(selected_row_style())
            } else {
                Line::from(format!("  {}", compact_text(name, max_chars))).style(row_style())
            }
        })
        .collect()
}

fn footer_label(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Browse => BROWSE_LABEL,
        InputMode::Search => SEARCH_LABEL,
    }
}

/// The live query while searching, otherwise the selected name.
fn footer_value(app: &App) -> &str {
    match app.mode() {
        InputMode::Browse => app.selected_name(),
        InputMode::Search => app.query(),
    }
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let label_bg = match app.mode() {
        InputMode::Browse => ACCENT,
        InputMode::Search => SEARCH,
    };

    let mut spans = Vec::new();
    push_powerline_segment(
        &mut spans,
        format!(" {} ", footer_label(app.mode())),
        Color::Black,
        label_bg,
        BG,
    );
    let prefix_width = spans_width(&spans) + 1;
    let value = compact_text(
        footer_value(app),
        (area.width as usize).saturating_sub(prefix_width + 1).max(1),
    );
    let value_width = value.chars().count();
    spans.push(Span::styled(
        format!(" {value}"),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );

    if app.mode() == InputMode::Search {
        let x = area
            .x
            .saturating_add((prefix_width + value_width) as u16)
            .min(area.right().saturating_sub(1));
        frame.set_cursor_position(Position::new(x, area.y));
    }
}

fn push_powerline_segment(
    spans: &mut Vec<Span<'static>>,
    content: impl Into<String>,
    fg: Color,
    bg: Color,
    next_bg: Color,
) {
    spans.push(Span::styled(
        content.into(),
        Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("", Style::default().fg(bg).bg(next_bg)));
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|span| span.content.chars().count()).sum()
}

fn compact_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }

    if max_chars <= 1 {
        return "…".to_string();
    }

    let mut out = value
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    out.push('…');
    out
}

fn display_cluster_endpoint(cluster: &str) -> String {
    let trimmed = cluster.trim().trim_end_matches('/');
    trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .to_string()
}
