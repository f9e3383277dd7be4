//! TUI rendering and layout

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::clock;
use crate::formatting::format_bandwidth;
use crate::stats::{SortMode, SortOrder};
use crate::tui::app::TuiApp;

const BORDER_ACTIVE: Color = Color::Cyan;
const BORDER_NORMAL: Color = Color::DarkGray;
const LABEL: Color = Color::Gray;
const VALUE_PRIMARY: Color = Color::Green;
const VALUE_WARN: Color = Color::Yellow;
const VALUE_ERROR: Color = Color::Red;

/// Render the whole dashboard.
pub fn render(f: &mut Frame, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(8),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_title(f, chunks[0], app);
    render_leaderboard(f, chunks[1], app);
    render_logs(f, chunks[2], app);
    render_footer(f, chunks[3]);
}

fn render_title(f: &mut Frame, area: Rect, app: &TuiApp) {
    let stats = app.capture_stats();
    let capture_status = if app.capture_alive() {
        Span::styled("live", Style::default().fg(VALUE_PRIMARY))
    } else {
        Span::styled("stopped", Style::default().fg(VALUE_ERROR).add_modifier(Modifier::BOLD))
    };

    let title = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                "mctop ",
                Style::default().fg(BORDER_ACTIVE).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("- {}:{} ", app.interface(), app.port()),
                Style::default().fg(Color::White),
            ),
            Span::styled("capture ", Style::default().fg(LABEL)),
            capture_status,
        ]),
        Line::from(vec![
            Span::styled("Uptime: ", Style::default().fg(LABEL)),
            Span::styled(format_uptime(app.uptime()), Style::default().fg(VALUE_PRIMARY)),
            Span::styled("  |  Keys: ", Style::default().fg(LABEL)),
            Span::raw(format!("{}", app.stat_count())),
            Span::styled("  |  Packets: ", Style::default().fg(LABEL)),
            Span::raw(format!("{}", stats.packets)),
            Span::styled("  |  Dropped: ", Style::default().fg(LABEL)),
            Span::styled(
                format!("{}", stats.events_dropped),
                Style::default().fg(if stats.events_dropped > 0 {
                    VALUE_WARN
                } else {
                    Color::White
                }),
            ),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER_ACTIVE)),
    )
    .alignment(Alignment::Center);

    f.render_widget(title, area);
}

fn render_leaderboard(f: &mut Frame, area: Rect, app: &TuiApp) {
    let now_ms = clock::now_ms();

    let header = Row::new(
        ["Key", "Calls", "Elapsed", "Rate", "Size", "BW"]
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let selected = matches!(
                    (i, app.sort_mode()),
                    (1, SortMode::Calls)
                        | (3, SortMode::ReqRate)
                        | (4, SortMode::Size)
                        | (5, SortMode::Bandwidth)
                );
                let style = if selected {
                    Style::default().fg(BORDER_ACTIVE).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(LABEL).add_modifier(Modifier::BOLD)
                };
                Cell::from(name).style(style)
            }),
    );

    // leave room for the border and the header row
    let visible = usize::from(area.height.saturating_sub(3));
    let rows = app.leaders().iter().take(visible).map(|stat| {
        Row::new(vec![
            Cell::from(stat.key().to_string()),
            Cell::from(format!("{}", stat.count())),
            Cell::from(format!("{:.0}s", stat.elapsed_secs(now_ms))),
            Cell::from(format!("{:.2}/s", stat.request_rate(now_ms))),
            Cell::from(format!("{}", stat.size())),
            Cell::from(format_bandwidth(stat.bandwidth(now_ms))),
        ])
    });

    let order_arrow = match app.sort_order() {
        SortOrder::Desc => "v",
        SortOrder::Asc => "^",
    };
    let table = Table::new(
        rows,
        [
            Constraint::Min(24),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(
                " Top keys by {} {} ",
                app.sort_mode(),
                order_arrow
            ))
            .border_style(Style::default().fg(BORDER_NORMAL)),
    );

    f.render_widget(table, area);
}

fn render_logs(f: &mut Frame, area: Rect, app: &TuiApp) {
    let visible = usize::from(area.height.saturating_sub(2));
    let lines: Vec<Line> = app
        .recent_logs(visible)
        .into_iter()
        .map(Line::from)
        .collect();

    let logs = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Log ")
            .border_style(Style::default().fg(BORDER_NORMAL)),
    );
    f.render_widget(logs, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("sort: ", Style::default().fg(LABEL)),
        Span::raw("[c]alls [s]ize [r]eqrate [b]andwidth "),
        Span::styled("[o]", Style::default().fg(LABEL)),
        Span::raw("rder "),
        Span::styled("[q]", Style::default().fg(LABEL)),
        Span::raw("uit"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn format_uptime(uptime: std::time::Duration) -> String {
    let total = uptime.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
