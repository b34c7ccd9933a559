//! Draws the board with `ratatui` widgets.

use std::time::Duration;

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Wrap};

use cryptorank_domain::DisplayCoin;
use cryptorank_domain::format::{format_change, format_magnitude, format_price, ChangeDirection};
use crate::refresh::BoardState;

pub const SKELETON_ROWS: usize = 10;

const TITLE: &str = "Cryptocurrency Rankings";
const PLACEHOLDER: &str = "░░░░░░░░";

const HEADER: [&str; 6] = ["#", "Name", "Price", "24h", "Market Cap", "Volume"];

const COLUMN_WIDTHS: [Constraint; 6] = [
    Constraint::Length(4),
    Constraint::Length(30),
    Constraint::Length(16),
    Constraint::Length(11),
    Constraint::Length(13),
    Constraint::Length(13),
];

pub fn draw_board(f: &mut Frame, state: &BoardState, interval: Duration) {
    let banner_height = if state.error().is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.size());

    f.render_widget(Paragraph::new(status_line(state)), chunks[0]);

    if let Some(message) = state.error() {
        f.render_widget(error_banner(message), chunks[1]);
    }

    let rows = state.coins.iter().map(coin_row);
    f.render_widget(coin_table(rows, TITLE), chunks[2]);
    f.render_widget(Paragraph::new(footer_line(interval)), chunks[3]);
}

/// What is shown before the first snapshot arrives.
pub fn draw_skeleton(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(f.size());

    let loading = Span::styled("Loading...", Style::default().fg(Color::DarkGray));
    f.render_widget(Paragraph::new(Line::from(loading)), chunks[0]);

    let dim = Style::default().fg(Color::DarkGray);
    let rows = (0..SKELETON_ROWS).map(|_| {
        Row::new(COLUMN_WIDTHS.iter().map(|_| Cell::from(Span::styled(PLACEHOLDER, dim))))
    });
    f.render_widget(coin_table(rows, TITLE), chunks[1]);
}

/// Shown instead of the board when the first load fails.
pub fn draw_unavailable(f: &mut Frame, message: &str) {
    let area = f.size();
    let block = Block::default()
        .title(Span::styled(TITLE, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let lines = vec![
        Line::from(Span::styled(
            "Unable to load cryptocurrency data",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Details: ", Style::default().fg(Color::Red)),
            Span::raw(message.to_owned()),
        ]),
        Line::from("Check that the API server is running and try again."),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" or "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" to exit."),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
    f.render_widget(paragraph, centered(inner, 8));
}

pub fn footer(interval: Duration) -> String {
    format!("Data refreshes every {} seconds • Powered by CoinGecko", interval.as_secs())
}

fn footer_line(interval: Duration) -> Line<'static> {
    Line::from(vec![
        Span::raw(footer(interval)),
        Span::styled("   r retry · q quit", Style::default().fg(Color::DarkGray)),
    ])
}

fn status_line(state: &BoardState) -> Line<'static> {
    let updated = state.last_updated.with_timezone(&Local).format("%H:%M:%S");
    let mut spans = vec![Span::raw(format!("Last updated {}", updated))];
    if state.is_refreshing() {
        spans.push(Span::styled("  (refreshing...)", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

fn error_banner(message: &str) -> Paragraph<'static> {
    let red = Style::default().fg(Color::Red);
    let line = Line::from(vec![
        Span::styled(message.to_owned(), red.add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled("Press r to retry", Style::default().add_modifier(Modifier::BOLD)),
    ]);

    Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).border_style(red))
        .wrap(Wrap { trim: true })
}

fn coin_table<'a, R>(rows: R, title: &'a str) -> Table<'a>
where
    R: IntoIterator<Item = Row<'a>>,
{
    let header = Row::new(HEADER.iter().map(|h| Cell::from(*h)))
        .style(Style::default().add_modifier(Modifier::BOLD));

    Table::new(rows, COLUMN_WIDTHS)
        .header(header)
        .column_spacing(1)
        .block(Block::default()
            .title(Span::styled(title, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded))
}

fn coin_row(coin: &DisplayCoin) -> Row<'static> {
    let (arrow, color) = match coin.direction() {
        ChangeDirection::Up => ("▲", Color::Green),
        ChangeDirection::Down => ("▼", Color::Red),
    };

    Row::new(vec![
        Cell::from(coin.rank.to_string()),
        Cell::from(format!("{} ({})", coin.name, coin.symbol)),
        Cell::from(format_price(&coin.price)),
        Cell::from(Span::styled(
            format!("{} {}", arrow, format_change(&coin.change_24h)),
            Style::default().fg(color),
        )),
        Cell::from(format_magnitude(&coin.market_cap)),
        Cell::from(format_magnitude(&coin.volume)),
    ])
}

fn centered(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    }
}
