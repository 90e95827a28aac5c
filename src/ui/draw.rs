use super::view::{DashboardView, NowPlayingView, WaitingView};
use crate::art::GlyphArt;
use crate::state::{StatusMessage, Tone};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

// borders + a column of breathing room each side
const PANEL_PADDING: u16 = 4;
const INFO_HEIGHT: u16 = 4;
const MIN_TEXT_WIDTH: u16 = 48;

pub fn draw_dashboard(f: &mut Frame, view: &DashboardView<'_>) {
    match view {
        DashboardView::Waiting(waiting) => draw_waiting(f, waiting),
        DashboardView::NowPlaying(playing) => draw_now_playing(f, playing),
    }
}

fn draw_waiting(f: &mut Frame, view: &WaitingView<'_>) {
    let text = Text::from(vec![
        Line::from(view.message),
        Line::default(),
        Line::from(status_span(view.status)),
    ]);
    let panel = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(view.title));

    f.render_widget(panel, f.area());
}

fn draw_now_playing(f: &mut Frame, view: &NowPlayingView<'_>) {
    let accent = if view.play_state.is_playing() { Color::Green } else { Color::Red };
    let art_width = view.art.width() as u16;
    let art_height = view.art.height() as u16;

    // Fit the panel around the art instead of stretching across the terminal
    let inner_width = art_width.max(MIN_TEXT_WIDTH);
    let inner_height = art_height + INFO_HEIGHT + 1 + 1 + 2;
    let panel = centered(f.area(), inner_width + PANEL_PADDING, inner_height + 2);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(view.title)
        .border_style(Style::default().fg(accent));
    let inner = block.inner(panel);
    f.render_widget(block, panel);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(art_height), // Artwork
            Constraint::Length(INFO_HEIGHT), // Title / artist / album
            Constraint::Length(1),          // Progress
            Constraint::Length(1),          // Play state + time
            Constraint::Min(0),             // Controls
        ])
        .split(inner);

    let artwork = Paragraph::new(art_lines(view.art)).alignment(Alignment::Center);
    f.render_widget(artwork, chunks[0]);

    let info = Paragraph::new(vec![
        Line::default(),
        Line::from(Span::styled(
            view.track_name.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(view.artist.to_string(), Style::default().fg(Color::Yellow))),
        Line::from(Span::styled(
            view.album.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::DIM),
        )),
    ]);
    f.render_widget(info, chunks[1]);

    let progress_area = centered(chunks[2], art_width.min(chunks[2].width), 1);
    let progress = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
        .ratio(view.progress.ratio())
        .label("");
    f.render_widget(progress, progress_area);

    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(chunks[3]);
    let badge = Paragraph::new(Span::styled(
        view.play_state.label(),
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Left);
    let time = Paragraph::new(view.time.as_str())
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    f.render_widget(badge, row[0]);
    f.render_widget(time, row[1]);

    let controls = Paragraph::new(vec![Line::default(), Line::from(status_span(view.status))])
        .alignment(Alignment::Center);
    f.render_widget(controls, chunks[4]);
}

fn art_lines(art: &GlyphArt) -> Vec<Line<'static>> {
    art.rows()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| {
                    let tint = cell.tint;
                    Span::styled(
                        cell.glyph.to_string(),
                        Style::default().fg(Color::Rgb(tint.0, tint.1, tint.2)),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn status_span(status: &StatusMessage) -> Span<'static> {
    let style = match status.tone() {
        Tone::Muted => Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        Tone::Pending => Style::default().fg(Color::Yellow),
        Tone::Positive => Style::default().fg(Color::Green),
        Tone::Negative => Style::default().fg(Color::Red),
    };
    Span::styled(status.text().into_owned(), style)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
