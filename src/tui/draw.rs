//! All drawing / rendering functions.

use std::time::Instant;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap};

use crate::format::{format_count, format_duration, truncate};
use crate::model::{PlaylistInfo, VideoInfo};
use crate::quality::QualityMenu;
use crate::view::{
    ENTRY_TITLE_LIMIT, NO_DESCRIPTION, ProgressTone, ToastKind, UNKNOWN_PLAYLIST, UNKNOWN_TITLE,
    UNKNOWN_UPLOADER,
};

use super::app::App;
use super::view::{Panel, TuiView};

const DESCRIPTION_LIMIT: usize = 300;
const PLAYLIST_PREVIEW: usize = 10;

pub fn draw(frame: &mut ratatui::Frame, app: &App, view: &TuiView) {
    let area = frame.area();

    let outer = Block::default()
        .title(" tubefetch ")
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let history_height = if view.history.is_empty() {
        0
    } else {
        u16::try_from(view.history.len()).unwrap_or(u16::MAX) + 2
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),              // URL input
            Constraint::Min(6),                 // Info panel
            Constraint::Length(3),              // Progress
            Constraint::Length(1),              // Notice / toast
            Constraint::Length(history_height), // Recent downloads
            Constraint::Length(1),              // Controls bar
        ])
        .split(inner);

    draw_input(frame, app, chunks[0]);
    draw_panel(frame, view, chunks[1]);
    draw_progress(frame, view, chunks[2]);
    draw_messages(frame, view, chunks[3]);
    if !view.history.is_empty() {
        draw_history(frame, view, chunks[4]);
    }

    let controls = Paragraph::new("Enter:fetch  ←/→:quality  ^D:download  ^L:clear  Esc:quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(controls, chunks[5]);
}

fn draw_input(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let border = if app.is_pulsing(Instant::now()) {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let input = Paragraph::new(app.url_input.as_str())
        .block(
            Block::default()
                .title(" YouTube URL (Enter to fetch): ")
                .borders(Borders::ALL)
                .border_style(border),
        )
        .style(Style::default().fg(Color::White));
    frame.render_widget(input, area);
}

fn draw_panel(frame: &mut ratatui::Frame, view: &TuiView, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let lines = match &view.panel {
        Panel::Empty => vec![Line::from(Span::styled(
            "Paste a video or playlist URL to get started.",
            Style::default().fg(Color::DarkGray),
        ))],
        Panel::Loading => vec![Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))],
        Panel::Error(message) => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))],
        Panel::Video(info, menu) => video_lines(info, menu),
        Panel::Playlist(info, menu) => playlist_lines(info, menu),
    };
    let panel = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn title_line(title: Option<&str>, fallback: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.unwrap_or(fallback).to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn uploader(name: Option<&str>) -> String {
    name.filter(|n| !n.is_empty())
        .unwrap_or(UNKNOWN_UPLOADER)
        .to_string()
}

fn quality_line(menu: &QualityMenu) -> Line<'static> {
    Line::from(vec![
        Span::styled("Quality: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("< {} >", menu.selected().label),
            Style::default().fg(Color::Cyan),
        ),
    ])
}

fn video_lines(info: &VideoInfo, menu: &QualityMenu) -> Vec<Line<'static>> {
    let mut lines = vec![
        title_line(info.title.as_deref(), UNKNOWN_TITLE),
        field("Uploader", uploader(info.uploader.as_deref())),
        field("Duration", format_duration(info.duration_secs())),
        field("Views", format_count(info.view_count)),
    ];
    let description = info
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DESCRIPTION);
    lines.push(Line::from(truncate(description, DESCRIPTION_LIMIT)));
    lines.push(Line::default());
    lines.push(quality_line(menu));
    lines
}

fn playlist_lines(info: &PlaylistInfo, menu: &QualityMenu) -> Vec<Line<'static>> {
    let mut lines = vec![
        title_line(info.title.as_deref(), UNKNOWN_PLAYLIST),
        field("Uploader", uploader(info.uploader.as_deref())),
        field("Videos", info.video_count.to_string()),
    ];
    for (index, video) in info.videos.iter().take(PLAYLIST_PREVIEW).enumerate() {
        lines.push(Line::from(format!(
            "{:>3}. {} ({}, {} views)",
            index + 1,
            truncate(video.title.as_deref().unwrap_or(UNKNOWN_TITLE), ENTRY_TITLE_LIMIT),
            format_duration(video.duration_secs()),
            format_count(video.view_count)
        )));
    }
    if info.videos.len() > PLAYLIST_PREVIEW {
        lines.push(Line::from(Span::styled(
            format!("... and {} more", info.videos.len() - PLAYLIST_PREVIEW),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::default());
    lines.push(quality_line(menu));
    lines
}

fn draw_progress(frame: &mut ratatui::Frame, view: &TuiView, area: Rect) {
    let Some(progress) = &view.progress else {
        return;
    };
    let color = match progress.tone {
        ProgressTone::Starting => Color::Yellow,
        ProgressTone::Active => Color::Blue,
        ProgressTone::Success => Color::Green,
        ProgressTone::Failure => Color::Red,
    };
    let label = format!(
        "{}  {}  {}  ETA {}",
        progress.bar_label(),
        progress.caption,
        progress.speed,
        progress.eta
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .ratio(progress.ratio())
        .label(label);
    frame.render_widget(gauge, area);
}

fn draw_messages(frame: &mut ratatui::Frame, view: &TuiView, area: Rect) {
    let mut spans = Vec::new();
    if let Some(notice) = &view.notice {
        spans.push(Span::styled(
            notice.value.message.clone(),
            Style::default().fg(Color::Green),
        ));
        if let Some(link) = &notice.value.link {
            spans.push(Span::raw(format!("  {link}")));
        }
    }
    if let Some(toast) = &view.toast {
        let color = match toast.value.kind {
            ToastKind::Success => Color::Green,
            ToastKind::Error => Color::Red,
        };
        if !spans.is_empty() {
            spans.push(Span::raw("  |  "));
        }
        spans.push(Span::styled(
            toast.value.message.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_history(frame: &mut ratatui::Frame, view: &TuiView, area: Rect) {
    let items: Vec<ListItem> = view
        .history
        .iter()
        .map(|line| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", line.time), Style::default().fg(Color::DarkGray)),
                Span::raw(line.name.clone()),
                Span::styled(format!("  {}", line.link), Style::default().fg(Color::Blue)),
            ]))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .title(" Recent downloads ")
            .borders(Borders::ALL),
    );
    frame.render_widget(list, area);
}

