use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph};

use crate::app::{App, InputMode};
use crate::banner::{BANNER_MARGIN, banner_lines};
use crate::model::SelectableItem;

const ACCENT: Color = Color::Rgb(255, 135, 0);
const MUTED: Color = Color::Rgb(140, 156, 178);
const WARN: Color = Color::Rgb(251, 191, 36);
const LABEL_KEY: Color = Color::Rgb(255, 175, 95);

pub fn render(frame: &mut Frame, app: &App) {
    let level = app.active_frame().level();
    let banner = banner_lines(level);
    let label_rows = app.auxiliary_rows() as u16;
    let list_rows = app.active_frame().list.window_rows().max(1) as u16;

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(BANNER_MARGIN),
            Constraint::Length(banner.len() as u16),
            Constraint::Length(1),
            Constraint::Length(label_rows),
            Constraint::Length(list_rows),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(frame.area());

    render_banner(frame, root[1], &banner);
    render_context(frame, root[2], app);
    if label_rows > 0 {
        render_labels(frame, root[3], app);
    }
    render_list(frame, root[4], app);
    render_footer(frame, root[5], app);
}

fn render_banner(frame: &mut Frame, area: Rect, banner: &[&'static str]) {
    let lines = banner
        .iter()
        .enumerate()
        .map(|(row, text)| Line::from(Span::styled(*text, Style::default().fg(gradient(row)))))
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines), area);
}

/// Orange, getting lighter towards the bottom of the banner.
fn gradient(row: usize) -> Color {
    let step = (row.min(6) * 18) as u8;
    Color::Rgb(255, 95 + step, step / 2)
}

fn render_context(frame: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled("context: ", Style::default().fg(MUTED)),
        Span::styled(
            app.context().to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_labels(frame: &mut Frame, area: Rect, app: &App) {
    let Some(item) = app
        .active_frame()
        .list
        .selected()
        .filter(|item| item.has_metadata())
    else {
        return;
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(Style::default().fg(ACCENT));
    frame.render_widget(Paragraph::new(label_lines(item)).block(block), area);
}

/// Labels sorted by key with keys right-aligned to the longest one.
fn label_lines(item: &SelectableItem) -> Vec<Line<'static>> {
    let width = item.metadata.keys().map(|key| key.chars().count()).max().unwrap_or(0);
    item.metadata
        .iter()
        .map(|(key, value)| {
            Line::from(vec![
                Span::styled(format!("{key:>width$}"), Style::default().fg(LABEL_KEY)),
                Span::styled(": ", Style::default().fg(MUTED)),
                Span::styled(value.clone(), Style::default().fg(Color::White)),
            ])
        })
        .collect()
}

fn render_list(frame: &mut Frame, area: Rect, app: &App) {
    let list = &app.active_frame().list;
    let visible = list.filtered_view();
    if visible.is_empty() {
        let message = if list.is_empty() {
            "nothing here"
        } else {
            "no matches"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(format!("  {message}"), Style::default().fg(MUTED))),
            area,
        );
        return;
    }

    let items = visible
        .iter()
        .map(|item| ListItem::new(Line::from(item.name.clone())))
        .collect::<Vec<_>>();
    let widget = List::new(items)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(list.cursor());
    frame.render_stateful_widget(widget, area, &mut state);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let list = &app.active_frame().list;
    let top = if matches!(app.mode(), InputMode::Filter) {
        Line::from(vec![
            Span::styled("/", Style::default().fg(ACCENT)),
            Span::styled(list.filter_query().to_string(), Style::default().fg(Color::White)),
            Span::styled("_", Style::default().fg(ACCENT).add_modifier(Modifier::SLOW_BLINK)),
        ])
    } else if let Some(status) = app.status() {
        Line::from(Span::styled(status.to_string(), Style::default().fg(WARN)))
    } else if !list.filter_query().is_empty() {
        Line::from(vec![
            Span::styled("filter: ", Style::default().fg(MUTED)),
            Span::styled(list.filter_query().to_string(), Style::default().fg(Color::White)),
        ])
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(top), rows[0]);

    let level = app.active_frame().level();
    let help = format!(
        "{} {}/{}  enter select  / filter  q back  ctrl+c quit",
        level.title(),
        list.filtered_len(),
        list.len()
    );
    frame.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(MUTED))),
        rows[1],
    );
}
