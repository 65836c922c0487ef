//! Board view: progress header, one column per status, status bar

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::cli::tui::app::{App, InputMode};
use crate::cli::tui::utils::{card_labels, card_meta, truncate_str};
use crate::domain::{Task, TaskStatus};

/// Draw the board layout
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress header
            Constraint::Min(10),   // Columns
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    draw_header(frame, app, main_chunks[0]);

    let count = app.columns().len().max(1) as u32;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(app.columns().iter().map(|_| Constraint::Ratio(1, count)))
        .split(main_chunks[1]);

    for (index, status) in app.columns().iter().enumerate() {
        draw_column(frame, app, *status, index, columns[index]);
    }

    draw_status_bar(frame, app, main_chunks[2]);
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Green,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Blocked => Color::Red,
        TaskStatus::Done => Color::DarkGray,
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let progress = match app.progress() {
        Some(p) => format!(
            "{}/{} done ({}%)  overdue: {}",
            p.done, p.total, p.completion_pct, p.overdue
        ),
        None => "board contains invalid tasks".to_string(),
    };

    let line = Line::from(vec![
        Span::styled("taskboard ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(progress),
        Span::raw(format!("  capacity: {}", app.capacity())),
    ]);

    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_column(frame: &mut Frame, app: &App, status: TaskStatus, index: usize, area: Rect) {
    let cards = app.cards(status);
    let focused = index == app.focused_column();
    let color = status_color(status);
    let width = area.width.saturating_sub(4) as usize;
    let now = app.now();

    let items: Vec<ListItem> = cards
        .iter()
        .enumerate()
        .map(|(i, (task, priority))| {
            let selected = focused && i == app.selected_card();
            card(task, *priority, task.is_overdue(now), in_sprint(app, task), selected, width, color)
        })
        .collect();

    let border_style = if focused {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };

    let title = format!("{} ({})", status.label(), cards.len());
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style),
    );

    frame.render_widget(list, area);
}

fn in_sprint(app: &App, task: &Task) -> bool {
    app.plan().is_some_and(|plan| plan.is_selected(&task.id))
}

fn card(
    task: &Task,
    priority: u8,
    overdue: bool,
    in_sprint: bool,
    selected: bool,
    width: usize,
    color: Color,
) -> ListItem<'static> {
    let marker = match (selected, in_sprint) {
        (true, true) => ">*",
        (true, false) => "> ",
        (false, true) => " *",
        (false, false) => "  ",
    };

    let mut title_style = Style::default().fg(color);
    if selected {
        title_style = title_style.add_modifier(Modifier::REVERSED);
    }
    let meta_style = if overdue {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mut lines = vec![
        Line::styled(
            format!("{}{}", marker, truncate_str(&task.title, width.saturating_sub(2))),
            title_style,
        ),
        Line::styled(
            format!("  {}", truncate_str(&card_meta(task, priority, overdue), width.saturating_sub(2))),
            meta_style,
        ),
    ];

    let labels = card_labels(task);
    if !labels.is_empty() {
        lines.push(Line::styled(
            format!("  {}", truncate_str(&labels, width.saturating_sub(2))),
            Style::default().fg(Color::Cyan),
        ));
    }

    ListItem::new(lines)
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (content, style) = match app.input_mode() {
        InputMode::Normal => {
            let msg = app
                .status_message()
                .unwrap_or("[s]tart [b]lock [u]nblock [f]inish [n]ew [a]ssign [+/-]capacity [?]help [q]uit");
            (msg.to_string(), Style::default())
        }
        InputMode::NewTask(title) => (
            format!("New task: {}_  (Enter to add, Esc to cancel)", title),
            Style::default().fg(Color::Yellow),
        ),
    };

    let paragraph = Paragraph::new(content)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}
