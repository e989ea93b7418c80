use chrono::{Local, NaiveDate};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    // Title / header
    let header = Paragraph::new("publidata – waste collection schedules")
        .block(Block::default().borders(Borders::ALL).title("Publidata"));
    frame.render_widget(header, *header_area);

    // Main screen
    match app.screen {
        Screen::SourceSelect => draw_source_select(frame, app, *content_area),
        Screen::ScheduleView => draw_schedule_view(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::SourceSelect => "↑/↓ move · Enter/→ open schedule · q/Ctrl-C quit",
        Screen::ScheduleView => "r refresh · Esc/←/b back to sources · q/Ctrl-C quit",
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_source_select(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = if app.sources.is_empty() {
        vec![ListItem::new(
            "No sources configured. Add [[sources]] tables to the config file.",
        )]
    } else {
        app.sources
            .iter()
            .enumerate()
            .map(|(idx, source)| {
                let prefix = if idx == app.source_list_index {
                    "> "
                } else {
                    "  "
                };
                ListItem::new(format!("{prefix}{} ({})", source.name, source.kind))
            })
            .collect::<Vec<ListItem<'_>>>()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select source (↑/↓, Enter)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.sources.is_empty() {
        state.select(Some(app.source_list_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_schedule_view(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = app.selected_source.as_ref().map_or_else(
        || "Schedule (Esc/←/b to go back)".to_owned(),
        |source| {
            format!(
                "Schedule for {} · {} (Esc/←/b to go back)",
                source.name, source.timezone
            )
        },
    );

    if app.is_loading {
        let paragraph = Paragraph::new("Loading schedule…")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    if app.events.is_empty() {
        let paragraph = Paragraph::new("No collections published for this address.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let today = Local::now().date_naive();
    let mut events = app.events.clone();
    events.sort_by_key(|event| event.date);

    let rows = events.into_iter().map(|event| {
        let date = event.date.format("%d/%m/%Y").to_string();
        let weekday = event.date.format("%a").to_string();
        let relative = relative_day_label(event.date, today);

        let mut style = Style::default().fg(label_color(&event.waste_type));
        if event.date <= today {
            style = style.add_modifier(Modifier::BOLD);
        }

        Row::new(vec![
            Cell::from(date),
            Cell::from(weekday),
            Cell::from(relative),
            Cell::from(event.waste_type),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Date", "Day", "In", "Waste type"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, area);
}

// Labels are free text, so colors go by keyword.
fn label_color(label: &str) -> Color {
    let normalized = label.to_lowercase();

    if normalized.contains("verre") {
        Color::Cyan
    } else if normalized.contains("emballage") || normalized.contains("recycl") {
        Color::Yellow
    } else if normalized.contains("bio") || normalized.contains("vert") {
        Color::Green
    } else if normalized.contains("papier") || normalized.contains("carton") {
        Color::Blue
    } else if normalized.contains("ordure") || normalized == "om" {
        Color::Gray
    } else if normalized.contains("encombrant") {
        Color::LightRed
    } else {
        Color::Magenta
    }
}

fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    let delta = (date - today).num_days();
    match delta {
        0 => "today".to_owned(),
        1 => "tomorrow".to_owned(),
        days if days > 1 => format!("in {days} days"),
        -1 => "yesterday".to_owned(),
        days => format!("{} days ago", days.abs()),
    }
}
