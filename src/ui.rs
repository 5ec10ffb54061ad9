use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Alignment,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::version::VersionFilter;

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // аккаунт и фильтр
            Constraint::Min(0),    // список версий
            Constraint::Length(if app.busy { 4 } else { 1 }),
            Constraint::Length(3), // футер
        ])
        .split(f.size());

    draw_header(f, app, chunks[0]);
    draw_versions(f, app, chunks[1]);

    if app.busy {
        draw_progress(f, app, chunks[2]);
    } else {
        let status = Paragraph::new(app.status_line())
            .style(Style::default().fg(if app.offline { Color::Yellow } else { Color::Gray }));
        f.render_widget(status, chunks[2]);
    }

    let controls = if app.account_input.is_some() {
        "Введите ник | Enter: Добавить | Esc: Отмена"
    } else if app.dialog.is_some() {
        "Enter/Esc: Закрыть"
    } else {
        "↑↓: Навигация | Tab: Переключение | F: Фильтр | A: Аккаунт | R: Обновить | Enter: Играть | Q: Выход"
    };
    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[3]);

    if let Some(input) = &app.account_input {
        draw_input(f, input);
    }

    if let Some(dialog) = &app.dialog {
        draw_dialog(f, &dialog.title, &dialog.text);
    }
}

fn focus_style(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let account = Paragraph::new(format!(
        "◀ {} ▶ ({}/{})",
        app.current_nickname(),
        app.selected_account + 1,
        app.accounts.len().max(1)
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Аккаунт")
            .border_style(focus_style(app, Focus::Accounts)),
    );
    f.render_widget(account, chunks[0]);

    let labels: Vec<&str> = VersionFilter::ALL.iter().map(VersionFilter::label).collect();
    let filter_style = if app.filter_enabled() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let filter = Paragraph::new(format!("{} [{}]", app.filter.label(), labels.join(" / ")))
        .style(filter_style)
        .block(Block::default().borders(Borders::ALL).title("Фильтр"));
    f.render_widget(filter, chunks[1]);
}

fn draw_versions(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .entries
        .iter()
        .map(|entry| {
            let color = if entry.installed { Color::Green } else { Color::White };
            ListItem::new(entry.decorated()).style(Style::default().fg(color))
        })
        .collect();

    let title = if app.offline { "Версии (офлайн)" } else { "Версии" };
    let versions = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focus_style(app, Focus::Versions)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    f.render_stateful_widget(versions, area, &mut app.versions_state);
}

fn draw_progress(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(3)])
        .split(area);

    let status = Paragraph::new(app.progress.status.clone())
        .style(Style::default().fg(Color::Green))
        .alignment(Alignment::Center);
    f.render_widget(status, chunks[0]);

    let percent = app.progress.get_progress_percentage();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(percent)
        .label(format!("{}%", percent));
    f.render_widget(gauge, chunks[1]);
}

fn draw_input(f: &mut Frame, input: &str) {
    let area = centered_rect(50, 20, f.size());
    f.render_widget(Clear, area);

    let paragraph = Paragraph::new(format!("{}_", input))
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .title("Новый аккаунт")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(paragraph, area);
}

fn draw_dialog(f: &mut Frame, title: &str, text: &str) {
    let area = centered_rect(60, 30, f.size());
    f.render_widget(Clear, area);

    let paragraph = Paragraph::new(text.to_string())
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    f.render_widget(paragraph, area);
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
