use crate::app::{App, Phase};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

mod footer;
pub mod hosts_list;
mod status_bar;

use footer::draw_footer;
use hosts_list::{draw_hosts_list, draw_search_box};
use status_bar::draw_status_bar;

pub fn draw(f: &mut Frame, app: &mut App) {
    if let Phase::Failed(message) = &app.phase {
        draw_error_screen(f, message);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Search box
                Constraint::Min(3),    // Main content
                Constraint::Length(1), // Status bar
                Constraint::Length(1), // Footer
            ]
            .as_ref(),
        )
        .split(f.size());

    draw_search_box(f, app, chunks[0]);
    draw_hosts_list(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    if app.is_connecting() {
        draw_connecting_overlay(f, app);
    }
}

/// Helper function to center a rectangle with given width and height
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height)) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn draw_connecting_overlay(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 7, f.size());

    let name = app
        .selected_host
        .as_ref()
        .map(|h| h.name.as_str())
        .unwrap_or("host");
    let content = vec![
        Line::from(Span::styled(
            format!("Connecting to {}...", name),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Please wait.",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" SSH Connection ")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Center);

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn draw_error_screen(f: &mut Frame, message: &str) {
    let content = vec![
        Line::from(Span::styled(
            format!("Error: {}", message),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to quit.",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
    ];
    f.render_widget(Paragraph::new(content), f.size());
}
