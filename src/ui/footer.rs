use crate::app::{App, InputMode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let (nav_text, action_text) = match app.input_mode {
        _ if app.is_connecting() => ("Connecting to SSH host...", "Please wait"),
        InputMode::Normal => (
            "↑/k: Up  ↓/j: Down  [Enter] Connect  [/] Search",
            "[q] Quit",
        ),
        InputMode::Search => (
            "↑: Up  ↓: Down  [Enter] Connect",
            "[Esc] Clear  Type to filter",
        ),
    };

    let nav_help = Paragraph::new(nav_text).style(Style::default().fg(if app.is_connecting() {
        Color::Yellow
    } else {
        Color::Gray
    }));

    let action_help = Paragraph::new(action_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Right);

    f.render_widget(nav_help, footer[0]);
    f.render_widget(action_help, footer[1]);
}
