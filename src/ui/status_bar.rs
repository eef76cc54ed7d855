use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn draw_status_bar(f: &mut Frame, app: &mut App, area: Rect) {
    if let Some((message, timestamp)) = &app.status_message {
        // Clear messages older than 5 seconds
        if timestamp.elapsed().as_secs() < 5 {
            let style = if message.to_lowercase().contains("error") {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Yellow)
            };
            let paragraph = Paragraph::new(message.as_str())
                .style(style)
                .alignment(Alignment::Center);
            f.render_widget(paragraph, area);
            return;
        }
        app.clear_status_message();
    }

    let list = &app.list;
    let text = if list.filter().is_empty() {
        format!("{} hosts", list.hosts().len())
    } else {
        format!("{}/{} hosts match", list.visible_len(), list.hosts().len())
    };
    let paragraph = Paragraph::new(text).style(Style::default().fg(Color::Indexed(240)));
    f.render_widget(paragraph, area);
}
