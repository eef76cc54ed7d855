use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, InputMode};

// Accent used by the selected entry.
const SELECTED: Color = Color::Indexed(170);

pub fn draw_search_box(f: &mut Frame, app: &App, area: Rect) {
    let is_search_mode = app.input_mode == InputMode::Search;

    let (title, border_style) = if is_search_mode {
        (
            " Filter (Esc to clear) ",
            Style::default().fg(Color::Yellow),
        )
    } else {
        (" Filter (/ to search) ", Style::default().fg(Color::DarkGray))
    };

    let cursor = if is_search_mode { "█" } else { "" };
    let text = format!("{}{}", app.list.filter(), cursor);

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style),
        );
    f.render_widget(paragraph, area);
}

pub fn draw_hosts_list(f: &mut Frame, app: &App, area: Rect) {
    let title = format!(" SSH Hosts - {} ", env!("CARGO_PKG_VERSION"));
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::Indexed(39))
                .bg(Color::Indexed(236))
                .add_modifier(Modifier::BOLD),
        );

    let list = &app.list;
    let offset = list.offset();
    let items: Vec<ListItem> = list
        .visible()
        .enumerate()
        .skip(offset)
        .take(list.page_size())
        .map(|(i, host)| {
            let is_selected = list.cursor() == Some(i);

            let (bar, title_style, desc_style) = if is_selected {
                (
                    Span::styled("│ ", Style::default().fg(SELECTED)),
                    Style::default().fg(SELECTED).add_modifier(Modifier::BOLD),
                    Style::default().fg(Color::Indexed(240)),
                )
            } else {
                (
                    Span::raw("  "),
                    Style::default()
                        .fg(Color::Indexed(39))
                        .add_modifier(Modifier::BOLD),
                    Style::default().fg(Color::Indexed(246)),
                )
            };

            ListItem::new(vec![
                Line::from(vec![bar.clone(), Span::styled(host.title().to_string(), title_style)]),
                Line::from(vec![bar, Span::styled(host.description(), desc_style)]),
            ])
        })
        .collect();

    let list_widget = if items.is_empty() {
        let message = if list.filter().is_empty() {
            "No hosts found in SSH config".to_string()
        } else {
            format!("No results for '{}'", list.filter())
        };
        List::new(vec![ListItem::new(Span::styled(
            message,
            Style::default().fg(Color::Gray),
        ))])
    } else {
        List::new(items)
    };

    f.render_widget(list_widget.block(block), area);
}
