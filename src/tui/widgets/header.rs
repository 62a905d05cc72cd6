use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, display_name: &str, date_str: &str) {
    let title_line = Line::from(vec![
        Span::styled("  خَتْم  ", theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled("hatim", theme::gold()),
    ]);

    let info_line = Line::from(vec![
        Span::styled(display_name, theme::amber()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(date_str, theme::dim()),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(vec![title_line, Line::from(""), info_line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
