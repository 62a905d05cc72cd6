use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::{Flash, FlashKind};
use crate::tui::theme;

/// Key hints, or the latest status message while one is showing.
pub fn render(frame: &mut Frame, area: Rect, flash: Option<&Flash>) {
    let line = match flash {
        Some(flash) => {
            let style = match flash.kind {
                FlashKind::Info => theme::dim(),
                FlashKind::Success => theme::green(),
                FlashKind::Celebration => theme::gold().add_modifier(Modifier::BOLD),
                FlashKind::Error => theme::red(),
            };
            Line::from(Span::styled(flash.text.as_str(), style))
        }
        None => {
            let hints = [
                ("[←↑↓→]", " move  "),
                ("[Enter]", " toggle  "),
                ("[n]", " next  "),
                ("[s]", " community  "),
                ("[?]", " help  "),
                ("[q]", " quit"),
            ];
            let mut spans = Vec::new();
            for (key, label) in hints {
                spans.push(Span::styled(key, theme::gold()));
                spans.push(Span::styled(label, theme::dim()));
            }
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
