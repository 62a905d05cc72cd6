use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::JuzProgress;
use crate::tui::theme;
use crate::utils::format::format_optional;

/// Completed juz with the time each was marked, in juz order.
pub fn render(frame: &mut Frame, area: Rect, completed: &[JuzProgress]) {
    let block = Block::default()
        .title(Span::styled(" Completed ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let mut lines = vec![Line::from("")];
    if completed.is_empty() {
        lines.push(Line::from(Span::styled("  Nothing marked yet", theme::dim())));
    }
    for j in completed {
        lines.push(Line::from(vec![
            Span::styled(format!("  Juz {:>2}  ", j.juz_id), theme::green()),
            Span::styled(format_optional(j.completed_at.as_ref()), theme::dim()),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
