use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::JuzProgress;
use crate::tui::app::GRID_COLUMNS;
use crate::tui::theme;

/// Rows needed: borders, top padding, 5 cell rows and the gaps between them.
pub const HEIGHT: u16 = 12;

pub fn render(frame: &mut Frame, area: Rect, juz: &[JuzProgress], cursor: usize) {
    let done = juz.iter().filter(|j| j.completed).count();
    let block = Block::default()
        .title(Span::styled(format!(" Juz  {}/{} ", done, juz.len()), theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let mut lines = vec![Line::from("")];
    for (row_idx, row) in juz.chunks(GRID_COLUMNS).enumerate() {
        if row_idx > 0 {
            lines.push(Line::from(""));
        }
        let mut spans = vec![Span::raw("  ")];
        for (col, j) in row.iter().enumerate() {
            let idx = row_idx * GRID_COLUMNS + col;
            let style = if idx == cursor {
                theme::cell_focus(j.completed)
            } else if j.completed {
                theme::cell_done()
            } else {
                theme::cell_open()
            };
            let mark = if j.completed { '✓' } else { ' ' };
            spans.push(Span::styled(format!(" {:>2} {} ", j.juz_id, mark), style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
