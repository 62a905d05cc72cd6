use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::user::display_name;
use crate::models::GlobalStats;
use crate::tui::theme;
use crate::utils::format::fit_width;

pub fn render(frame: &mut Frame, area: Rect, stats: &GlobalStats) {
    let block = Block::default()
        .title(Span::styled(" Community ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Readers        ", theme::dim()),
            Span::styled(format!("{}", stats.total_users), theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("  Juz read       ", theme::dim()),
            Span::styled(format!("{}", stats.total_completed_juz), theme::green()),
        ]),
        Line::from(vec![
            Span::styled("  Hatims         ", theme::dim()),
            Span::styled(
                format!("{}", stats.total_hatims),
                theme::gold().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Recent hatims", theme::gold())),
    ];

    if stats.recent_hatims.is_empty() {
        lines.push(Line::from(Span::styled("  None yet. Be the first!", theme::dim())));
    }

    let name_width = (area.width.saturating_sub(20) as usize).clamp(8, 20);
    for h in &stats.recent_hatims {
        lines.push(Line::from(vec![
            Span::styled("  ✦ ", theme::gold()),
            Span::styled(fit_width(display_name(h.username.as_deref()), name_width), theme::bold()),
            Span::styled(
                format!(" {}", h.completed_at.with_timezone(&chrono::Local).format("%b %d")),
                theme::dim(),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
