use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{PersonalStats, UserProgress, JUZ_COUNT};
use crate::tui::theme;
use crate::utils::format::{format_days, format_optional, progress_bar};

pub fn render(frame: &mut Frame, area: Rect, progress: &UserProgress, stats: &PersonalStats) {
    let block = Block::default()
        .title(Span::styled(" Progress ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let bar_width = (area.width.saturating_sub(14) as usize).min(30);
    let bar_style = if progress.total_completed == JUZ_COUNT {
        theme::gold()
    } else {
        theme::green()
    };

    let label = |text: &'static str| Span::styled(text, theme::dim());

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(progress_bar(progress.total_completed, JUZ_COUNT, bar_width), bar_style),
            Span::styled(
                format!("  {}%", stats.percent),
                theme::bold().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            label("  Hatims:        "),
            Span::styled(format!("{}", progress.completed_hatims), theme::gold()),
        ]),
        Line::from(vec![
            label("  Remaining:     "),
            Span::styled(format!("{} juz", stats.remaining), theme::amber()),
        ]),
    ];

    if let Some(next) = stats.next_juz {
        lines.push(Line::from(vec![
            label("  Next:          "),
            Span::styled(format!("Juz {}", next), theme::bold()),
        ]));
    }

    lines.push(Line::from(vec![
        label("  First read:    "),
        Span::styled(format_optional(stats.first_completed.as_ref()), theme::dim()),
    ]));
    lines.push(Line::from(vec![
        label("  Last read:     "),
        Span::styled(format_optional(stats.last_completed.as_ref()), theme::dim()),
    ]));
    lines.push(Line::from(vec![
        label("  Pace:          "),
        match stats.avg_days_between {
            Some(days) => Span::styled(format!("{} per juz", format_days(days)), theme::green()),
            None => Span::styled("—", theme::dim()),
        },
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
