use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(14, 18, 16);
pub const SURFACE: Color = Color::Rgb(22, 28, 25);
pub const BORDER: Color = Color::Rgb(44, 58, 50);
pub const TEXT: Color = Color::Rgb(226, 222, 204);
pub const TEXT_DIM: Color = Color::Rgb(118, 128, 112);
pub const GOLD: Color = Color::Rgb(196, 160, 68);
pub const GREEN: Color = Color::Rgb(92, 158, 104);
pub const AMBER: Color = Color::Rgb(210, 138, 60);
pub const RED: Color = Color::Rgb(180, 82, 62);
pub const CELL_EMPTY: Color = Color::Rgb(34, 42, 37);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

/// Grid cell for a juz that has been read.
pub fn cell_done() -> Style {
    Style::default().fg(BG).bg(GREEN).add_modifier(Modifier::BOLD)
}

pub fn cell_open() -> Style {
    Style::default().fg(TEXT_DIM).bg(CELL_EMPTY)
}

/// Highlight for the cell under the cursor.
pub fn cell_focus(done: bool) -> Style {
    let bg = if done { GOLD } else { AMBER };
    Style::default().fg(BG).bg(bg).add_modifier(Modifier::BOLD)
}
