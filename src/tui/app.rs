use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::StatsRepo;
use crate::db::SqliteStore;
use crate::models::user::display_name;
use crate::models::{GlobalStats, PersonalStats, User, UserProgress, JUZ_COUNT};
use crate::tracker::{self, UpdateOutcome};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{community, completed, header, juz_grid, progress, statusbar};
use crate::utils::format::{fit_width, format_timestamp};

/// Juz per row in the grid.
pub const GRID_COLUMNS: usize = 6;

/// Ticks a status message stays visible.
const FLASH_TICKS: u8 = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Community,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlashKind {
    Info,
    Success,
    Celebration,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub text: String,
    pub kind: FlashKind,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub user: User,
    pub cursor: usize,
    pub should_quit: bool,
    pub flash: Option<Flash>,
    flash_age: u8,

    // Cached state (refreshed after every action)
    pub today_str: String,
    pub progress: UserProgress,
    pub personal: PersonalStats,
    pub global: GlobalStats,
}

impl App {
    pub fn new(config: AppConfig, user: User) -> Self {
        let progress = UserProgress::new(&user.id);
        App {
            view: View::Dashboard,
            config,
            cursor: 0,
            should_quit: false,
            flash: None,
            flash_age: 0,
            today_str: Local::now().format("%A, %b %d, %Y").to_string(),
            personal: PersonalStats::from_progress(&progress),
            progress,
            global: GlobalStats::default(),
            user,
        }
    }

    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        let store = SqliteStore::new(conn);
        self.set_progress(tracker::load_progress(&store, &self.user.id)?);
        self.global = StatsRepo::global_stats_or_default(conn, self.config.display.recent_hatims);
        if let Some(name) = &self.progress.username {
            self.user.username = Some(name.clone());
        }
        Ok(())
    }

    fn set_progress(&mut self, progress: UserProgress) {
        self.personal = PersonalStats::from_progress(&progress);
        self.progress = progress;
    }

    pub fn tick(&mut self) {
        if self.flash.is_some() {
            self.flash_age += 1;
            if self.flash_age >= FLASH_TICKS {
                self.flash = None;
            }
        }
        self.today_str = Local::now().format("%A, %b %d, %Y").to_string();
    }

    fn show(&mut self, kind: FlashKind, text: impl Into<String>) {
        self.flash = Some(Flash {
            text: text.into(),
            kind,
        });
        self.flash_age = 0;
    }

    pub fn focused_juz(&self) -> u32 {
        self.cursor as u32 + 1
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        // Only handle actual key presses; some terminals also report release/repeat
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.view {
            View::Dashboard => self.handle_dashboard_key(key, conn),
            View::Community => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('q')) {
                    self.view = View::Dashboard;
                }
            }
            View::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.view = View::Dashboard;
                }
            }
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, conn: &Connection) {
        let last = JUZ_COUNT as usize - 1;
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('s') => {
                self.view = View::Community;
            }
            KeyCode::Char('r') => match self.load(conn) {
                Ok(()) => self.show(FlashKind::Info, "Refreshed"),
                Err(e) => self.show(FlashKind::Error, format!("Refresh failed: {}", e)),
            },
            KeyCode::Left | KeyCode::Char('h') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.cursor = (self.cursor + 1).min(last);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.cursor >= GRID_COLUMNS {
                    self.cursor -= GRID_COLUMNS;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + GRID_COLUMNS <= last {
                    self.cursor += GRID_COLUMNS;
                }
            }
            KeyCode::Char('n') => {
                if let Some(next) = self.progress.next_incomplete() {
                    self.cursor = next as usize - 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.toggle_focused(conn);
            }
            _ => {}
        }
    }

    fn toggle_focused(&mut self, conn: &Connection) {
        let juz = self.focused_juz();
        let completed = !self.progress.is_completed(juz);
        let store = SqliteStore::new(conn);

        match tracker::set_juz_completion(&store, &self.user.id, juz, completed) {
            Ok(update) => {
                let hatims = update.progress.completed_hatims;
                self.set_progress(update.progress);
                self.global =
                    StatsRepo::global_stats_or_default(conn, self.config.display.recent_hatims);
                match update.outcome {
                    UpdateOutcome::HatimCompleted { .. } => self.show(
                        FlashKind::Celebration,
                        format!("✦ Hatim complete! MashaAllah, {} in total", hatims),
                    ),
                    UpdateOutcome::Updated if completed => {
                        self.show(FlashKind::Success, format!("✓ Juz {} read", juz))
                    }
                    UpdateOutcome::Updated => {
                        self.show(FlashKind::Info, format!("Juz {} unmarked", juz))
                    }
                    UpdateOutcome::Unchanged => {}
                }
            }
            Err(e) => self.show(FlashKind::Error, format!("✗ {}", e)),
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Community => self.draw_community(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer_chunks[0], self.user.display_name(), &self.today_str);
        statusbar::render(frame, outer_chunks[2], self.flash.as_ref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(juz_grid::HEIGHT), // grid
                Constraint::Min(0),                   // progress
            ])
            .split(columns[0]);

        juz_grid::render(frame, left_chunks[0], &self.progress.juz, self.cursor);
        progress::render(frame, left_chunks[1], &self.progress, &self.personal);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        community::render(frame, right_chunks[0], &self.global);
        completed::render(frame, right_chunks[1], &self.personal.completed);
    }

    fn draw_community(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Community  ", theme::gold().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Readers:         ", theme::dim()),
                Span::styled(format!("{}", self.global.total_users), theme::bold()),
            ]),
            Line::from(vec![
                Span::styled("  Juz completed:   ", theme::dim()),
                Span::styled(format!("{}", self.global.total_completed_juz), theme::green()),
            ]),
            Line::from(vec![
                Span::styled("  Hatims:          ", theme::dim()),
                Span::styled(
                    format!("{}", self.global.total_hatims),
                    theme::gold().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Your hatims:     ", theme::dim()),
                Span::styled(format!("{}", self.progress.completed_hatims), theme::amber()),
            ]),
            Line::from(""),
            Line::from(Span::styled("  Recent Hatims", theme::gold())),
            Line::from(""),
        ];

        if self.global.recent_hatims.is_empty() {
            lines.push(Line::from(Span::styled("  No hatims yet", theme::dim())));
        }
        for h in &self.global.recent_hatims {
            let mine = h.user_id == self.user.id;
            let name_style = if mine { theme::gold() } else { theme::bold() };
            lines.push(Line::from(vec![
                Span::styled("  ✦ ", theme::gold()),
                Span::styled(fit_width(display_name(h.username.as_deref()), 24), name_style),
                Span::styled(format!("  {}", format_timestamp(&h.completed_at)), theme::dim()),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).max(12).min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("  [← → ↑ ↓]    ", "Move between juz (or h j k l)"),
            ("  [Enter]      ", "Toggle focused juz"),
            ("  [n]          ", "Jump to next unread juz"),
            ("  [s]          ", "Community view"),
            ("  [r]          ", "Refresh"),
            ("  [?]          ", "Toggle help"),
            ("  [q] / Esc    ", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(key, theme::gold()),
                Span::styled(label, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig, user: User) -> Result<()> {
    let tick_rate = Duration::from_millis(config.tui.tick_rate_ms.max(50));
    let mut app = App::new(config, user);
    app.load(&conn)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(tick_rate);

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key, &conn);
                    if app.should_quit {
                        return Ok(());
                    }
                }
                Event::Resize => {}
                Event::Tick => app.tick(),
            }
        }
    })();

    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::repository::{HatimRepo, ProgressRepo, UserRepo};
    use crossterm::event::KeyModifiers;

    fn setup() -> (Connection, App) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let mut user = User::new(chrono::Utc::now());
        user.username = Some("Bilal".to_string());
        UserRepo::insert(&conn, &user).unwrap();
        let mut app = App::new(AppConfig::default(), user);
        app.load(&conn).unwrap();
        (conn, app)
    }

    fn press(app: &mut App, conn: &Connection, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), conn);
    }

    #[test]
    fn cursor_stays_inside_grid() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, KeyCode::Left);
        press(&mut app, &conn, KeyCode::Up);
        assert_eq!(app.cursor, 0);

        press(&mut app, &conn, KeyCode::Down);
        press(&mut app, &conn, KeyCode::Char('l'));
        assert_eq!(app.focused_juz(), 8);

        for _ in 0..10 {
            press(&mut app, &conn, KeyCode::Down);
            press(&mut app, &conn, KeyCode::Right);
        }
        assert_eq!(app.focused_juz(), 30);
        press(&mut app, &conn, KeyCode::Down);
        assert_eq!(app.focused_juz(), 30);
    }

    #[test]
    fn enter_toggles_focused_juz_in_store() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, KeyCode::Right);
        press(&mut app, &conn, KeyCode::Right);
        press(&mut app, &conn, KeyCode::Enter);

        assert!(app.progress.is_completed(3));
        assert_eq!(app.personal.percent, 3);
        let listed: Vec<u32> = app.personal.completed.iter().map(|j| j.juz_id).collect();
        assert_eq!(listed, vec![3]);
        assert!(app.personal.completed[0].completed_at.is_some());
        assert_eq!(app.global.total_completed_juz, 1);
        let stored = ProgressRepo::get(&conn, &app.user.id).unwrap().unwrap();
        assert!(stored.is_completed(3));
        assert_eq!(app.flash.as_ref().map(|f| &f.kind), Some(&FlashKind::Success));

        press(&mut app, &conn, KeyCode::Char(' '));
        assert!(!app.progress.is_completed(3));
        assert_eq!(app.progress.total_completed, 0);
        assert!(app.personal.completed.is_empty());
    }

    #[test]
    fn completing_every_juz_celebrates() {
        let (conn, mut app) = setup();
        for _ in 0..30 {
            press(&mut app, &conn, KeyCode::Char('n'));
            press(&mut app, &conn, KeyCode::Enter);
        }
        assert_eq!(app.progress.total_completed, 30);
        assert_eq!(app.progress.completed_hatims, 1);
        assert_eq!(
            app.flash.as_ref().map(|f| &f.kind),
            Some(&FlashKind::Celebration)
        );
        assert_eq!(app.global.recent_hatims.len(), 1);
        assert_eq!(HatimRepo::for_user(&conn, &app.user.id).unwrap().len(), 1);
    }

    #[test]
    fn flash_expires_after_ticks() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, KeyCode::Enter);
        assert!(app.flash.is_some());
        for _ in 0..FLASH_TICKS {
            app.tick();
        }
        assert!(app.flash.is_none());
    }

    #[test]
    fn views_and_quit() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, KeyCode::Char('s'));
        assert_eq!(app.view, View::Community);
        // grid keys are ignored outside the dashboard
        press(&mut app, &conn, KeyCode::Enter);
        assert_eq!(app.progress.total_completed, 0);
        press(&mut app, &conn, KeyCode::Esc);
        assert_eq!(app.view, View::Dashboard);

        press(&mut app, &conn, KeyCode::Char('?'));
        assert_eq!(app.view, View::Help);
        press(&mut app, &conn, KeyCode::Char('?'));
        press(&mut app, &conn, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn load_picks_up_username_from_store() {
        let (conn, mut app) = setup();
        UserRepo::set_username(&conn, &app.user.id, Some("Zaynab")).unwrap();
        press(&mut app, &conn, KeyCode::Char('r'));
        assert_eq!(app.user.display_name(), "Zaynab");
    }
}
