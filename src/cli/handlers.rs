use anyhow::{bail, Result};
use rusqlite::Connection;
use serde::Serialize;

use crate::config::settings::AdminAccess;
use crate::config::AppConfig;
use crate::db::repository::{HatimRepo, ProgressRepo, StatsRepo};
use crate::db::SqliteStore;
use crate::identity::{self, FileIdentityCache};
use crate::models::stats::TopUser;
use crate::models::user::display_name;
use crate::models::{AdminStats, Hatim, PersonalStats, User, UserProgress, JUZ_COUNT};
use crate::tracker::{self, UpdateOutcome};
use crate::utils::format::{fit_width, format_days, format_optional, format_timestamp, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

// ─── Mark / unmark ───────────────────────────────────────────────────────────

pub fn handle_mark(conn: &Connection, user: &User, juz: u32, completed: bool) -> Result<()> {
    let store = SqliteStore::new(conn);
    let update = tracker::set_juz_completion(&store, &user.id, juz, completed)?;
    let p = &update.progress;

    match &update.outcome {
        UpdateOutcome::Unchanged => {
            let state = if completed { "read" } else { "unread" };
            println_colored!(DIM, "  Juz {} is already marked {}", juz, state);
        }
        UpdateOutcome::Updated if completed => {
            println_colored!(GREEN, "  ✓ Juz {} marked as read", juz);
        }
        UpdateOutcome::Updated => {
            println_colored!(DIM, "  ○ Juz {} marked as unread", juz);
        }
        UpdateOutcome::HatimCompleted { .. } => {
            println_colored!(GREEN, "  ✓ Juz {} marked as read", juz);
            println!();
            println_colored!(
                GOLD,
                "  ✦ Hatim complete! MashaAllah, that makes {} in total.",
                p.completed_hatims
            );
        }
    }

    println_colored!(
        DIM,
        "  {}  {}/{} juz",
        progress_bar(p.total_completed, JUZ_COUNT, 30),
        p.total_completed,
        JUZ_COUNT
    );
    Ok(())
}

// ─── Personal progress ───────────────────────────────────────────────────────

pub fn handle_progress(conn: &Connection, user: &User) -> Result<()> {
    let store = SqliteStore::new(conn);
    let progress = tracker::load_progress(&store, &user.id)?;
    let stats = PersonalStats::from_progress(&progress);

    println!();
    println_colored!(GOLD, "  Your Progress — {}", user.display_name());
    println!();
    print_grid(&progress);
    println!();

    println_colored!(
        BOLD,
        "  {}  {}%  ({}/{} juz)",
        progress_bar(progress.total_completed, JUZ_COUNT, 30),
        stats.percent,
        progress.total_completed,
        JUZ_COUNT
    );
    println!();
    println!("  Hatims completed:  {}", progress.completed_hatims);
    println!("  Remaining juz:     {}", stats.remaining);
    if let Some(next) = stats.next_juz {
        println!("  Next juz:          {}", next);
    }
    println!(
        "  First completion:  {}",
        format_optional(stats.first_completed.as_ref())
    );
    println!(
        "  Last completion:   {}",
        format_optional(stats.last_completed.as_ref())
    );
    match stats.avg_days_between {
        Some(days) => println!("  Average pace:      {} per juz", format_days(days)),
        None => println_colored!(DIM, "  Average pace:      needs two or more completed juz"),
    }
    println!();
    println_colored!(GOLD, "  Completed Juz");
    println!();
    if stats.completed.is_empty() {
        println_colored!(DIM, "  No juz completed yet");
    }
    for j in &stats.completed {
        println!(
            "  Juz {:>2}   {}",
            j.juz_id,
            format_optional(j.completed_at.as_ref())
        );
    }
    println!();
    Ok(())
}

fn print_grid(progress: &UserProgress) {
    for row in progress.juz.chunks(6) {
        print!("  ");
        for j in row {
            if j.completed {
                print!("{}● {:>2}\x1b[0m   ", GREEN, j.juz_id);
            } else {
                print!("{}○ {:>2}\x1b[0m   ", DIM, j.juz_id);
            }
        }
        println!();
    }
}

// ─── Global stats ────────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, config: &AppConfig) -> Result<()> {
    let stats = StatsRepo::global_stats_or_default(conn, config.display.recent_hatims);

    println!();
    println_colored!(GOLD, "  Community");
    println!();
    println!("  Readers:        {}", stats.total_users);
    println!("  Juz completed:  {}", stats.total_completed_juz);
    println!("  Hatims:         {}", stats.total_hatims);
    println!();
    println_colored!(GOLD, "  Recent Hatims");
    println!();
    print_recent(&stats.recent_hatims);
    println!();
    Ok(())
}

fn print_recent(hatims: &[Hatim]) {
    if hatims.is_empty() {
        println_colored!(DIM, "  No hatims completed yet");
        return;
    }
    for h in hatims {
        println!(
            "  {}  {}",
            fit_width(display_name(h.username.as_deref()), 24),
            format_timestamp(&h.completed_at)
        );
    }
}

// ─── Admin ───────────────────────────────────────────────────────────────────

pub fn handle_admin(conn: &Connection, config: &AppConfig, passphrase: &str) -> Result<()> {
    match config.admin.verify(passphrase) {
        AdminAccess::Granted => {}
        AdminAccess::Denied => bail!("Wrong passphrase"),
        AdminAccess::Disabled => bail!(
            "Admin view is disabled. Set `passphrase` under [admin] in {:?}",
            AppConfig::config_path()?
        ),
    }

    let all = ProgressRepo::list_all(conn)?;
    let stats = AdminStats::from_progress(&all, config.display.leaderboard_size);

    println!();
    println_colored!(GOLD, "  Admin Overview");
    println!();
    println!("  Readers:        {}", stats.total_users);
    println!("  Juz completed:  {}", stats.total_completed_juz);
    println!("  Hatims:         {}", stats.total_hatims);
    println!();
    println_colored!(GOLD, "  Top Readers");
    println!();

    if stats.top_users.is_empty() {
        println_colored!(DIM, "  Nobody has started yet");
    }
    for (rank, u) in stats.top_users.iter().enumerate() {
        print_reader(&format!("{:>2}. ", rank + 1), u);
    }
    println!();
    println_colored!(GOLD, "  All Readers");
    println!();
    if stats.readers.is_empty() {
        println_colored!(DIM, "  No readers yet");
    }
    for u in &stats.readers {
        print_reader("", u);
    }
    println!();
    Ok(())
}

fn print_reader(prefix: &str, u: &TopUser) {
    let line = format!(
        "  {}{}  {:>2}/{} juz  {} hatim{}",
        prefix,
        fit_width(display_name(u.username.as_deref()), 24),
        u.completed_count,
        JUZ_COUNT,
        u.hatim_count,
        if u.hatim_count == 1 { "" } else { "s" }
    );
    if u.completed_count == JUZ_COUNT {
        println_colored!(GREEN, "{}", line);
    } else if u.completed_count > 0 {
        println_colored!(AMBER, "{}", line);
    } else {
        println_colored!(DIM, "{}", line);
    }
}

// ─── Identity ────────────────────────────────────────────────────────────────

pub fn handle_name(conn: &Connection, cache: &FileIdentityCache, name: &str) -> Result<()> {
    let user = identity::rename(cache, conn, name)?;
    println_colored!(GREEN, "  ✓ You will appear as {}", user.display_name());
    Ok(())
}

pub fn handle_whoami(user: &User, cache: &FileIdentityCache) -> Result<()> {
    println!();
    println_colored!(GOLD, "  {}", user.display_name());
    println!("  Id:           {}", user.id);
    println!("  Since:        {}", format_timestamp(&user.created_at));
    println!("  Last active:  {}", format_timestamp(&user.last_active));
    println_colored!(DIM, "  Stored in {:?}", cache.path());
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ProgressExport {
    user: User,
    progress: UserProgress,
    hatims: Vec<Hatim>,
}

pub fn handle_export(conn: &Connection, user: &User) -> Result<()> {
    let store = SqliteStore::new(conn);
    let export = ProgressExport {
        user: user.clone(),
        progress: tracker::load_progress(&store, &user.id)?,
        hatims: HatimRepo::for_user(conn, &user.id)?,
    };
    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}
