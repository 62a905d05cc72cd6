use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{Result, TrackerError};
use crate::models::progress::{count_completed, is_well_formed};
use crate::models::{GlobalStats, Hatim, JuzProgress, User, UserProgress};

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// Fixed-width RFC 3339 so that text order in SQL matches time order.
pub fn ts_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn ts_from_sql(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ─── User repo ───────────────────────────────────────────────────────────────

pub struct UserRepo;

impl UserRepo {
    /// Insert the user unless a row with the same id already exists.
    /// Returns true when a row was created.
    pub fn insert(conn: &Connection, user: &User) -> Result<bool> {
        let inserted = conn.execute(
            "INSERT INTO users (id, username, created_at, last_active)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO NOTHING",
            params![
                user.id,
                user.username,
                ts_to_sql(&user.created_at),
                ts_to_sql(&user.last_active),
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn get(conn: &Connection, id: &str) -> Result<Option<User>> {
        conn.query_row(
            "SELECT id, username, created_at, last_active FROM users WHERE id = ?1",
            params![id],
            |row| {
                let created: String = row.get(2)?;
                let active: String = row.get(3)?;
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    created_at: ts_from_sql(2, &created)?,
                    last_active: ts_from_sql(3, &active)?,
                })
            },
        )
        .optional()
        .map_err(TrackerError::from)
    }

    pub fn touch(conn: &Connection, id: &str, at: &DateTime<Utc>) -> Result<bool> {
        let updated = conn.execute(
            "UPDATE users SET last_active = ?1 WHERE id = ?2",
            params![ts_to_sql(at), id],
        )?;
        Ok(updated > 0)
    }

    pub fn set_username(conn: &Connection, id: &str, username: Option<&str>) -> Result<bool> {
        let updated = conn.execute(
            "UPDATE users SET username = ?1 WHERE id = ?2",
            params![username, id],
        )?;
        Ok(updated > 0)
    }

    pub fn count(conn: &Connection) -> Result<u64> {
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

// ─── Progress repo ───────────────────────────────────────────────────────────

struct ProgressRow {
    user_id: String,
    username: Option<String>,
    juz_json: String,
    total_completed: i64,
    completed_hatims: i64,
    revision: i64,
}

const PROGRESS_SELECT: &str = "
    SELECT p.user_id, u.username, p.juz_progress, p.total_completed,
           p.completed_hatims, p.revision
    FROM user_progress p
    LEFT JOIN users u ON u.id = p.user_id";

fn read_progress_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProgressRow> {
    Ok(ProgressRow {
        user_id: row.get(0)?,
        username: row.get(1)?,
        juz_json: row.get(2)?,
        total_completed: row.get(3)?,
        completed_hatims: row.get(4)?,
        revision: row.get(5)?,
    })
}

fn decode_progress(row: ProgressRow) -> Result<UserProgress> {
    let juz: Vec<JuzProgress> = serde_json::from_str(&row.juz_json)
        .map_err(|e| TrackerError::Corrupt(format!("{}: {}", row.user_id, e)))?;
    if !is_well_formed(&juz) {
        return Err(TrackerError::Corrupt(format!(
            "{}: expected juz 1..=30 in order, found {} entries",
            row.user_id,
            juz.len()
        )));
    }
    let counted = count_completed(&juz);
    if i64::from(counted) != row.total_completed {
        return Err(TrackerError::Corrupt(format!(
            "{}: stored total {} but {} juz are marked",
            row.user_id, row.total_completed, counted
        )));
    }
    Ok(UserProgress {
        user_id: row.user_id,
        username: row.username,
        juz,
        total_completed: row.total_completed as u32,
        completed_hatims: row.completed_hatims as u32,
        revision: row.revision,
    })
}

pub struct ProgressRepo;

impl ProgressRepo {
    pub fn get(conn: &Connection, user_id: &str) -> Result<Option<UserProgress>> {
        let sql = format!("{} WHERE p.user_id = ?1", PROGRESS_SELECT);
        let row = conn
            .query_row(&sql, params![user_id], read_progress_row)
            .optional()?;
        row.map(decode_progress).transpose()
    }

    /// All records in insertion order.
    pub fn list_all(conn: &Connection) -> Result<Vec<UserProgress>> {
        let sql = format!("{} ORDER BY p.rowid", PROGRESS_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], read_progress_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(decode_progress).collect()
    }

    /// Create an empty record for the user if none exists and return the stored one.
    pub fn insert_fresh(conn: &Connection, user_id: &str) -> Result<UserProgress> {
        let fresh = UserProgress::new(user_id);
        let inserted = conn.execute(
            "INSERT INTO user_progress (user_id, juz_progress, total_completed, completed_hatims, revision)
             VALUES (?1, ?2, 0, 0, 0)
             ON CONFLICT(user_id) DO NOTHING",
            params![user_id, serde_json::to_string(&fresh.juz)?],
        )?;
        if inserted > 0 {
            debug!("initialized progress for {}", user_id);
        }
        Self::get(conn, user_id)?.ok_or_else(|| TrackerError::NotFound(user_id.to_string()))
    }

    /// Write the vector and counters if the stored revision still matches.
    /// Returns the new revision.
    pub fn update(
        conn: &Connection,
        user_id: &str,
        juz: &[JuzProgress],
        total_completed: u32,
        completed_hatims: u32,
        expected_revision: i64,
    ) -> Result<i64> {
        let updated = conn.execute(
            "UPDATE user_progress
             SET juz_progress = ?1, total_completed = ?2, completed_hatims = ?3,
                 revision = revision + 1
             WHERE user_id = ?4 AND revision = ?5",
            params![
                serde_json::to_string(juz)?,
                total_completed,
                completed_hatims,
                user_id,
                expected_revision,
            ],
        )?;

        if updated == 0 {
            return match Self::get(conn, user_id)? {
                Some(current) => {
                    warn!(
                        "revision mismatch for {}: expected {}, stored {}",
                        user_id, expected_revision, current.revision
                    );
                    Err(TrackerError::Conflict(user_id.to_string()))
                }
                None => Err(TrackerError::NotFound(user_id.to_string())),
            };
        }
        Ok(expected_revision + 1)
    }
}

// ─── Hatim repo ──────────────────────────────────────────────────────────────

fn read_hatim(row: &rusqlite::Row<'_>) -> rusqlite::Result<Hatim> {
    let completed: String = row.get(3)?;
    Ok(Hatim {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        completed_at: ts_from_sql(3, &completed)?,
    })
}

pub struct HatimRepo;

impl HatimRepo {
    /// Record a completed hatim. Returns the new event id.
    pub fn append(conn: &Connection, user_id: &str, at: &DateTime<Utc>) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO hatims (id, user_id, completed_at) VALUES (?1, ?2, ?3)",
            params![id, user_id, ts_to_sql(at)],
        )?;
        Ok(id)
    }

    /// Newest first; equal timestamps keep insertion order.
    pub fn recent(conn: &Connection, limit: usize) -> Result<Vec<Hatim>> {
        let mut stmt = conn.prepare(
            "SELECT h.id, h.user_id, u.username, h.completed_at
             FROM hatims h LEFT JOIN users u ON u.id = h.user_id
             ORDER BY h.completed_at DESC, h.seq ASC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], read_hatim)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(TrackerError::from)
    }

    pub fn for_user(conn: &Connection, user_id: &str) -> Result<Vec<Hatim>> {
        let mut stmt = conn.prepare(
            "SELECT h.id, h.user_id, u.username, h.completed_at
             FROM hatims h LEFT JOIN users u ON u.id = h.user_id
             WHERE h.user_id = ?1
             ORDER BY h.seq",
        )?;
        let rows = stmt.query_map(params![user_id], read_hatim)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(TrackerError::from)
    }
}

// ─── Stats repo ──────────────────────────────────────────────────────────────

pub struct StatsRepo;

impl StatsRepo {
    pub fn global_stats(conn: &Connection, recent_limit: usize) -> Result<GlobalStats> {
        let total_users = UserRepo::count(conn)?;
        let (juz, hatims): (i64, i64) = conn.query_row(
            "SELECT COALESCE(SUM(total_completed), 0), COALESCE(SUM(completed_hatims), 0)
             FROM user_progress",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let recent_hatims = HatimRepo::recent(conn, recent_limit)?;

        Ok(GlobalStats {
            total_users,
            total_completed_juz: juz as u64,
            total_hatims: hatims as u64,
            recent_hatims,
        })
    }

    /// Dashboards should still render when the store is unreadable.
    pub fn global_stats_or_default(conn: &Connection, recent_limit: usize) -> GlobalStats {
        Self::global_stats(conn, recent_limit).unwrap_or_else(|e| {
            warn!("could not load global stats: {}", e);
            GlobalStats::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use chrono::{Duration, TimeZone};

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap()
    }

    fn add_user(conn: &Connection, name: Option<&str>) -> User {
        let mut user = User::new(t0());
        user.username = name.map(str::to_string);
        UserRepo::insert(conn, &user).unwrap();
        user
    }

    #[test]
    fn user_insert_get_touch_rename() {
        let conn = open();
        let user = add_user(&conn, None);
        assert!(!UserRepo::insert(&conn, &user).unwrap());

        let later = t0() + Duration::hours(3);
        assert!(UserRepo::touch(&conn, &user.id, &later).unwrap());
        assert!(UserRepo::set_username(&conn, &user.id, Some("Aisha")).unwrap());

        let stored = UserRepo::get(&conn, &user.id).unwrap().unwrap();
        assert_eq!(stored.username.as_deref(), Some("Aisha"));
        assert_eq!(stored.created_at, t0());
        assert_eq!(stored.last_active, later);
        assert!(UserRepo::get(&conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn fresh_progress_joins_username() {
        let conn = open();
        let user = add_user(&conn, Some("Omar"));
        let p = ProgressRepo::insert_fresh(&conn, &user.id).unwrap();
        assert_eq!(p.username.as_deref(), Some("Omar"));
        assert_eq!(p.total_completed, 0);
        assert_eq!(p.revision, 0);

        // second call leaves the existing row alone
        let again = ProgressRepo::insert_fresh(&conn, &user.id).unwrap();
        assert_eq!(again, p);
    }

    #[test]
    fn update_bumps_revision_and_rejects_stale_writes() {
        let conn = open();
        let user = add_user(&conn, None);
        let mut p = ProgressRepo::insert_fresh(&conn, &user.id).unwrap();
        p.juz[0].completed = true;
        p.juz[0].completed_at = Some(t0());

        let rev = ProgressRepo::update(&conn, &user.id, &p.juz, 1, 0, p.revision).unwrap();
        assert_eq!(rev, 1);

        let stale = ProgressRepo::update(&conn, &user.id, &p.juz, 1, 0, 0);
        assert!(matches!(stale, Err(TrackerError::Conflict(_))));

        let missing = ProgressRepo::update(&conn, "ghost", &p.juz, 1, 0, 0);
        assert!(matches!(missing, Err(TrackerError::NotFound(_))));

        let stored = ProgressRepo::get(&conn, &user.id).unwrap().unwrap();
        assert_eq!(stored.total_completed, 1);
        assert_eq!(stored.juz[0].completed_at, Some(t0()));
        assert_eq!(stored.revision, 1);
    }

    #[test]
    fn corrupt_vector_is_reported() {
        let conn = open();
        let user = add_user(&conn, None);
        conn.execute(
            "INSERT INTO user_progress (user_id, juz_progress) VALUES (?1, '[]')",
            params![user.id],
        )
        .unwrap();
        let err = ProgressRepo::get(&conn, &user.id).unwrap_err();
        assert!(matches!(err, TrackerError::Corrupt(_)));
    }

    #[test]
    fn drifted_total_is_reported() {
        let conn = open();
        let user = add_user(&conn, None);
        let mut p = ProgressRepo::insert_fresh(&conn, &user.id).unwrap();
        p.juz[0].completed = true;
        p.juz[0].completed_at = Some(t0());
        // vector has one juz marked, cached total claims 29
        conn.execute(
            "UPDATE user_progress SET juz_progress = ?1, total_completed = 29 WHERE user_id = ?2",
            params![serde_json::to_string(&p.juz).unwrap(), user.id],
        )
        .unwrap();

        let err = ProgressRepo::get(&conn, &user.id).unwrap_err();
        assert!(matches!(err, TrackerError::Corrupt(_)));
        assert!(matches!(
            ProgressRepo::list_all(&conn),
            Err(TrackerError::Corrupt(_))
        ));
    }

    /// Store a record with the first `total` juz marked, each a day apart.
    fn seed_progress(conn: &Connection, user: &User, total: u32, hatims: u32) {
        let mut p = ProgressRepo::insert_fresh(conn, &user.id).unwrap();
        for (i, j) in p.juz.iter_mut().take(total as usize).enumerate() {
            j.completed = true;
            j.completed_at = Some(t0() + Duration::days(i as i64));
        }
        ProgressRepo::update(conn, &user.id, &p.juz, total, hatims, p.revision).unwrap();
    }

    #[test]
    fn global_stats_over_a_population() {
        let conn = open();
        let full = add_user(&conn, Some("Full"));
        let half = add_user(&conn, Some("Half"));
        let idle = add_user(&conn, None);
        seed_progress(&conn, &full, 30, 2);
        seed_progress(&conn, &half, 15, 1);
        seed_progress(&conn, &idle, 0, 0);

        let older = HatimRepo::append(&conn, &full.id, &t0()).unwrap();
        let middle = HatimRepo::append(&conn, &half.id, &(t0() + Duration::days(3))).unwrap();
        let newest = HatimRepo::append(&conn, &full.id, &(t0() + Duration::days(9))).unwrap();

        let stats = StatsRepo::global_stats(&conn, 5).unwrap();
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.total_completed_juz, 45);
        assert_eq!(stats.total_hatims, 3);

        let ids: Vec<&str> = stats.recent_hatims.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec![newest.as_str(), middle.as_str(), older.as_str()]);
        let names: Vec<Option<&str>> = stats
            .recent_hatims
            .iter()
            .map(|h| h.username.as_deref())
            .collect();
        assert_eq!(names, vec![Some("Full"), Some("Half"), Some("Full")]);

        let limited = StatsRepo::global_stats(&conn, 2).unwrap();
        assert_eq!(limited.recent_hatims.len(), 2);
        assert_eq!(limited.recent_hatims[0].id, newest);
    }

    #[test]
    fn recent_hatims_are_newest_first_with_stable_ties() {
        let conn = open();
        let a = add_user(&conn, Some("A"));
        let b = add_user(&conn, Some("B"));

        let first = HatimRepo::append(&conn, &a.id, &t0()).unwrap();
        let tie_1 = HatimRepo::append(&conn, &b.id, &(t0() + Duration::days(1))).unwrap();
        let tie_2 = HatimRepo::append(&conn, &a.id, &(t0() + Duration::days(1))).unwrap();
        let newest = HatimRepo::append(&conn, &b.id, &(t0() + Duration::days(2))).unwrap();

        let recent = HatimRepo::recent(&conn, 3).unwrap();
        let ids: Vec<&str> = recent.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec![newest.as_str(), tie_1.as_str(), tie_2.as_str()]);
        assert_eq!(recent[0].username.as_deref(), Some("B"));

        let mine = HatimRepo::for_user(&conn, &a.id).unwrap();
        let mine_ids: Vec<&str> = mine.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(mine_ids, vec![first.as_str(), tie_2.as_str()]);
    }

    #[test]
    fn global_stats_empty_population() {
        let conn = open();
        let stats = StatsRepo::global_stats(&conn, 5).unwrap();
        assert_eq!(stats, GlobalStats::default());
    }

    #[test]
    fn global_stats_or_default_survives_missing_tables() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(
            StatsRepo::global_stats_or_default(&conn, 5),
            GlobalStats::default()
        );
    }

    #[test]
    fn list_all_keeps_insertion_order() {
        let conn = open();
        let ids: Vec<String> = (0..3)
            .map(|_| {
                let u = add_user(&conn, None);
                ProgressRepo::insert_fresh(&conn, &u.id).unwrap();
                u.id
            })
            .collect();
        let listed: Vec<String> = ProgressRepo::list_all(&conn)
            .unwrap()
            .into_iter()
            .map(|p| p.user_id)
            .collect();
        assert_eq!(listed, ids);
    }
}
