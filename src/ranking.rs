use chrono::{DateTime, Local};
use directories::ProjectDirs;
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

/// One row on the local leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingEntry {
    pub id: i64,
    pub nickname: String,
    pub score: u32,
    pub accuracy: u32,
    /// Chars per minute at session end.
    pub typing_speed: u32,
    pub created_at: DateTime<Local>,
}

/// Local score store. The engine never touches this; the results screen
/// submits and the ranking screen fetches.
#[derive(Debug)]
pub struct RankingDb {
    conn: Connection,
}

impl RankingDb {
    /// Open (or create) the store at its default location.
    pub fn new() -> Result<Self> {
        let db_path = Self::db_path().unwrap_or_else(|| PathBuf::from("kanatype_ranking.db"));

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::open(&db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS ranking (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nickname TEXT NOT NULL,
                score INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                typing_speed INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_ranking_score ON ranking(score)",
            [],
        )?;

        Ok(RankingDb { conn })
    }

    /// Database file under $HOME/.local/state/kanatype, falling back to the
    /// platform data dir.
    fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("kanatype");
            Some(state_dir.join("ranking.db"))
        } else {
            ProjectDirs::from("", "", "kanatype")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("ranking.db"))
        }
    }

    pub fn submit(
        &self,
        nickname: &str,
        score: u32,
        accuracy: u32,
        typing_speed: u32,
    ) -> Result<RankingEntry> {
        let nickname = match nickname.trim() {
            "" => "anonymous",
            trimmed => trimmed,
        };
        let created_at = Local::now();

        self.conn.execute(
            r#"
            INSERT INTO ranking (nickname, score, accuracy, typing_speed, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                nickname,
                score,
                accuracy,
                typing_speed,
                created_at.to_rfc3339()
            ],
        )?;

        Ok(RankingEntry {
            id: self.conn.last_insert_rowid(),
            nickname: nickname.to_string(),
            score,
            accuracy,
            typing_speed,
            created_at,
        })
    }

    /// Best scores first; ties go to the earlier submission.
    pub fn fetch_top(&self, n: usize) -> Result<Vec<RankingEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, nickname, score, accuracy, typing_speed, created_at
            FROM ranking
            ORDER BY score DESC, created_at ASC
            LIMIT ?1
            "#,
        )?;

        let entry_iter = stmt.query_map([n as i64], |row| {
            let created_str: String = row.get(5)?;
            let created_at = DateTime::parse_from_rfc3339(&created_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        5,
                        "created_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(RankingEntry {
                id: row.get(0)?,
                nickname: row.get(1)?,
                score: row.get(2)?,
                accuracy: row.get(3)?,
                typing_speed: row.get(4)?,
                created_at,
            })
        })?;

        let mut entries = Vec::new();
        for entry in entry_iter {
            entries.push(entry?);
        }

        Ok(entries)
    }
}
