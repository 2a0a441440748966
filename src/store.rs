use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::share::SharePayload;

/// The community feed keeps only the most recent highlights.
pub const HIGHLIGHT_CAP: usize = 50;

/// One shared training highlight as it appears on the community feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub session_id: String,
    pub fighter: String,
    pub power: u32,
    pub strikes: u32,
    pub combo: u32,
    pub mode: String,
    pub created_at: DateTime<Local>,
}

/// Database manager for community highlights and share links
#[derive(Debug)]
pub struct HighlightDb {
    conn: Connection,
}

impl HighlightDb {
    /// Initialize the database connection and create tables if needed
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("fighthype_highlights.db"));
        Self::open(&db_path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn with_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path.as_ref())
    }

    fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(db_path)?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS highlights (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                fighter TEXT NOT NULL,
                power INTEGER NOT NULL,
                strikes INTEGER NOT NULL,
                combo INTEGER NOT NULL,
                mode TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS share_links (
                share_id TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_highlights_created ON highlights(created_at)",
            [],
        )?;

        Ok(HighlightDb { conn })
    }

    /// Insert a highlight and trim the feed back to [`HIGHLIGHT_CAP`] rows,
    /// newest kept.
    pub fn save_highlight(&self, highlight: &Highlight) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO highlights (session_id, fighter, power, strikes, combo, mode, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                highlight.session_id,
                highlight.fighter,
                highlight.power,
                highlight.strikes,
                highlight.combo,
                highlight.mode,
                highlight.created_at.to_rfc3339(),
            ],
        )?;

        self.conn.execute(
            "DELETE FROM highlights WHERE id NOT IN \
             (SELECT id FROM highlights ORDER BY id DESC LIMIT ?1)",
            params![HIGHLIGHT_CAP as i64],
        )?;

        Ok(())
    }

    /// All stored highlights, newest first.
    pub fn highlights(&self) -> Result<Vec<Highlight>> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id, fighter, power, strikes, combo, mode, created_at \
             FROM highlights ORDER BY id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let created: String = row.get(6)?;
            let created_at = DateTime::parse_from_rfc3339(&created)
                .map(|dt| dt.with_timezone(&Local))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        6,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;

            Ok(Highlight {
                session_id: row.get(0)?,
                fighter: row.get(1)?,
                power: row.get(2)?,
                strikes: row.get(3)?,
                combo: row.get(4)?,
                mode: row.get(5)?,
                created_at,
            })
        })?;

        rows.collect()
    }

    pub fn save_share_link(&self, payload: &SharePayload) -> Result<()> {
        let json = serde_json::to_string(payload).map_err(|e| {
            rusqlite::Error::ToSqlConversionFailure(Box::new(e))
        })?;

        self.conn.execute(
            "INSERT OR REPLACE INTO share_links (share_id, payload, created_at) \
             VALUES (?1, ?2, ?3)",
            params![payload.id, json, Local::now().to_rfc3339()],
        )?;

        Ok(())
    }

    pub fn share_link(&self, share_id: &str) -> Result<Option<SharePayload>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM share_links WHERE share_id = ?1",
                params![share_id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => {
                let payload = serde_json::from_str(&json).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(Some(payload))
            }
            None => Ok(None),
        }
    }
}
