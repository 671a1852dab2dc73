//! Config entry repository contract and SQLite implementation.
//!
//! # Invariants
//! - Lookups only see active entries.
//! - `team IS ?` comparisons treat `None` as the global scope.
//! - Writes address a team row the same way lookups do: exact spelling
//!   first, then a case-insensitive match. A new row keeps the caller's
//!   spelling.

use crate::model::config::{ConfigEntry, ConfigType, ConfigWrite};
use crate::repo::{parse_flag, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const CONFIG_SELECT_SQL: &str = "SELECT
    id,
    config_key,
    team,
    config_value,
    config_type,
    description,
    is_active,
    created_at,
    updated_at
FROM config_entries";

pub trait ConfigRepository {
    /// Active entry with exactly this key and team (`None` = global).
    fn find_active(&self, key: &str, team: Option<&str>) -> RepoResult<Option<ConfigEntry>>;
    /// Active entry with this key whose team matches ignoring case.
    fn find_active_team_ignore_case(&self, key: &str, team: &str)
        -> RepoResult<Option<ConfigEntry>>;
    /// Active global entries, plus entries of `team` when given.
    fn list_active(&self, team: Option<&str>) -> RepoResult<Vec<ConfigEntry>>;
    /// Inserts or replaces the entry for `(key, team)` and reactivates it.
    fn upsert(&self, key: &str, team: Option<&str>, write: &ConfigWrite)
        -> RepoResult<ConfigEntry>;
    fn deactivate(&self, key: &str, team: Option<&str>) -> RepoResult<()>;
}

pub struct SqliteConfigRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteConfigRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Team spelling of the stored row that `team` addresses for `key`.
    /// Active rows rank before inactive ones, exact spelling before a
    /// case-insensitive match.
    fn stored_team(&self, key: &str, team: Option<&str>) -> RepoResult<Option<String>> {
        let Some(team) = team else {
            return Ok(None);
        };
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT team
                 FROM config_entries
                 WHERE config_key = ?1
                   AND team = ?2 COLLATE NOCASE
                 ORDER BY is_active DESC, team = ?2 DESC, id ASC
                 LIMIT 1;",
                params![key, team],
                |row| row.get(0),
            )
            .optional()?;
        Ok(Some(stored.unwrap_or_else(|| team.to_string())))
    }
}

impl ConfigRepository for SqliteConfigRepository<'_> {
    fn find_active(&self, key: &str, team: Option<&str>) -> RepoResult<Option<ConfigEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!(
                    "{CONFIG_SELECT_SQL}
                     WHERE config_key = ?1
                       AND team IS ?2
                       AND is_active = 1
                     LIMIT 1;"
                ),
                params![key, team],
                |row| Ok(read_raw_row(row)),
            )
            .optional()?;
        entry.transpose()
    }

    fn find_active_team_ignore_case(
        &self,
        key: &str,
        team: &str,
    ) -> RepoResult<Option<ConfigEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!(
                    "{CONFIG_SELECT_SQL}
                     WHERE config_key = ?1
                       AND team = ?2 COLLATE NOCASE
                       AND is_active = 1
                     ORDER BY id ASC
                     LIMIT 1;"
                ),
                params![key, team],
                |row| Ok(read_raw_row(row)),
            )
            .optional()?;
        entry.transpose()
    }

    fn list_active(&self, team: Option<&str>) -> RepoResult<Vec<ConfigEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONFIG_SELECT_SQL}
             WHERE is_active = 1
               AND (team IS NULL OR (?1 IS NOT NULL AND team = ?1 COLLATE NOCASE))
             ORDER BY config_key ASC, team IS NOT NULL ASC, team ASC;"
        ))?;
        let mut rows = stmt.query([team])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(read_raw_row(row)?);
        }
        Ok(entries)
    }

    fn upsert(
        &self,
        key: &str,
        team: Option<&str>,
        write: &ConfigWrite,
    ) -> RepoResult<ConfigEntry> {
        let stored_team = self.stored_team(key, team)?;
        let team = stored_team.as_deref();
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE config_entries
             SET
                config_value = ?3,
                config_type = ?4,
                description = COALESCE(?5, description),
                is_active = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE config_key = ?1
               AND team IS ?2;",
            params![
                key,
                team,
                write.value.as_str(),
                write.config_type.as_str(),
                write.description.as_deref(),
            ],
        )?;
        if changed == 0 {
            tx.execute(
                "INSERT INTO config_entries (
                    config_key,
                    team,
                    config_value,
                    config_type,
                    description
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    key,
                    team,
                    write.value.as_str(),
                    write.config_type.as_str(),
                    write.description.as_deref(),
                ],
            )?;
        }
        tx.commit()?;

        self.find_active(key, team)?.ok_or_else(|| {
            RepoError::InvalidData(format!("config entry `{key}` missing after upsert"))
        })
    }

    fn deactivate(&self, key: &str, team: Option<&str>) -> RepoResult<()> {
        let stored_team = self.stored_team(key, team)?;
        let team = stored_team.as_deref();
        let changed = self.conn.execute(
            "UPDATE config_entries
             SET
                is_active = 0,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE config_key = ?1
               AND team IS ?2
               AND is_active = 1;",
            params![key, team],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "config entry",
                id: key.to_string(),
            });
        }
        Ok(())
    }
}

fn read_raw_row(row: &Row<'_>) -> RepoResult<ConfigEntry> {
    let type_text: String = row.get("config_type")?;
    Ok(ConfigEntry {
        id: row.get("id")?,
        config_key: row.get("config_key")?,
        team: row.get("team")?,
        config_value: row.get("config_value")?,
        config_type: ConfigType::from_db(&type_text),
        description: row.get("description")?,
        is_active: parse_flag(row.get("is_active")?, "config_entries.is_active")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
