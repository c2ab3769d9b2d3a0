// src/repositories/film_repository.rs
//
// Film persistence
//
// bind_enrichment is the only path that writes a catalog id onto a film. It
// re-runs the collision guard and performs the update inside one IMMEDIATE
// transaction, so guard and bind form a single atomic unit even when several
// resolvers share the database.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, ErrorCode, OptionalExtension, Row, TransactionBehavior};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::ConnectionPool;
use crate::domain::{
    check_collision, ExternalId, Film, FilmEnrichment, FilmRef, NamedCount, YearCount,
};
use crate::error::{AppError, AppResult};

const FILM_COLUMNS: &str = "id, letterboxd_uri, title, year, tmdb_id, directors, actors,
     actor_profile_paths, poster_path, backdrop_path, runtime, genres, release_date,
     created_at, updated_at";

/// Result of an attempt to bind a catalog id onto a film
#[derive(Debug, Clone, PartialEq)]
pub enum BindOutcome {
    Bound,
    /// The id is held by another film; nothing was written
    Collision(FilmRef),
}

#[cfg_attr(test, mockall::automock)]
pub trait FilmRepository: Send + Sync {
    /// Insert or update by id
    fn save(&self, film: &Film) -> AppResult<()>;
    fn get_by_id(&self, id: Uuid) -> AppResult<Option<Film>>;
    fn get_by_uri(&self, letterboxd_uri: &str) -> AppResult<Option<Film>>;
    /// The film currently bound to `tmdb_id`, if any
    fn find_by_tmdb_id(&self, tmdb_id: ExternalId) -> AppResult<Option<Film>>;
    /// Films missing a binding or core enrichment, oldest first
    fn list_pending(&self, limit: Option<usize>) -> AppResult<Vec<Film>>;
    fn list_all(&self) -> AppResult<Vec<Film>>;
    fn bind_enrichment(
        &self,
        film_id: Uuid,
        tmdb_id: ExternalId,
        enrichment: &FilmEnrichment,
    ) -> AppResult<BindOutcome>;
    /// Remove the catalog id and all enrichment from a film
    fn clear_binding(&self, film_id: Uuid) -> AppResult<()>;
    fn delete(&self, id: Uuid) -> AppResult<()>;

    // Reports

    /// Films per release year, ascending; films without a year are left out
    fn count_by_year(&self) -> AppResult<Vec<YearCount>>;
    /// Films per genre, most common first
    fn count_by_genre(&self) -> AppResult<Vec<NamedCount>>;
    fn top_directors(&self, limit: usize) -> AppResult<Vec<NamedCount>>;
    fn top_actors(&self, limit: usize) -> AppResult<Vec<NamedCount>>;
    /// Sum of known runtimes, in minutes
    fn total_runtime_minutes(&self) -> AppResult<u64>;
}

pub struct SqliteFilmRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteFilmRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map database row to Film - returns rusqlite::Error for query_map compatibility
    fn row_to_film(row: &Row) -> Result<Film, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let id = Uuid::parse_str(&id_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let runtime: Option<i64> = row.get("runtime")?;
        let release_date: Option<String> = row.get("release_date")?;
        let release_date = release_date
            .map(|s| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
            })
            .transpose()?;

        let enrichment = FilmEnrichment {
            directors: json_column(row, "directors")?,
            actors: json_column(row, "actors")?,
            actor_profile_paths: json_column(row, "actor_profile_paths")?,
            poster_path: row.get("poster_path")?,
            backdrop_path: row.get("backdrop_path")?,
            runtime: runtime.and_then(|r| u32::try_from(r).ok()),
            genres: json_column(row, "genres")?,
            release_date,
        };

        Ok(Film {
            id,
            letterboxd_uri: row.get("letterboxd_uri")?,
            title: row.get("title")?,
            year: row.get("year")?,
            tmdb_id: row.get::<_, Option<i64>>("tmdb_id")?.map(ExternalId),
            enrichment,
            created_at: timestamp_column(row, "created_at")?,
            updated_at: timestamp_column(row, "updated_at")?,
        })
    }

    fn find_by_tmdb_id_in(
        conn: &rusqlite::Connection,
        tmdb_id: ExternalId,
    ) -> AppResult<Option<Film>> {
        let film = conn
            .query_row(
                &format!("SELECT {} FROM films WHERE tmdb_id = ?1", FILM_COLUMNS),
                params![tmdb_id.value()],
                Self::row_to_film,
            )
            .optional()?;
        Ok(film)
    }

    /// A failed bind whose id is now held by another film is a collision,
    /// not an error. Anything else is reported as a write failure.
    fn bind_failure(
        conn: &rusqlite::Connection,
        film_id: Uuid,
        tmdb_id: ExternalId,
        err: rusqlite::Error,
    ) -> AppResult<BindOutcome> {
        let is_constraint = matches!(
            &err,
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
        );

        if is_constraint {
            if let Some(holder) = Self::find_by_tmdb_id_in(conn, tmdb_id)? {
                if holder.id != film_id {
                    log::warn!(
                        "Unique constraint caught TMDb {} already bound to {}",
                        tmdb_id,
                        holder.film_ref()
                    );
                    return Ok(BindOutcome::Collision(holder.film_ref()));
                }
            }
        }

        Err(map_write_error(err, "bind film"))
    }

    /// Count films per element of a JSON array column.
    ///
    /// `column` is one of the fixed list columns, never user input.
    fn count_json_values(&self, column: &str, limit: Option<usize>) -> AppResult<Vec<NamedCount>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT j.value AS name, COUNT(DISTINCT f.id) AS film_count
             FROM films AS f, json_each(f.{}) AS j
             WHERE j.type = 'text' AND TRIM(j.value) <> ''
             GROUP BY j.value
             ORDER BY film_count DESC, name ASC
             LIMIT ?1",
            column
        ))?;

        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let counts = stmt
            .query_map(params![limit], |row| {
                let count: i64 = row.get("film_count")?;
                Ok(NamedCount::new(row.get::<_, String>("name")?, count as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn get_by_id_in(conn: &rusqlite::Connection, id: Uuid) -> AppResult<Option<Film>> {
        let film = conn
            .query_row(
                &format!("SELECT {} FROM films WHERE id = ?1", FILM_COLUMNS),
                params![id.to_string()],
                Self::row_to_film,
            )
            .optional()?;
        Ok(film)
    }
}

fn json_column<T>(row: &Row, column: &str) -> Result<Option<T>, rusqlite::Error>
where
    T: serde::de::DeserializeOwned,
{
    let raw: Option<String> = row.get(column)?;
    raw.map(|s| {
        serde_json::from_str(&s).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
    })
    .transpose()
}

fn timestamp_column(row: &Row, column: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn to_json<T: serde::Serialize>(value: &Option<T>) -> AppResult<Option<String>> {
    value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(AppError::from)
}

/// Unique-constraint failures become Conflict; everything else stays Database
fn map_write_error(err: rusqlite::Error, context: &str) -> AppError {
    match &err {
        rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
            AppError::Conflict(format!(
                "{}: {}",
                context,
                msg.clone().unwrap_or_else(|| e.to_string())
            ))
        }
        _ => AppError::Database(err),
    }
}

impl FilmRepository for SqliteFilmRepository {
    fn save(&self, film: &Film) -> AppResult<()> {
        let conn = self.pool.get()?;
        let e = &film.enrichment;

        conn.execute(
            "INSERT INTO films (
                id, letterboxd_uri, title, year, tmdb_id, directors, actors,
                actor_profile_paths, poster_path, backdrop_path, runtime, genres,
                release_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT(id) DO UPDATE SET
                letterboxd_uri = excluded.letterboxd_uri,
                title = excluded.title,
                year = excluded.year,
                tmdb_id = excluded.tmdb_id,
                directors = excluded.directors,
                actors = excluded.actors,
                actor_profile_paths = excluded.actor_profile_paths,
                poster_path = excluded.poster_path,
                backdrop_path = excluded.backdrop_path,
                runtime = excluded.runtime,
                genres = excluded.genres,
                release_date = excluded.release_date,
                updated_at = excluded.updated_at",
            params![
                film.id.to_string(),
                film.letterboxd_uri,
                film.title,
                film.year,
                film.tmdb_id.map(|t| t.value()),
                to_json(&e.directors)?,
                to_json(&e.actors)?,
                to_json(&e.actor_profile_paths)?,
                e.poster_path,
                e.backdrop_path,
                e.runtime.map(i64::from),
                to_json(&e.genres)?,
                e.release_date.map(|d| d.format("%Y-%m-%d").to_string()),
                film.created_at.to_rfc3339(),
                film.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|err| map_write_error(err, "save film"))?;

        Ok(())
    }

    fn get_by_id(&self, id: Uuid) -> AppResult<Option<Film>> {
        let conn = self.pool.get()?;
        Self::get_by_id_in(&conn, id)
    }

    fn get_by_uri(&self, letterboxd_uri: &str) -> AppResult<Option<Film>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM films WHERE letterboxd_uri = ?1",
            FILM_COLUMNS
        ))?;

        match stmt.query_row(params![letterboxd_uri], Self::row_to_film) {
            Ok(film) => Ok(Some(film)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn find_by_tmdb_id(&self, tmdb_id: ExternalId) -> AppResult<Option<Film>> {
        let conn = self.pool.get()?;
        Self::find_by_tmdb_id_in(&conn, tmdb_id)
    }

    fn list_pending(&self, limit: Option<usize>) -> AppResult<Vec<Film>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM films
             WHERE tmdb_id IS NULL
                OR poster_path IS NULL
                OR actors IS NULL
                OR directors IS NULL
                OR actor_profile_paths IS NULL
             ORDER BY created_at, rowid
             LIMIT ?1",
            FILM_COLUMNS
        ))?;

        // negative LIMIT means unbounded in SQLite
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let films = stmt
            .query_map(params![limit], Self::row_to_film)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(films)
    }

    fn list_all(&self) -> AppResult<Vec<Film>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM films ORDER BY created_at, rowid",
            FILM_COLUMNS
        ))?;

        let films = stmt
            .query_map([], Self::row_to_film)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(films)
    }

    fn bind_enrichment(
        &self,
        film_id: Uuid,
        tmdb_id: ExternalId,
        enrichment: &FilmEnrichment,
    ) -> AppResult<BindOutcome> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let film = Self::get_by_id_in(&tx, film_id)?.ok_or(AppError::NotFound)?;

        if let Some(holder) =
            check_collision(tmdb_id, &film, |id| Self::find_by_tmdb_id_in(&tx, id))?
        {
            // dropping tx rolls back
            return Ok(BindOutcome::Collision(holder));
        }

        let written = tx.execute(
            "UPDATE films SET
                tmdb_id = ?2,
                directors = ?3,
                actors = ?4,
                actor_profile_paths = ?5,
                poster_path = ?6,
                backdrop_path = ?7,
                runtime = ?8,
                genres = ?9,
                release_date = ?10,
                updated_at = ?11
             WHERE id = ?1",
            params![
                film_id.to_string(),
                tmdb_id.value(),
                to_json(&enrichment.directors)?,
                to_json(&enrichment.actors)?,
                to_json(&enrichment.actor_profile_paths)?,
                enrichment.poster_path,
                enrichment.backdrop_path,
                enrichment.runtime.map(i64::from),
                to_json(&enrichment.genres)?,
                enrichment
                    .release_date
                    .map(|d| d.format("%Y-%m-%d").to_string()),
                Utc::now().to_rfc3339(),
            ],
        );

        if let Err(err) = written {
            return Self::bind_failure(&tx, film_id, tmdb_id, err);
        }

        tx.commit()?;
        Ok(BindOutcome::Bound)
    }

    fn clear_binding(&self, film_id: Uuid) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "UPDATE films SET
                tmdb_id = NULL, directors = NULL, actors = NULL, actor_profile_paths = NULL,
                poster_path = NULL, backdrop_path = NULL, runtime = NULL, genres = NULL,
                release_date = NULL, updated_at = ?2
             WHERE id = ?1",
            params![film_id.to_string(), Utc::now().to_rfc3339()],
        )?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    fn delete(&self, id: Uuid) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute("DELETE FROM films WHERE id = ?1", params![id.to_string()])?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    fn count_by_year(&self) -> AppResult<Vec<YearCount>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT year, COUNT(*) AS film_count
             FROM films
             WHERE year IS NOT NULL
             GROUP BY year
             ORDER BY year ASC",
        )?;

        let counts = stmt
            .query_map([], |row| {
                let count: i64 = row.get("film_count")?;
                Ok(YearCount {
                    year: row.get("year")?,
                    count: count as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn count_by_genre(&self) -> AppResult<Vec<NamedCount>> {
        self.count_json_values("genres", None)
    }

    fn top_directors(&self, limit: usize) -> AppResult<Vec<NamedCount>> {
        self.count_json_values("directors", Some(limit))
    }

    fn top_actors(&self, limit: usize) -> AppResult<Vec<NamedCount>> {
        self.count_json_values("actors", Some(limit))
    }

    fn total_runtime_minutes(&self) -> AppResult<u64> {
        let conn = self.pool.get()?;
        let minutes: i64 =
            conn.query_row("SELECT COALESCE(SUM(runtime), 0) FROM films", [], |row| row.get(0))?;
        Ok(minutes.max(0) as u64)
    }
}
