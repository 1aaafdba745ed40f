mod queries;

use std::fs;
use std::path::PathBuf;

use art_survey_application::{ApplicationError, AuthSession, PhotoCatalog, RatingStore};
use art_survey_domain::{Photo, PhotoId, Rating, StoragePath};
use rusqlite::Connection;
use tracing::debug;

use crate::migrations::MIGRATIONS;

/// Local stand-in for the hosted relational store.
#[derive(Debug, Clone)]
pub struct SqliteSurveyStore {
    path: PathBuf,
}

impl SqliteSurveyStore {
    pub fn new(path: String) -> Self {
        Self {
            path: PathBuf::from(path),
        }
    }

    pub fn initialize(&self) -> Result<(), ApplicationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "catalog path must not be empty".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|error| ApplicationError::Io(error.to_string()))?;
            }
        }

        let conn = self.open_connection()?;
        conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA journal_mode=WAL;")
            .map_err(persistence)?;

        for migration in MIGRATIONS {
            conn.execute_batch(migration).map_err(persistence)?;
        }

        Ok(())
    }

    pub fn photo_count(&self) -> Result<usize, ApplicationError> {
        let conn = self.open_connection()?;
        let count = queries::count_photos(&conn).map_err(persistence)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn rating_count(&self) -> Result<usize, ApplicationError> {
        let conn = self.open_connection()?;
        let count = queries::count_ratings(&conn).map_err(persistence)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    #[cfg(test)]
    pub fn find_rating(
        &self,
        user_id: &art_survey_domain::UserId,
        photo_id: &PhotoId,
    ) -> Result<Option<Rating>, ApplicationError> {
        let conn = self.open_connection()?;
        let Some(stored) =
            queries::find_rating(&conn, user_id.as_str(), row_id(photo_id)?).map_err(persistence)?
        else {
            return Ok(None);
        };
        Ok(Some(Rating {
            user_id: user_id.clone(),
            photo_id: photo_id.clone(),
            wealth_score: art_survey_domain::Score::new(stored.wealth_score)?,
            wealth_rationale: stored.wealth_rationale,
            relevance_score: art_survey_domain::Score::new(stored.relevance_score)?,
            relevance_rationale: stored.relevance_rationale,
        }))
    }

    fn open_connection(&self) -> Result<Connection, ApplicationError> {
        let conn = Connection::open(&self.path).map_err(persistence)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(persistence)?;
        Ok(conn)
    }
}

fn persistence(error: rusqlite::Error) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}

fn row_id(photo_id: &PhotoId) -> Result<i64, ApplicationError> {
    photo_id
        .as_str()
        .parse::<i64>()
        .map_err(|_| ApplicationError::NotFound(format!("photo id={photo_id}")))
}

impl PhotoCatalog for SqliteSurveyStore {
    fn upsert_photo_paths(&self, paths: &[StoragePath]) -> Result<usize, ApplicationError> {
        let mut conn = self.open_connection()?;
        let tx = conn.transaction().map_err(persistence)?;
        let mut inserted = 0;
        for path in paths {
            if queries::insert_photo_path(&tx, path.as_str()).map_err(persistence)? {
                inserted += 1;
            }
        }
        tx.commit().map_err(persistence)?;
        debug!(sent = paths.len(), inserted, "upserted photo paths");
        Ok(paths.len())
    }
}

impl RatingStore for SqliteSurveyStore {
    fn next_eligible_photo(
        &self,
        session: &AuthSession,
        max_raters: u32,
    ) -> Result<Option<Photo>, ApplicationError> {
        let conn = self.open_connection()?;
        let found = queries::next_eligible_photo(&conn, session.user_id.as_str(), max_raters)
            .map_err(persistence)?;
        found
            .map(|(id, storage_path)| -> Result<Photo, ApplicationError> {
                Ok(Photo {
                    id: PhotoId::new(id.to_string())?,
                    storage_path: StoragePath::new(storage_path)?,
                })
            })
            .transpose()
    }

    fn upsert_rating(
        &self,
        _session: &AuthSession,
        rating: &Rating,
    ) -> Result<(), ApplicationError> {
        let conn = self.open_connection()?;
        queries::upsert_rating(&conn, row_id(&rating.photo_id)?, rating).map_err(persistence)
    }
}

#[cfg(test)]
mod tests {
    use art_survey_domain::{Score, UserId};

    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> SqliteSurveyStore {
        let db_path = dir.path().join("survey.sqlite3");
        let store = SqliteSurveyStore::new(db_path.to_string_lossy().to_string());
        store.initialize().expect("initialize");
        store
    }

    fn auth(user: &str) -> AuthSession {
        AuthSession {
            access_token: "local".to_string(),
            refresh_token: None,
            user_id: UserId::new(user).expect("user"),
            email: None,
            expires_at: None,
        }
    }

    fn paths(values: &[&str]) -> Vec<StoragePath> {
        values
            .iter()
            .map(|value| StoragePath::new(*value).expect("path"))
            .collect()
    }

    fn rating(user: &str, photo: &Photo, wealth: i64, why: Option<&str>) -> Rating {
        Rating {
            user_id: UserId::new(user).expect("user"),
            photo_id: photo.id.clone(),
            wealth_score: Score::new(wealth).expect("score"),
            wealth_rationale: why.map(str::to_string),
            relevance_score: Score::new(0).expect("score"),
            relevance_rationale: None,
        }
    }

    #[test]
    fn initialize_creates_schema() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        let conn = Connection::open(dir.path().join("survey.sqlite3")).expect("open");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
                 AND name IN ('photos', 'user_photo_scores')",
                [],
                |row| row.get(0),
            )
            .expect("query");
        assert_eq!(count, 2);
        assert_eq!(store.photo_count().expect("count"), 0);
    }

    #[test]
    fn rerunning_path_upserts_does_not_duplicate() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        let batch = paths(&["a.jpg", "nyc/b.png"]);
        store.upsert_photo_paths(&batch).expect("first");
        store.upsert_photo_paths(&batch).expect("second");
        store
            .upsert_photo_paths(&paths(&["nyc/b.png", "c.gif"]))
            .expect("third");
        assert_eq!(store.photo_count().expect("count"), 3);
    }

    #[test]
    fn rating_upsert_keeps_latest() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        store.upsert_photo_paths(&paths(&["a.jpg"])).expect("paths");
        let photo = store
            .next_eligible_photo(&auth("u1"), 20)
            .expect("query")
            .expect("photo");

        store
            .upsert_rating(&auth("u1"), &rating("u1", &photo, 9, Some("gilded")))
            .expect("first");
        store
            .upsert_rating(&auth("u1"), &rating("u1", &photo, 5, None))
            .expect("second");

        assert_eq!(store.rating_count().expect("count"), 1);
        let stored = store
            .find_rating(&UserId::new("u1").expect("user"), &photo.id)
            .expect("find")
            .expect("exists");
        assert_eq!(stored.wealth_score.get(), 5);
        assert_eq!(stored.wealth_rationale, None);
    }

    #[test]
    fn eligibility_skips_rated_and_retired_photos() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        store
            .upsert_photo_paths(&paths(&["first.jpg", "second.jpg"]))
            .expect("paths");

        let first = store
            .next_eligible_photo(&auth("u1"), 2)
            .expect("query")
            .expect("photo");
        assert_eq!(first.storage_path.as_str(), "first.jpg");
        store
            .upsert_rating(&auth("u1"), &rating("u1", &first, 5, None))
            .expect("rate");

        let next = store
            .next_eligible_photo(&auth("u1"), 2)
            .expect("query")
            .expect("photo");
        assert_eq!(next.storage_path.as_str(), "second.jpg");

        store
            .upsert_rating(&auth("u2"), &rating("u2", &first, 5, None))
            .expect("rate");
        let for_third = store
            .next_eligible_photo(&auth("u3"), 2)
            .expect("query")
            .expect("photo");
        assert_eq!(for_third.storage_path.as_str(), "second.jpg");

        store
            .upsert_rating(&auth("u1"), &rating("u1", &next, 5, None))
            .expect("rate");
        assert_eq!(
            store.next_eligible_photo(&auth("u1"), 2).expect("query"),
            None
        );
    }

    #[test]
    fn rating_an_unknown_photo_fails() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        let ghost = Photo {
            id: PhotoId::new("42").expect("id"),
            storage_path: StoragePath::new("ghost.jpg").expect("path"),
        };
        assert!(matches!(
            store.upsert_rating(&auth("u1"), &rating("u1", &ghost, 5, None)),
            Err(ApplicationError::Persistence(_))
        ));
    }
}
