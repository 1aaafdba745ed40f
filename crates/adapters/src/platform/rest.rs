use art_survey_application::{ApplicationError, AuthSession, PhotoCatalog, RatingStore};
use art_survey_domain::{Photo, Rating, StoragePath};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::PlatformClient;

pub(crate) const NEXT_PHOTO_PROCEDURE: &str = "rest/v1/rpc/next_photo_for_user";
pub(crate) const SCORES_TABLE: &str = "rest/v1/user_photo_scores";
pub(crate) const PHOTOS_TABLE: &str = "rest/v1/photos";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=minimal";

#[derive(Debug, Serialize)]
struct PhotoRow<'a> {
    storage_path: &'a str,
}

/// Procedures may answer with a row set, a single row or null.
pub(crate) fn parse_next_photo(body: Value) -> Result<Option<Photo>, ApplicationError> {
    let row = match body {
        Value::Null => return Ok(None),
        Value::Array(rows) => match rows.into_iter().next() {
            Some(row) => row,
            None => return Ok(None),
        },
        row => row,
    };
    if row.is_null() {
        return Ok(None);
    }
    serde_json::from_value(row)
        .map(Some)
        .map_err(|error| ApplicationError::Remote(format!("unexpected photo row: {error}")))
}

impl RatingStore for PlatformClient {
    fn next_eligible_photo(
        &self,
        session: &AuthSession,
        max_raters: u32,
    ) -> Result<Option<Photo>, ApplicationError> {
        debug!(user = %session.user_id, max_raters, "next eligible photo");
        let body: Value = self.send_json(
            self.request(Method::POST, NEXT_PHOTO_PROCEDURE, Some(&session.access_token))
                .json(&json!({
                    "p_user_id": session.user_id,
                    "p_max_raters": max_raters,
                })),
        )?;
        parse_next_photo(body)
    }

    fn upsert_rating(
        &self,
        session: &AuthSession,
        rating: &Rating,
    ) -> Result<(), ApplicationError> {
        debug!(photo = %rating.photo_id, "upsert rating");
        self.send(
            self.request(Method::POST, SCORES_TABLE, Some(&session.access_token))
                .query(&[("on_conflict", "user_id,photo_id")])
                .header("Prefer", MERGE_DUPLICATES)
                .json(&[rating]),
        )?;
        Ok(())
    }
}

impl PhotoCatalog for PlatformClient {
    fn upsert_photo_paths(&self, paths: &[StoragePath]) -> Result<usize, ApplicationError> {
        if paths.is_empty() {
            return Ok(0);
        }
        let rows: Vec<PhotoRow<'_>> = paths
            .iter()
            .map(|path| PhotoRow {
                storage_path: path.as_str(),
            })
            .collect();
        self.send(
            self.request(Method::POST, PHOTOS_TABLE, None)
                .query(&[("on_conflict", "storage_path")])
                .header("Prefer", MERGE_DUPLICATES)
                .json(&rows),
        )?;
        Ok(rows.len())
    }
}
