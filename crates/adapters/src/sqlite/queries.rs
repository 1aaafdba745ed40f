use art_survey_domain::Rating;
use rusqlite::{params, Connection, OptionalExtension, Result};

pub fn insert_photo_path(conn: &Connection, storage_path: &str) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO photos (storage_path) VALUES (?1)",
        params![storage_path],
    )?;
    Ok(inserted == 1)
}

pub fn count_photos(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))
}

/// Oldest photo the user has not rated that is still under the rater cap.
pub fn next_eligible_photo(
    conn: &Connection,
    user_id: &str,
    max_raters: u32,
) -> Result<Option<(i64, String)>> {
    conn.query_row(
        "SELECT p.id, p.storage_path
         FROM photos p
         WHERE NOT EXISTS (
             SELECT 1 FROM user_photo_scores s
             WHERE s.photo_id = p.id AND s.user_id = ?1
         )
         AND (
             SELECT COUNT(*) FROM user_photo_scores s WHERE s.photo_id = p.id
         ) < ?2
         ORDER BY p.id
         LIMIT 1",
        params![user_id, max_raters],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn upsert_rating(conn: &Connection, photo_id: i64, rating: &Rating) -> Result<()> {
    conn.execute(
        "INSERT INTO user_photo_scores
            (user_id, photo_id, wealth_score, wealth_rationale, relevance_score, relevance_rationale)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(user_id, photo_id) DO UPDATE SET
            wealth_score = excluded.wealth_score,
            wealth_rationale = excluded.wealth_rationale,
            relevance_score = excluded.relevance_score,
            relevance_rationale = excluded.relevance_rationale,
            updated_at = CAST(strftime('%s', 'now') AS INTEGER)",
        params![
            rating.user_id.as_str(),
            photo_id,
            rating.wealth_score.get(),
            rating.wealth_rationale,
            rating.relevance_score.get(),
            rating.relevance_rationale,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
pub struct StoredScores {
    pub wealth_score: i64,
    pub wealth_rationale: Option<String>,
    pub relevance_score: i64,
    pub relevance_rationale: Option<String>,
}

#[cfg(test)]
pub fn find_rating(conn: &Connection, user_id: &str, photo_id: i64) -> Result<Option<StoredScores>> {
    conn.query_row(
        "SELECT wealth_score, wealth_rationale, relevance_score, relevance_rationale
         FROM user_photo_scores
         WHERE user_id = ?1 AND photo_id = ?2",
        params![user_id, photo_id],
        |row| {
            Ok(StoredScores {
                wealth_score: row.get(0)?,
                wealth_rationale: row.get(1)?,
                relevance_score: row.get(2)?,
                relevance_rationale: row.get(3)?,
            })
        },
    )
    .optional()
}

pub fn count_ratings(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM user_photo_scores", [], |row| row.get(0))
}
