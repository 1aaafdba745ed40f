/// Applied in order on every start; each statement is idempotent.
pub const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS photos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        storage_path TEXT NOT NULL UNIQUE,
        created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
    );",
    "CREATE TABLE IF NOT EXISTS user_photo_scores (
        user_id TEXT NOT NULL,
        photo_id INTEGER NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
        wealth_score INTEGER NOT NULL CHECK (wealth_score BETWEEN 0 AND 10),
        wealth_rationale TEXT,
        relevance_score INTEGER NOT NULL CHECK (relevance_score BETWEEN 0 AND 10),
        relevance_rationale TEXT,
        updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        PRIMARY KEY (user_id, photo_id)
    );",
    "CREATE INDEX IF NOT EXISTS idx_user_photo_scores_photo ON user_photo_scores(photo_id);",
];
