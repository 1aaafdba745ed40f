use art_survey_domain::{Photo, Rating, StoragePath, UserId};

use crate::{ApplicationError, AuthSession, SignUpOutcome};

pub trait IdentityProvider {
    fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ApplicationError>;

    fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ApplicationError>;

    fn sign_out(&self, session: &AuthSession) -> Result<(), ApplicationError>;

    fn refresh(&self, refresh_token: &str) -> Result<AuthSession, ApplicationError>;

    fn current_user(&self, session: &AuthSession) -> Result<UserId, ApplicationError>;

    fn send_password_reset(&self, email: &str, redirect_url: &str)
        -> Result<(), ApplicationError>;

    fn update_password(
        &self,
        session: &AuthSession,
        new_password: &str,
    ) -> Result<(), ApplicationError>;

    /// Turns the tokens carried by a recovery link into a usable session.
    fn exchange_recovery(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<AuthSession, ApplicationError>;
}

pub trait SessionStore {
    fn load(&self) -> Result<Option<AuthSession>, ApplicationError>;

    fn save(&self, session: &AuthSession) -> Result<(), ApplicationError>;

    fn clear(&self) -> Result<(), ApplicationError>;
}

pub trait RatingStore {
    /// At most one photo the user has not rated and fewer than `max_raters` users have.
    fn next_eligible_photo(
        &self,
        session: &AuthSession,
        max_raters: u32,
    ) -> Result<Option<Photo>, ApplicationError>;

    /// Insert or overwrite keyed on (user_id, photo_id).
    fn upsert_rating(&self, session: &AuthSession, rating: &Rating)
        -> Result<(), ApplicationError>;
}

pub trait PhotoCatalog {
    /// Insert or keep keyed on storage_path. Returns the number of rows sent.
    fn upsert_photo_paths(&self, paths: &[StoragePath]) -> Result<usize, ApplicationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListPage {
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Folder,
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub name: String,
    pub kind: ObjectKind,
}

pub trait ObjectStore {
    /// One page of the direct children of `prefix`, sorted by name ascending.
    fn list_page(&self, prefix: &str, page: ListPage) -> Result<Vec<ObjectEntry>, ApplicationError>;
}

pub trait Clock {
    fn now_unix_seconds(&self) -> i64;
}
