use art_survey_domain::Dimension;

use crate::{DEFAULT_CHUNK_SIZE, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone)]
pub struct StartSessionCommand {
    pub inbound_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignUpCommand {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SignInCommand {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct SignOutCommand;

#[derive(Debug, Clone)]
pub struct RequestPasswordResetCommand {
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct CompletePasswordResetCommand {
    pub password: String,
    pub confirmation: String,
}

#[derive(Debug, Clone, Default)]
pub struct CancelPasswordResetCommand;

#[derive(Debug, Clone, Copy)]
pub struct SetScoreCommand {
    pub dimension: Dimension,
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct SetRationaleCommand {
    pub dimension: Dimension,
    pub rationale: String,
}

#[derive(Debug, Clone, Default)]
pub struct SubmitRatingCommand;

#[derive(Debug, Clone, Default)]
pub struct RefreshPhotoCommand;

#[derive(Debug, Clone)]
pub struct SyncDirectoryCommand {
    pub root_prefix: String,
    pub page_size: usize,
    pub chunk_size: usize,
}

impl SyncDirectoryCommand {
    pub fn new(root_prefix: impl Into<String>) -> Self {
        Self {
            root_prefix: root_prefix.into(),
            page_size: DEFAULT_PAGE_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
