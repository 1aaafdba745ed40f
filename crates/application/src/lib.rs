mod auth;
mod error;
mod ports;
mod service;
mod session;
mod sync;
mod use_cases;

pub use auth::{
    parse_auth_intent, validate_credentials, validate_new_password, AuthIntent, AuthSession,
    RecoveryToken, SignUpOutcome, MIN_PASSWORD_LEN,
};
pub use error::ApplicationError;
pub use ports::{
    Clock, IdentityProvider, ListPage, ObjectEntry, ObjectKind, ObjectStore, PhotoCatalog,
    RatingStore, SessionStore,
};
pub use service::{
    SurveyService, PASSWORD_UPDATED_NOTICE, RESET_SENT_NOTICE, SIGN_UP_NOTICE,
};
pub use session::{
    Notice, RatingSession, SessionEffect, SessionEvent, SessionState, SessionView,
};
pub use sync::{DirectorySync, SyncProgress, DEFAULT_CHUNK_SIZE, DEFAULT_PAGE_SIZE};
pub use use_cases::{
    CancelPasswordResetCommand, CompletePasswordResetCommand, RefreshPhotoCommand,
    RequestPasswordResetCommand, SetRationaleCommand, SetScoreCommand, SignInCommand,
    SignOutCommand, SignUpCommand, StartSessionCommand, SubmitRatingCommand,
    SyncDirectoryCommand,
};
