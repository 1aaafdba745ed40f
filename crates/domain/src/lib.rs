mod error;
mod photo;
mod rating;

pub use error::DomainError;
pub use photo::{
    is_image_name, public_object_url, Photo, PhotoId, StoragePath, SyncReport, UserId,
    IMAGE_EXTENSIONS,
};
pub use rating::{
    rationale_required, Dimension, DimensionInput, DraftProblem, Rating, RatingDraft,
    RatingPolicy, Score, DEFAULT_MAX_RATERS, MAX_SCORE,
};
