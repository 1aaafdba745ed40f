use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// File extensions the catalog accepts, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".webp", ".gif"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::EmptyIdentifier("user id"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhotoId(String);

impl PhotoId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::EmptyIdentifier("photo id"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhotoId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhotoId> for String {
    fn from(value: PhotoId) -> Self {
        value.0
    }
}

impl Display for PhotoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object path relative to the bucket root, without a leading slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StoragePath(String);

impl StoragePath {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim_start_matches('/');
        if trimmed.trim().is_empty() {
            return Err(DomainError::EmptyStoragePath);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Joins a listing prefix and an entry name the way the bucket addresses them.
    pub fn join(prefix: &str, name: &str) -> Result<Self, DomainError> {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            Self::new(name)
        } else {
            Self::new(format!("{prefix}/{name}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StoragePath {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StoragePath> for String {
    fn from(value: StoragePath) -> Self {
        value.0
    }
}

impl Display for StoragePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub storage_path: StoragePath,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub discovered: usize,
    pub upserted: usize,
    pub chunks: usize,
}

pub fn is_image_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Builds the public object URL without touching the network.
pub fn public_object_url(base_url: &str, bucket: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return String::new();
    }
    let path = path.trim_start_matches('/');
    format!("{base}/storage/v1/object/public/{bucket}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_must_not_be_blank() {
        assert!(UserId::new("u-1").is_ok());
        assert_eq!(
            PhotoId::new("  "),
            Err(DomainError::EmptyIdentifier("photo id"))
        );
    }

    #[test]
    fn storage_path_strips_leading_slashes() {
        let path = StoragePath::new("/tenements/a.jpg").expect("path");
        assert_eq!(path.as_str(), "tenements/a.jpg");
        assert_eq!(StoragePath::new("/"), Err(DomainError::EmptyStoragePath));
    }

    #[test]
    fn join_handles_root_and_nested_prefixes() {
        assert_eq!(
            StoragePath::join("", "a.png").expect("root").as_str(),
            "a.png"
        );
        assert_eq!(
            StoragePath::join("1900s/nyc/", "b.JPG").expect("nested").as_str(),
            "1900s/nyc/b.JPG"
        );
    }

    #[test]
    fn image_names_match_case_insensitively() {
        assert!(is_image_name("street.JPEG"));
        assert!(is_image_name("x.webp"));
        assert!(is_image_name("anim.Gif"));
        assert!(!is_image_name("notes.txt"));
        assert!(!is_image_name("raw.nef"));
        assert!(!is_image_name("jpg"));
    }

    #[test]
    fn public_url_is_plain_templating() {
        assert_eq!(
            public_object_url("https://x.supabase.co//", "art_photos", "/a/b.jpg"),
            "https://x.supabase.co/storage/v1/object/public/art_photos/a/b.jpg"
        );
        assert_eq!(public_object_url("", "art_photos", "a.jpg"), "");
    }

    #[test]
    fn photo_deserializes_from_store_row() {
        let photo: Photo =
            serde_json::from_str(r#"{"id":"p1","storage_path":"a/b.jpg"}"#).expect("photo");
        assert_eq!(photo.id.as_str(), "p1");
        assert!(serde_json::from_str::<Photo>(r#"{"id":"","storage_path":"a"}"#).is_err());
    }
}
