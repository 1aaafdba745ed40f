use std::path::{Component, Path, PathBuf};

use art_survey_application::{ApplicationError, ListPage, ObjectEntry, ObjectKind, ObjectStore};
use walkdir::WalkDir;

/// A local directory served with the same listing contract as a storage bucket.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ApplicationError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ApplicationError::InvalidInput(format!(
                "bucket directory does not exist or is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    fn resolve(&self, prefix: &str) -> Result<PathBuf, ApplicationError> {
        let relative = Path::new(prefix.trim_matches('/'));
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            return Err(ApplicationError::InvalidInput(format!(
                "prefix must be a plain relative path: {prefix}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for FsObjectStore {
    fn list_page(&self, prefix: &str, page: ListPage) -> Result<Vec<ObjectEntry>, ApplicationError> {
        let folder = self.resolve(prefix)?;
        if !folder.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(&folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|error| ApplicationError::Io(error.to_string()))?;
            let kind = if entry.file_type().is_dir() {
                ObjectKind::Folder
            } else if entry.file_type().is_file() {
                ObjectKind::Object
            } else {
                continue;
            };
            entries.push(ObjectEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                kind,
            });
        }

        Ok(entries
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect())
    }
}
