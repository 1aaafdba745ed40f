use art_survey_domain::{is_image_name, StoragePath, SyncReport};
use tracing::{debug, info};

use crate::{
    ApplicationError, ListPage, ObjectKind, ObjectStore, PhotoCatalog, SyncDirectoryCommand,
};

pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncProgress {
    pub upserted: usize,
    pub total: usize,
}

/// Walks the bucket and registers every image path in the photo catalog.
pub struct DirectorySync {
    objects: Box<dyn ObjectStore>,
    catalog: Box<dyn PhotoCatalog>,
}

impl DirectorySync {
    pub fn new(objects: Box<dyn ObjectStore>, catalog: Box<dyn PhotoCatalog>) -> Self {
        Self { objects, catalog }
    }

    pub fn run(
        &self,
        command: SyncDirectoryCommand,
        mut on_progress: impl FnMut(SyncProgress),
    ) -> Result<SyncReport, ApplicationError> {
        if command.page_size == 0 {
            return Err(ApplicationError::InvalidInput(
                "page size must be positive".to_string(),
            ));
        }
        if command.chunk_size == 0 {
            return Err(ApplicationError::InvalidInput(
                "chunk size must be positive".to_string(),
            ));
        }

        let paths = self.discover(&command.root_prefix, command.page_size)?;
        info!(
            found = paths.len(),
            root = command.root_prefix.as_str(),
            "discovered images"
        );

        let mut report = SyncReport {
            discovered: paths.len(),
            ..SyncReport::default()
        };
        for chunk in paths.chunks(command.chunk_size) {
            report.upserted += self.catalog.upsert_photo_paths(chunk)?;
            report.chunks += 1;
            on_progress(SyncProgress {
                upserted: report.upserted,
                total: paths.len(),
            });
        }

        Ok(report)
    }

    /// Every image path under `prefix`, folders expanded depth first.
    pub fn discover(
        &self,
        prefix: &str,
        page_size: usize,
    ) -> Result<Vec<StoragePath>, ApplicationError> {
        let prefix = prefix.trim_matches('/');
        let mut out = Vec::new();
        let mut offset = 0;

        loop {
            let entries = self.objects.list_page(
                prefix,
                ListPage {
                    limit: page_size,
                    offset,
                },
            )?;
            debug!(prefix, offset, entries = entries.len(), "listed page");

            for entry in &entries {
                if entry.name.is_empty() {
                    continue;
                }
                match entry.kind {
                    ObjectKind::Folder => {
                        let child = StoragePath::join(prefix, &entry.name)?;
                        out.extend(self.discover(child.as_str(), page_size)?);
                    }
                    ObjectKind::Object if is_image_name(&entry.name) => {
                        out.push(StoragePath::join(prefix, &entry.name)?);
                    }
                    ObjectKind::Object => {}
                }
            }

            if entries.len() < page_size {
                break;
            }
            offset += page_size;
        }

        Ok(out)
    }
}
