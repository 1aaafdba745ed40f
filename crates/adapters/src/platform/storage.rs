use art_survey_application::{ApplicationError, ListPage, ObjectEntry, ObjectKind, ObjectStore};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use super::PlatformClient;

#[derive(Debug, Deserialize)]
struct ListedObject {
    name: Option<String>,
    #[serde(default)]
    metadata: Option<Value>,
}

/// Entries without metadata are folders. Nameless entries are kept so the
/// page length still reflects what the server returned.
pub(crate) fn parse_listing(body: Value) -> Result<Vec<ObjectEntry>, ApplicationError> {
    let listed: Vec<ListedObject> = serde_json::from_value(body)
        .map_err(|error| ApplicationError::Remote(format!("unexpected listing: {error}")))?;
    Ok(listed
        .into_iter()
        .map(|item| {
            let kind = match item.metadata {
                None | Some(Value::Null) => ObjectKind::Folder,
                Some(_) => ObjectKind::Object,
            };
            ObjectEntry {
                name: item.name.unwrap_or_default(),
                kind,
            }
        })
        .collect())
}

impl ObjectStore for PlatformClient {
    fn list_page(&self, prefix: &str, page: ListPage) -> Result<Vec<ObjectEntry>, ApplicationError> {
        if self.bucket().is_empty() {
            return Err(ApplicationError::Configuration(
                "bucket name must not be empty".to_string(),
            ));
        }
        let path = format!("storage/v1/object/list/{}", self.bucket());
        let body: Value = self.send_json(self.request(Method::POST, &path, None).json(&json!({
            "prefix": prefix,
            "limit": page.limit,
            "offset": page.offset,
            "sortBy": { "column": "name", "order": "asc" },
        })))?;
        parse_listing(body)
    }
}
