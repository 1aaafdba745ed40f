use std::collections::HashMap;

use art_survey_application::ApplicationError;

pub const DEFAULT_BUCKET: &str = "art_photos";

/// Where configuration values come from. The process environment in
/// production, a map in tests.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub session_path: String,
    pub catalog_path: String,
    pub reset_redirect_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_path: "session.json".to_string(),
            catalog_path: "catalog.sqlite3".to_string(),
            reset_redirect_url: "http://localhost:3000/reset".to_string(),
        }
    }
}

/// Public client settings used by the rating session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyConfig {
    pub url: String,
    pub anon_key: String,
    pub bucket: String,
}

impl SurveyConfig {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ApplicationError> {
        Ok(Self {
            url: first_of(env, &["NEXT_PUBLIC_SUPABASE_URL", "SUPABASE_URL"])?,
            anon_key: first_of(env, &["NEXT_PUBLIC_SUPABASE_ANON_KEY", "SUPABASE_ANON_KEY"])?,
            bucket: optional(env, "NEXT_PUBLIC_SUPABASE_BUCKET")
                .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
        })
    }
}

/// Privileged settings for the directory sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub url: String,
    pub service_role_key: String,
    pub bucket: String,
    pub root_prefix: String,
}

impl SyncConfig {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ApplicationError> {
        Ok(Self {
            url: required(env, "SUPABASE_URL")?,
            service_role_key: required(env, "SUPABASE_SERVICE_ROLE_KEY")?,
            bucket: required(env, "SUPABASE_BUCKET")?,
            root_prefix: optional(env, "SUPABASE_FOLDER").unwrap_or_default(),
        })
    }
}

fn optional(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(env: &dyn EnvSource, key: &str) -> Result<String, ApplicationError> {
    optional(env, key).ok_or_else(|| ApplicationError::Configuration(format!("missing {key}")))
}

fn first_of(env: &dyn EnvSource, keys: &[&str]) -> Result<String, ApplicationError> {
    keys.iter()
        .find_map(|key| optional(env, key))
        .ok_or_else(|| ApplicationError::Configuration(format!("missing {}", keys.join(" or "))))
}
