use std::collections::HashMap;

use art_survey_domain::UserId;
use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

use crate::ApplicationError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Sessions are refreshed this many seconds before they actually expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_id: UserId,
    pub email: Option<String>,
    pub expires_at: Option<i64>,
}

impl AuthSession {
    pub fn is_expired(&self, now_unix_seconds: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now_unix_seconds + EXPIRY_MARGIN_SECS >= expires_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    ConfirmationRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// What an inbound link asks the client to do before any other routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthIntent {
    None,
    Recovery(RecoveryToken),
    Error(String),
}

/// Reads the query string and the fragment of `inbound`; fragment values win.
pub fn parse_auth_intent(inbound: &str) -> AuthIntent {
    let inbound = inbound.trim();
    if inbound.is_empty() {
        return AuthIntent::None;
    }

    let Some(url) = Url::parse("http://localhost/")
        .ok()
        .and_then(|base| base.join(inbound).ok())
    else {
        return AuthIntent::None;
    };

    let mut params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    if let Some(fragment) = url.fragment() {
        params.extend(form_urlencoded::parse(fragment.as_bytes()).into_owned());
    }

    let value = |key: &str| {
        params
            .get(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if let Some(error) = value("error_description")
        .or_else(|| value("error_code"))
        .or_else(|| value("error"))
    {
        return AuthIntent::Error(error);
    }

    let access_token = value("access_token");
    let refresh_token = value("refresh_token");
    let flow = value("type");

    match (flow.as_deref(), access_token) {
        (Some("recovery"), Some(access_token)) => AuthIntent::Recovery(RecoveryToken {
            access_token,
            refresh_token,
        }),
        (Some("recovery"), None) => {
            AuthIntent::Error("this reset link is invalid or expired".to_string())
        }
        (None, Some(access_token)) if refresh_token.is_some() => {
            AuthIntent::Recovery(RecoveryToken {
                access_token,
                refresh_token,
            })
        }
        (Some(_), Some(_)) => {
            AuthIntent::Error("this link is not a password recovery link".to_string())
        }
        _ => AuthIntent::None,
    }
}

pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), ApplicationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApplicationError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password != confirmation {
        return Err(ApplicationError::InvalidInput(
            "passwords do not match".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_credentials(email: &str, password: &str) -> Result<(), ApplicationError> {
    if email.trim().is_empty() {
        return Err(ApplicationError::InvalidInput(
            "email must not be empty".to_string(),
        ));
    }
    if password.is_empty() {
        return Err(ApplicationError::InvalidInput(
            "password must not be empty".to_string(),
        ));
    }
    Ok(())
}
