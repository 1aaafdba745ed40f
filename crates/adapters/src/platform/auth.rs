use art_survey_application::{
    ApplicationError, AuthSession, IdentityProvider, SignUpOutcome,
};
use art_survey_domain::UserId;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::PlatformClient;

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    user: UserPayload,
}

impl TokenPayload {
    fn into_session(self) -> Result<AuthSession, ApplicationError> {
        Ok(AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            user_id: UserId::new(self.user.id)?,
            email: self.user.email,
            expires_at: self.expires_at,
        })
    }
}

/// Sign-up answers with a session when confirmation is off and with a bare user otherwise.
pub(crate) fn parse_sign_up(body: Value) -> Result<SignUpOutcome, ApplicationError> {
    if body.get("access_token").is_some() {
        let token: TokenPayload = serde_json::from_value(body)
            .map_err(|error| ApplicationError::Remote(format!("unexpected response: {error}")))?;
        return Ok(SignUpOutcome::SignedIn(token.into_session()?));
    }
    Ok(SignUpOutcome::ConfirmationRequired)
}

impl IdentityProvider for PlatformClient {
    fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ApplicationError> {
        debug!("sign up");
        let body: Value = self.send_json(
            self.request(Method::POST, "auth/v1/signup", None)
                .json(&json!({ "email": email, "password": password })),
        )?;
        parse_sign_up(body)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ApplicationError> {
        debug!("password sign in");
        let token: TokenPayload = self.send_json(
            self.request(Method::POST, "auth/v1/token", None)
                .query(&[("grant_type", "password")])
                .json(&json!({ "email": email, "password": password })),
        )?;
        token.into_session()
    }

    fn sign_out(&self, session: &AuthSession) -> Result<(), ApplicationError> {
        self.send(self.request(Method::POST, "auth/v1/logout", Some(&session.access_token)))?;
        Ok(())
    }

    fn refresh(&self, refresh_token: &str) -> Result<AuthSession, ApplicationError> {
        debug!("refreshing session");
        let token: TokenPayload = self.send_json(
            self.request(Method::POST, "auth/v1/token", None)
                .query(&[("grant_type", "refresh_token")])
                .json(&json!({ "refresh_token": refresh_token })),
        )?;
        token.into_session()
    }

    fn current_user(&self, session: &AuthSession) -> Result<UserId, ApplicationError> {
        let user: UserPayload = self.send_json(self.request(
            Method::GET,
            "auth/v1/user",
            Some(&session.access_token),
        ))?;
        Ok(UserId::new(user.id)?)
    }

    fn send_password_reset(
        &self,
        email: &str,
        redirect_url: &str,
    ) -> Result<(), ApplicationError> {
        self.send(
            self.request(Method::POST, "auth/v1/recover", None)
                .query(&[("redirect_to", redirect_url)])
                .json(&json!({ "email": email })),
        )?;
        Ok(())
    }

    fn update_password(
        &self,
        session: &AuthSession,
        new_password: &str,
    ) -> Result<(), ApplicationError> {
        self.send(
            self.request(Method::PUT, "auth/v1/user", Some(&session.access_token))
                .json(&json!({ "password": new_password })),
        )?;
        Ok(())
    }

    fn exchange_recovery(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<AuthSession, ApplicationError> {
        let user: UserPayload = self.send_json(self.request(
            Method::GET,
            "auth/v1/user",
            Some(access_token),
        ))?;
        Ok(AuthSession {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.map(str::to_string),
            user_id: UserId::new(user.id)?,
            email: user.email,
            expires_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_up_with_session_signs_in() {
        let body = json!({
            "access_token": "jwt",
            "refresh_token": "r1",
            "expires_in": 3600,
            "expires_at": 1_700_003_600,
            "token_type": "bearer",
            "user": { "id": "9b1d", "email": "rater@example.com" }
        });
        let SignUpOutcome::SignedIn(session) = parse_sign_up(body).expect("parse") else {
            panic!("expected a session");
        };
        assert_eq!(session.user_id.as_str(), "9b1d");
        assert_eq!(session.refresh_token.as_deref(), Some("r1"));
        assert_eq!(session.expires_at, Some(1_700_003_600));
    }

    #[test]
    fn sign_up_without_session_needs_confirmation() {
        let body = json!({ "id": "9b1d", "email": "rater@example.com", "confirmation_sent_at": "2026-01-01T00:00:00Z" });
        assert_eq!(
            parse_sign_up(body).expect("parse"),
            SignUpOutcome::ConfirmationRequired
        );
    }

    #[test]
    fn token_payload_rejects_blank_user_id() {
        let token: TokenPayload = serde_json::from_value(json!({
            "access_token": "jwt",
            "user": { "id": "" }
        }))
        .expect("shape");
        assert!(matches!(
            token.into_session(),
            Err(ApplicationError::Domain(_))
        ));
    }
}
