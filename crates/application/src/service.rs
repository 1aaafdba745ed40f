use art_survey_domain::{RatingPolicy, Score};
use tracing::{info, warn};

use crate::{
    parse_auth_intent, validate_credentials, validate_new_password, ApplicationError, AuthIntent,
    AuthSession, CancelPasswordResetCommand, Clock, CompletePasswordResetCommand,
    IdentityProvider, Notice, RatingSession, RatingStore, RefreshPhotoCommand,
    RequestPasswordResetCommand, SessionEffect, SessionEvent, SessionState, SessionStore,
    SessionView, SetRationaleCommand, SetScoreCommand, SignInCommand, SignOutCommand,
    SignUpCommand, SignUpOutcome, StartSessionCommand, SubmitRatingCommand,
};

pub const SIGN_UP_NOTICE: &str =
    "Sign up successful. If email confirmation is enabled, confirm then sign in.";
pub const RESET_SENT_NOTICE: &str = "Check your email for a password reset link.";
pub const PASSWORD_UPDATED_NOTICE: &str = "Password updated. Sign in with your new password.";

/// Drives one user's rating session through the remote collaborators.
pub struct SurveyService {
    identity: Box<dyn IdentityProvider>,
    sessions: Box<dyn SessionStore>,
    ratings: Box<dyn RatingStore>,
    clock: Box<dyn Clock>,
    redirect_url: String,
    session: RatingSession,
}

impl SurveyService {
    pub fn new(
        identity: Box<dyn IdentityProvider>,
        sessions: Box<dyn SessionStore>,
        ratings: Box<dyn RatingStore>,
        clock: Box<dyn Clock>,
        policy: RatingPolicy,
        redirect_url: String,
    ) -> Self {
        Self {
            identity,
            sessions,
            ratings,
            clock,
            redirect_url,
            session: RatingSession::new(policy),
        }
    }

    /// Routes on the inbound link first, then falls back to a persisted session.
    pub fn start(&mut self, command: StartSessionCommand) -> Result<SessionView, ApplicationError> {
        let intent = command
            .inbound_url
            .as_deref()
            .map(parse_auth_intent)
            .unwrap_or(AuthIntent::None);

        match intent {
            AuthIntent::Recovery(token) => {
                info!("recovery link detected");
                self.session.apply(SessionEvent::RecoveryDetected)?;
                match self
                    .identity
                    .exchange_recovery(&token.access_token, token.refresh_token.as_deref())
                {
                    Ok(auth) => {
                        self.sessions.save(&auth)?;
                        self.session.apply(SessionEvent::SignedIn(auth))?;
                    }
                    Err(error) => {
                        warn!(%error, "recovery link could not be exchanged");
                        self.session.set_notice(Some(Notice::Error(error.to_string())));
                    }
                }
                Ok(self.view())
            }
            AuthIntent::Error(message) => {
                warn!(message = message.as_str(), "inbound link carried an error");
                self.restore()?;
                self.session.set_notice(Some(Notice::Error(message)));
                Ok(self.view())
            }
            AuthIntent::None => {
                self.restore()?;
                Ok(self.view())
            }
        }
    }

    pub fn sign_up(&mut self, command: SignUpCommand) -> Result<SessionView, ApplicationError> {
        self.expect_signed_out("sign up")?;
        validate_credentials(&command.email, &command.password)?;
        match self
            .identity
            .sign_up(command.email.trim(), &command.password)?
        {
            SignUpOutcome::SignedIn(auth) => self.establish(auth)?,
            SignUpOutcome::ConfirmationRequired => {
                self.session
                    .set_notice(Some(Notice::Info(SIGN_UP_NOTICE.to_string())));
            }
        }
        Ok(self.view())
    }

    pub fn sign_in(&mut self, command: SignInCommand) -> Result<SessionView, ApplicationError> {
        self.expect_signed_out("sign in")?;
        validate_credentials(&command.email, &command.password)?;
        let auth = self
            .identity
            .sign_in(command.email.trim(), &command.password)?;
        info!(user = %auth.user_id, "signed in");
        self.establish(auth)?;
        Ok(self.view())
    }

    pub fn sign_out(&mut self, _command: SignOutCommand) -> Result<SessionView, ApplicationError> {
        if let Some(auth) = self.session.auth().cloned() {
            if let Err(error) = self.identity.sign_out(&auth) {
                warn!(%error, "remote sign-out failed; clearing the local session anyway");
            }
        }
        self.sessions.clear()?;
        self.session.apply(SessionEvent::SignedOut)?;
        Ok(self.view())
    }

    pub fn request_password_reset(
        &mut self,
        command: RequestPasswordResetCommand,
    ) -> Result<SessionView, ApplicationError> {
        let email = command.email.trim();
        if email.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "email must not be empty".to_string(),
            ));
        }
        self.identity
            .send_password_reset(email, &self.redirect_url)?;
        self.session
            .set_notice(Some(Notice::Info(RESET_SENT_NOTICE.to_string())));
        Ok(self.view())
    }

    pub fn complete_password_reset(
        &mut self,
        command: CompletePasswordResetCommand,
    ) -> Result<SessionView, ApplicationError> {
        if self.session.state() != SessionState::PasswordResetPending {
            return Err(ApplicationError::InvalidTransition {
                action: "update the password",
                state: self.session.state().name(),
            });
        }
        validate_new_password(&command.password, &command.confirmation)?;
        let auth = self
            .session
            .auth()
            .cloned()
            .ok_or(ApplicationError::NotSignedIn)?;

        self.identity.update_password(&auth, &command.password)?;
        info!(user = %auth.user_id, "password updated");

        self.sign_out(SignOutCommand)?;
        self.session
            .set_notice(Some(Notice::Info(PASSWORD_UPDATED_NOTICE.to_string())));
        Ok(self.view())
    }

    pub fn cancel_password_reset(
        &mut self,
        _command: CancelPasswordResetCommand,
    ) -> Result<SessionView, ApplicationError> {
        let effect = self.session.apply(SessionEvent::RecoveryFinished)?;
        self.drive(effect)?;
        Ok(self.view())
    }

    pub fn set_score(&mut self, command: SetScoreCommand) -> Result<SessionView, ApplicationError> {
        let score = Score::new(command.value)?;
        self.session.set_score(command.dimension, score)?;
        Ok(self.view())
    }

    pub fn set_rationale(
        &mut self,
        command: SetRationaleCommand,
    ) -> Result<SessionView, ApplicationError> {
        self.session
            .set_rationale(command.dimension, &command.rationale)?;
        Ok(self.view())
    }

    pub fn submit(&mut self, _command: SubmitRatingCommand) -> Result<SessionView, ApplicationError> {
        let effect = self.session.apply(SessionEvent::SubmitRequested)?;
        self.drive(effect)?;
        Ok(self.view())
    }

    pub fn refresh(&mut self, _command: RefreshPhotoCommand) -> Result<SessionView, ApplicationError> {
        let effect = self.session.apply(SessionEvent::RefreshRequested)?;
        self.drive(effect)?;
        Ok(self.view())
    }

    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    fn restore(&mut self) -> Result<(), ApplicationError> {
        let Some(stored) = self.sessions.load()? else {
            return Ok(());
        };

        let accepted = if stored.is_expired(self.clock.now_unix_seconds()) {
            false
        } else {
            match self.identity.current_user(&stored) {
                Ok(user) if user == stored.user_id => true,
                Ok(user) => {
                    warn!(stored = %stored.user_id, %user, "stored session belongs to another user");
                    false
                }
                Err(error) => {
                    warn!(%error, "stored session was rejected");
                    false
                }
            }
        };

        let auth = if accepted {
            stored
        } else {
            match self.refreshed(&stored) {
                Ok(auth) => auth,
                Err(error) => {
                    warn!(%error, "stored session could not be refreshed");
                    self.sessions.clear()?;
                    return Ok(());
                }
            }
        };

        info!(user = %auth.user_id, "restored session");
        let effect = self.session.apply(SessionEvent::SignedIn(auth))?;
        self.drive(effect)
    }

    fn establish(&mut self, auth: AuthSession) -> Result<(), ApplicationError> {
        self.sessions.save(&auth)?;
        let effect = self.session.apply(SessionEvent::SignedIn(auth))?;
        self.drive(effect)
    }

    fn refreshed(&self, auth: &AuthSession) -> Result<AuthSession, ApplicationError> {
        let refresh_token = auth
            .refresh_token
            .as_deref()
            .ok_or_else(|| ApplicationError::Remote("session expired".to_string()))?;
        let renewed = self.identity.refresh(refresh_token)?;
        self.sessions.save(&renewed)?;
        Ok(renewed)
    }

    /// Returns a usable token, renewing it first when it is about to expire.
    fn usable_auth(&mut self, auth: AuthSession) -> Result<AuthSession, ApplicationError> {
        if !auth.is_expired(self.clock.now_unix_seconds()) {
            return Ok(auth);
        }
        let renewed = self.refreshed(&auth)?;
        self.session.apply(SessionEvent::SignedIn(renewed.clone()))?;
        Ok(renewed)
    }

    /// Performs effects until the machine settles; remote failures become events.
    fn drive(&mut self, effect: Option<SessionEffect>) -> Result<(), ApplicationError> {
        let mut next = effect;
        while let Some(effect) = next.take() {
            let event = match effect {
                SessionEffect::FetchNextPhoto(auth) => {
                    let max_raters = self.session.policy().max_raters_per_photo;
                    match self
                        .usable_auth(auth)
                        .and_then(|auth| self.ratings.next_eligible_photo(&auth, max_raters))
                    {
                        Ok(Some(photo)) => {
                            info!(photo = %photo.id, "serving photo");
                            SessionEvent::PhotoLoaded(Some(photo))
                        }
                        Ok(None) => {
                            info!("no eligible photos left");
                            SessionEvent::PhotoLoaded(None)
                        }
                        Err(error) => {
                            warn!(%error, "loading the next photo failed");
                            SessionEvent::PhotoLoadFailed(error.to_string())
                        }
                    }
                }
                SessionEffect::WriteRating(auth, rating) => {
                    match self
                        .usable_auth(auth)
                        .and_then(|auth| self.ratings.upsert_rating(&auth, &rating))
                    {
                        Ok(()) => {
                            info!(photo = %rating.photo_id, "rating saved");
                            SessionEvent::RatingSaved
                        }
                        Err(error) => {
                            warn!(%error, "saving the rating failed");
                            SessionEvent::RatingFailed(error.to_string())
                        }
                    }
                }
            };
            next = self.session.apply(event)?;
        }
        Ok(())
    }

    fn expect_signed_out(&self, action: &'static str) -> Result<(), ApplicationError> {
        match self.session.state() {
            SessionState::SignedOut => Ok(()),
            state => Err(ApplicationError::InvalidTransition {
                action,
                state: state.name(),
            }),
        }
    }
}
