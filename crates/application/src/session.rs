use art_survey_domain::{
    Dimension, DraftProblem, Photo, Rating, RatingDraft, RatingPolicy, Score, UserId,
};
use tracing::debug;

use crate::{ApplicationError, AuthSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    PasswordResetPending,
    LoadingPhoto,
    AwaitingRating,
    Submitting,
    Exhausted,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            Self::SignedOut => "signed out",
            Self::PasswordResetPending => "resetting the password",
            Self::LoadingPhoto => "loading a photo",
            Self::AwaitingRating => "awaiting a rating",
            Self::Submitting => "submitting",
            Self::Exhausted => "out of photos",
        }
    }

    /// A remote call is in flight; controls that start another one are disabled.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::LoadingPhoto | Self::Submitting)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Credential sign-in, restored session or refreshed token.
    SignedIn(AuthSession),
    RecoveryDetected,
    /// The reset was completed or cancelled without signing out.
    RecoveryFinished,
    PhotoLoaded(Option<Photo>),
    PhotoLoadFailed(String),
    SubmitRequested,
    RatingSaved,
    RatingFailed(String),
    RefreshRequested,
    SignedOut,
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => "signed_in",
            Self::RecoveryDetected => "recovery_detected",
            Self::RecoveryFinished => "recovery_finished",
            Self::PhotoLoaded(_) => "photo_loaded",
            Self::PhotoLoadFailed(_) => "photo_load_failed",
            Self::SubmitRequested => "submit_requested",
            Self::RatingSaved => "rating_saved",
            Self::RatingFailed(_) => "rating_failed",
            Self::RefreshRequested => "refresh_requested",
            Self::SignedOut => "signed_out",
        }
    }
}

/// Remote work the caller must perform and report back as an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    FetchNextPhoto(AuthSession),
    WriteRating(AuthSession, Rating),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub state: SessionState,
    pub user_id: Option<UserId>,
    pub email: Option<String>,
    pub photo: Option<Photo>,
    pub draft: RatingDraft,
    pub problems: Vec<DraftProblem>,
    pub can_submit: bool,
    pub busy: bool,
    pub notice: Option<Notice>,
    pub rated_count: usize,
}

#[derive(Debug, Clone)]
pub struct RatingSession {
    state: SessionState,
    policy: RatingPolicy,
    auth: Option<AuthSession>,
    current: Option<Photo>,
    draft: RatingDraft,
    notice: Option<Notice>,
    rated_count: usize,
}

impl RatingSession {
    pub fn new(policy: RatingPolicy) -> Self {
        Self {
            state: SessionState::SignedOut,
            policy,
            auth: None,
            current: None,
            draft: RatingDraft::default(),
            notice: None,
            rated_count: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn policy(&self) -> RatingPolicy {
        self.policy
    }

    pub fn auth(&self) -> Option<&AuthSession> {
        self.auth.as_ref()
    }

    pub fn current_photo(&self) -> Option<&Photo> {
        self.current.as_ref()
    }

    pub fn draft(&self) -> &RatingDraft {
        &self.draft
    }

    pub fn set_notice(&mut self, notice: Option<Notice>) {
        self.notice = notice;
    }

    pub fn can_submit(&self) -> bool {
        self.state == SessionState::AwaitingRating
            && self.auth.is_some()
            && self.current.is_some()
            && self.draft.is_complete(self.policy)
    }

    pub fn set_score(&mut self, dimension: Dimension, score: Score) -> Result<(), ApplicationError> {
        self.ensure_editable("change a score")?;
        self.draft.input_mut(dimension).score = Some(score);
        Ok(())
    }

    pub fn set_rationale(
        &mut self,
        dimension: Dimension,
        rationale: &str,
    ) -> Result<(), ApplicationError> {
        self.ensure_editable("edit a rationale")?;
        self.draft.input_mut(dimension).rationale = rationale.to_string();
        Ok(())
    }

    pub fn apply(
        &mut self,
        event: SessionEvent,
    ) -> Result<Option<SessionEffect>, ApplicationError> {
        debug!(state = self.state.name(), event = event.kind(), "session event");
        match event {
            SessionEvent::SignedIn(auth) => Ok(self.on_signed_in(auth)),
            SessionEvent::RecoveryDetected => {
                self.current = None;
                self.draft.reset();
                self.state = SessionState::PasswordResetPending;
                Ok(None)
            }
            SessionEvent::RecoveryFinished => {
                self.expect_state(SessionState::PasswordResetPending, "finish a password reset")?;
                match self.auth.clone() {
                    Some(auth) => Ok(Some(self.begin_loading(auth))),
                    None => {
                        self.state = SessionState::SignedOut;
                        Ok(None)
                    }
                }
            }
            SessionEvent::PhotoLoaded(photo) => {
                self.expect_state(SessionState::LoadingPhoto, "show a photo")?;
                self.draft.reset();
                self.state = if photo.is_some() {
                    SessionState::AwaitingRating
                } else {
                    SessionState::Exhausted
                };
                self.current = photo;
                Ok(None)
            }
            SessionEvent::PhotoLoadFailed(message) => {
                self.expect_state(SessionState::LoadingPhoto, "report a load failure")?;
                self.notice = Some(Notice::Error(message));
                self.state = if self.current.is_some() {
                    SessionState::AwaitingRating
                } else {
                    SessionState::Exhausted
                };
                Ok(None)
            }
            SessionEvent::SubmitRequested => self.on_submit_requested().map(Some),
            SessionEvent::RatingSaved => {
                self.expect_state(SessionState::Submitting, "confirm a rating")?;
                self.rated_count += 1;
                self.current = None;
                self.draft.reset();
                let auth = self.auth.clone().ok_or(ApplicationError::NotSignedIn)?;
                Ok(Some(self.begin_loading(auth)))
            }
            SessionEvent::RatingFailed(message) => {
                self.expect_state(SessionState::Submitting, "report a failed rating")?;
                self.notice = Some(Notice::Error(message));
                self.state = SessionState::AwaitingRating;
                Ok(None)
            }
            SessionEvent::RefreshRequested => {
                if self.state.is_busy() {
                    return Err(ApplicationError::Busy);
                }
                if !matches!(
                    self.state,
                    SessionState::Exhausted | SessionState::AwaitingRating
                ) {
                    return Err(self.invalid("look for another photo"));
                }
                let auth = self.auth.clone().ok_or(ApplicationError::NotSignedIn)?;
                Ok(Some(self.begin_loading(auth)))
            }
            SessionEvent::SignedOut => {
                *self = Self::new(self.policy);
                Ok(None)
            }
        }
    }

    pub fn view(&self) -> SessionView {
        let problems = if self.current.is_some() {
            self.draft.problems(self.policy)
        } else {
            Vec::new()
        };
        SessionView {
            state: self.state,
            user_id: self.auth.as_ref().map(|auth| auth.user_id.clone()),
            email: self.auth.as_ref().and_then(|auth| auth.email.clone()),
            photo: self.current.clone(),
            draft: self.draft.clone(),
            problems,
            can_submit: self.can_submit(),
            busy: self.state.is_busy(),
            notice: self.notice.clone(),
            rated_count: self.rated_count,
        }
    }

    fn on_signed_in(&mut self, auth: AuthSession) -> Option<SessionEffect> {
        let was_signed_out = self.state == SessionState::SignedOut;
        self.auth = Some(auth.clone());
        if was_signed_out {
            self.notice = None;
            return Some(self.begin_loading(auth));
        }
        None
    }

    fn on_submit_requested(&mut self) -> Result<SessionEffect, ApplicationError> {
        if self.state.is_busy() {
            return Err(ApplicationError::Busy);
        }
        self.expect_state(SessionState::AwaitingRating, "submit a rating")?;
        let auth = self.auth.clone().ok_or(ApplicationError::NotSignedIn)?;
        let photo = self
            .current
            .as_ref()
            .ok_or_else(|| ApplicationError::NotFound("no photo is being rated".to_string()))?;
        let rating = self.draft.to_rating(&auth.user_id, &photo.id, self.policy)?;
        self.notice = None;
        self.state = SessionState::Submitting;
        Ok(SessionEffect::WriteRating(auth, rating))
    }

    fn begin_loading(&mut self, auth: AuthSession) -> SessionEffect {
        self.state = SessionState::LoadingPhoto;
        SessionEffect::FetchNextPhoto(auth)
    }

    fn ensure_editable(&self, action: &'static str) -> Result<(), ApplicationError> {
        if self.state.is_busy() {
            return Err(ApplicationError::Busy);
        }
        self.expect_state(SessionState::AwaitingRating, action)
    }

    fn expect_state(
        &self,
        expected: SessionState,
        action: &'static str,
    ) -> Result<(), ApplicationError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> ApplicationError {
        ApplicationError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use art_survey_domain::{PhotoId, StoragePath};

    use super::*;

    fn auth() -> AuthSession {
        AuthSession {
            access_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            user_id: UserId::new("user-1").expect("user"),
            email: Some("rater@example.com".to_string()),
            expires_at: None,
        }
    }

    fn photo(id: &str) -> Photo {
        Photo {
            id: PhotoId::new(id).expect("id"),
            storage_path: StoragePath::new(format!("set/{id}.jpg")).expect("path"),
        }
    }

    fn score(value: i64) -> Score {
        Score::new(value).expect("score")
    }

    fn awaiting(photo_id: &str) -> RatingSession {
        let mut session = RatingSession::new(RatingPolicy::default());
        session
            .apply(SessionEvent::SignedIn(auth()))
            .expect("sign in");
        session
            .apply(SessionEvent::PhotoLoaded(Some(photo(photo_id))))
            .expect("loaded");
        session
    }

    #[test]
    fn sign_in_requests_a_photo() {
        let mut session = RatingSession::new(RatingPolicy::default());
        let effect = session
            .apply(SessionEvent::SignedIn(auth()))
            .expect("sign in");
        assert_eq!(effect, Some(SessionEffect::FetchNextPhoto(auth())));
        assert_eq!(session.state(), SessionState::LoadingPhoto);
        assert!(session.view().busy);
    }

    #[test]
    fn empty_result_is_terminal() {
        let mut session = RatingSession::new(RatingPolicy::default());
        session.apply(SessionEvent::SignedIn(auth())).expect("sign in");
        let effect = session
            .apply(SessionEvent::PhotoLoaded(None))
            .expect("exhausted");
        assert_eq!(effect, None);
        assert_eq!(session.state(), SessionState::Exhausted);
        assert!(matches!(
            session.apply(SessionEvent::SubmitRequested),
            Err(ApplicationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn exhausted_only_leaves_on_refresh() {
        let mut session = RatingSession::new(RatingPolicy::default());
        session.apply(SessionEvent::SignedIn(auth())).expect("sign in");
        session.apply(SessionEvent::PhotoLoaded(None)).expect("empty");
        let effect = session
            .apply(SessionEvent::RefreshRequested)
            .expect("refresh");
        assert!(matches!(effect, Some(SessionEffect::FetchNextPhoto(_))));
        session
            .apply(SessionEvent::PhotoLoaded(Some(photo("q"))))
            .expect("loaded");
        assert_eq!(session.state(), SessionState::AwaitingRating);
    }

    #[test]
    fn submit_is_blocked_until_draft_is_complete() {
        let mut session = awaiting("p");
        assert!(!session.can_submit());
        session.set_score(Dimension::Wealth, score(5)).expect("wealth");
        session
            .set_score(Dimension::Relevance, score(7))
            .expect("relevance");
        assert!(!session.can_submit());
        assert_eq!(
            session.view().problems,
            vec![DraftProblem::MissingRationale(Dimension::Relevance)]
        );
        assert!(matches!(
            session.apply(SessionEvent::SubmitRequested),
            Err(ApplicationError::Domain(_))
        ));
        assert_eq!(session.state(), SessionState::AwaitingRating);

        session
            .set_rationale(Dimension::Relevance, "crowded tenement windows")
            .expect("why");
        assert!(session.can_submit());
    }

    #[test]
    fn submission_writes_then_loads_next() {
        let mut session = awaiting("p");
        session.set_score(Dimension::Wealth, score(5)).expect("wealth");
        session
            .set_score(Dimension::Relevance, score(0))
            .expect("relevance");

        let effect = session
            .apply(SessionEvent::SubmitRequested)
            .expect("submit");
        let Some(SessionEffect::WriteRating(_, rating)) = effect else {
            panic!("expected a write, got {effect:?}");
        };
        assert_eq!(rating.photo_id.as_str(), "p");
        assert_eq!(session.state(), SessionState::Submitting);
        assert!(matches!(
            session.apply(SessionEvent::SubmitRequested),
            Err(ApplicationError::Busy)
        ));
        assert!(matches!(
            session.set_score(Dimension::Wealth, score(1)),
            Err(ApplicationError::Busy)
        ));

        let effect = session.apply(SessionEvent::RatingSaved).expect("saved");
        assert!(matches!(effect, Some(SessionEffect::FetchNextPhoto(_))));
        session
            .apply(SessionEvent::PhotoLoaded(Some(photo("q"))))
            .expect("next");
        assert_eq!(session.current_photo().map(|p| p.id.as_str()), Some("q"));
        assert_eq!(session.draft(), &RatingDraft::default());
        assert_eq!(session.view().rated_count, 1);
    }

    #[test]
    fn failed_write_keeps_photo_and_inputs() {
        let mut session = awaiting("p");
        session.set_score(Dimension::Wealth, score(8)).expect("wealth");
        session.set_rationale(Dimension::Wealth, "silk").expect("why");
        session
            .set_score(Dimension::Relevance, score(0))
            .expect("relevance");
        session.apply(SessionEvent::SubmitRequested).expect("submit");
        session
            .apply(SessionEvent::RatingFailed("permission denied".to_string()))
            .expect("failed");

        assert_eq!(session.state(), SessionState::AwaitingRating);
        assert_eq!(session.current_photo().map(|p| p.id.as_str()), Some("p"));
        assert_eq!(session.draft().wealth.rationale, "silk");
        assert_eq!(
            session.view().notice,
            Some(Notice::Error("permission denied".to_string()))
        );
        assert!(session.can_submit());
    }

    #[test]
    fn rated_photo_is_not_offered_again_when_the_next_load_fails() {
        let mut session = awaiting("p");
        session.set_score(Dimension::Wealth, score(5)).expect("wealth");
        session
            .set_score(Dimension::Relevance, score(0))
            .expect("relevance");
        session.apply(SessionEvent::SubmitRequested).expect("submit");
        session.apply(SessionEvent::RatingSaved).expect("saved");
        session
            .apply(SessionEvent::PhotoLoadFailed("timeout".to_string()))
            .expect("failure");

        assert_eq!(session.state(), SessionState::Exhausted);
        assert!(session.current_photo().is_none());
        assert_eq!(session.draft(), &RatingDraft::default());
        assert!(!session.can_submit());
        assert_eq!(session.view().rated_count, 1);
    }

    #[test]
    fn load_failure_without_photo_waits_for_refresh() {
        let mut session = RatingSession::new(RatingPolicy::default());
        session.apply(SessionEvent::SignedIn(auth())).expect("sign in");
        session
            .apply(SessionEvent::PhotoLoadFailed("timeout".to_string()))
            .expect("failure");
        assert_eq!(session.state(), SessionState::Exhausted);
        assert!(session.current_photo().is_none());
    }

    #[test]
    fn recovery_suppresses_photo_loading() {
        let mut session = RatingSession::new(RatingPolicy::default());
        session
            .apply(SessionEvent::RecoveryDetected)
            .expect("recovery");
        let effect = session
            .apply(SessionEvent::SignedIn(auth()))
            .expect("recovery session");
        assert_eq!(effect, None);
        assert_eq!(session.state(), SessionState::PasswordResetPending);

        let effect = session
            .apply(SessionEvent::RecoveryFinished)
            .expect("cancel");
        assert!(matches!(effect, Some(SessionEffect::FetchNextPhoto(_))));
    }

    #[test]
    fn recovery_interrupts_an_active_rating() {
        let mut session = awaiting("p");
        session
            .apply(SessionEvent::RecoveryDetected)
            .expect("recovery");
        assert_eq!(session.state(), SessionState::PasswordResetPending);
        assert!(session.current_photo().is_none());
    }

    #[test]
    fn sign_out_clears_everything() {
        let mut session = awaiting("p");
        session.set_score(Dimension::Wealth, score(3)).expect("wealth");
        session.apply(SessionEvent::SignedOut).expect("sign out");
        let view = session.view();
        assert_eq!(view.state, SessionState::SignedOut);
        assert!(view.user_id.is_none());
        assert!(view.photo.is_none());
        assert_eq!(view.draft, RatingDraft::default());
    }

    #[test]
    fn token_refresh_does_not_reload() {
        let mut session = awaiting("p");
        let mut refreshed = auth();
        refreshed.access_token = "newer".to_string();
        let effect = session
            .apply(SessionEvent::SignedIn(refreshed))
            .expect("refresh");
        assert_eq!(effect, None);
        assert_eq!(session.auth().map(|a| a.access_token.as_str()), Some("newer"));
        assert_eq!(session.state(), SessionState::AwaitingRating);
    }
}
