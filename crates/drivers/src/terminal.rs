use std::io::{BufRead, Write};

use art_survey_adapters::present_view;
use art_survey_application::{
    ApplicationError, CancelPasswordResetCommand, CompletePasswordResetCommand,
    RefreshPhotoCommand, SessionState, SessionView, SetRationaleCommand, SetScoreCommand,
    SignInCommand, SignOutCommand, StartSessionCommand, SubmitRatingCommand, SurveyService,
};
use art_survey_domain::Dimension;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    Score(Dimension, i64),
    Why(Dimension, String),
    Submit,
    Refresh,
    Status,
    SignOut,
    Password { password: String, confirmation: String },
    Cancel,
    Help,
    Quit,
}

pub fn parse_terminal_command(line: &str) -> Result<TerminalCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "submit" => Ok(TerminalCommand::Submit),
        "refresh" => Ok(TerminalCommand::Refresh),
        "status" | "" => Ok(TerminalCommand::Status),
        "signout" => Ok(TerminalCommand::SignOut),
        "cancel" => Ok(TerminalCommand::Cancel),
        "help" | "?" => Ok(TerminalCommand::Help),
        "quit" | "exit" => Ok(TerminalCommand::Quit),
        "why" => {
            let (label, text) = rest
                .split_once(char::is_whitespace)
                .unwrap_or((rest, ""));
            let dimension = Dimension::from_label(label)
                .ok_or_else(|| format!("unknown dimension: {label}"))?;
            Ok(TerminalCommand::Why(dimension, text.trim().to_string()))
        }
        "password" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(password), Some(confirmation), None) => Ok(TerminalCommand::Password {
                    password: password.to_string(),
                    confirmation: confirmation.to_string(),
                }),
                _ => Err("usage: password <new> <confirm>".to_string()),
            }
        }
        other => {
            let dimension =
                Dimension::from_label(other).ok_or_else(|| format!("unknown command: {other}"))?;
            let value = rest
                .parse::<i64>()
                .map_err(|_| format!("usage: {dimension} <0-10>"))?;
            Ok(TerminalCommand::Score(dimension, value))
        }
    }
}

pub fn print_help(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "commands:")?;
    writeln!(out, "  wealth <0-10>          set the level of wealth")?;
    writeln!(out, "  relevance <0-10>       set the relevance")?;
    writeln!(out, "  why wealth <text>      rationale for wealth")?;
    writeln!(out, "  why relevance <text>   rationale for relevance")?;
    writeln!(out, "  submit | refresh | status | signout")?;
    writeln!(out, "  password <new> <confirm> | cancel")?;
    writeln!(out, "  help | quit")
}

/// Reads one trimmed line; `None` at end of input.
pub fn read_line(input: &mut dyn BufRead) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn prompt(
    label: &str,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> std::io::Result<Option<String>> {
    write!(out, "{label}: ")?;
    out.flush()?;
    read_line(input)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Quit,
    NeedsSignIn,
}

fn terminal_error(error: std::io::Error) -> ApplicationError {
    ApplicationError::Io(error.to_string())
}

pub struct Terminal<'a> {
    pub service: SurveyService,
    pub base_url: &'a str,
    pub bucket: &'a str,
}

impl Terminal<'_> {
    pub fn show(&self, view: &SessionView, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "{}", present_view(view, self.base_url, self.bucket))
    }

    /// Signs in interactively until it succeeds or input runs out.
    pub fn sign_in(
        &mut self,
        email: Option<String>,
        input: &mut dyn BufRead,
        out: &mut dyn Write,
    ) -> std::io::Result<bool> {
        let mut email = email;
        while self.service.view().state == SessionState::SignedOut {
            let address = match email.take() {
                Some(address) => address,
                None => match prompt("email", input, out)? {
                    Some(address) => address,
                    None => return Ok(false),
                },
            };
            let Some(password) = prompt("password", input, out)? else {
                return Ok(false);
            };
            match self.service.sign_in(SignInCommand {
                email: address,
                password,
            }) {
                Ok(view) => self.show(&view, out)?,
                Err(error) => writeln!(out, "error: {error}")?,
            }
        }
        Ok(true)
    }

    /// Starts from `link`, then alternates between signing in and the command
    /// loop until the user quits, signs out or input runs out.
    pub fn session(
        &mut self,
        link: Option<String>,
        email: Option<String>,
        input: &mut dyn BufRead,
        out: &mut dyn Write,
    ) -> Result<(), ApplicationError> {
        let view = self
            .service
            .start(StartSessionCommand { inbound_url: link })?;
        self.show(&view, out).map_err(terminal_error)?;

        let mut email = email;
        loop {
            if !self.sign_in(email.take(), input, out).map_err(terminal_error)? {
                return Ok(());
            }
            print_help(out).map_err(terminal_error)?;
            match self.run(input, out).map_err(terminal_error)? {
                LoopExit::Quit => return Ok(()),
                LoopExit::NeedsSignIn => {}
            }
        }
    }

    /// Runs commands until `quit`, end of input, or the session drops back
    /// to signed out.
    pub fn run(&mut self, input: &mut dyn BufRead, out: &mut dyn Write) -> std::io::Result<LoopExit> {
        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = read_line(input)? else {
                return Ok(LoopExit::Quit);
            };
            let command = match parse_terminal_command(&line) {
                Ok(command) => command,
                Err(message) => {
                    writeln!(out, "{message}")?;
                    continue;
                }
            };

            match command {
                TerminalCommand::Help => {
                    print_help(out)?;
                    continue;
                }
                TerminalCommand::Quit => return Ok(LoopExit::Quit),
                _ => {}
            }

            let signing_out = command == TerminalCommand::SignOut;
            match self.execute(command) {
                Ok(view) => self.show(&view, out)?,
                Err(error) => {
                    warn!(%error, "command failed");
                    writeln!(out, "error: {error}")?;
                }
            }
            if self.service.view().state == SessionState::SignedOut {
                // A cancelled or completed password reset also lands here.
                return Ok(if signing_out {
                    LoopExit::Quit
                } else {
                    LoopExit::NeedsSignIn
                });
            }
        }
    }

    fn execute(&mut self, command: TerminalCommand) -> Result<SessionView, ApplicationError> {
        match command {
            TerminalCommand::Score(dimension, value) => self
                .service
                .set_score(SetScoreCommand { dimension, value }),
            TerminalCommand::Why(dimension, rationale) => self
                .service
                .set_rationale(SetRationaleCommand {
                    dimension,
                    rationale,
                }),
            TerminalCommand::Submit => self.service.submit(SubmitRatingCommand),
            TerminalCommand::Refresh => self.service.refresh(RefreshPhotoCommand),
            TerminalCommand::SignOut => self.service.sign_out(SignOutCommand),
            TerminalCommand::Password {
                password,
                confirmation,
            } => self
                .service
                .complete_password_reset(CompletePasswordResetCommand {
                    password,
                    confirmation,
                }),
            TerminalCommand::Cancel => self
                .service
                .cancel_password_reset(CancelPasswordResetCommand),
            TerminalCommand::Status | TerminalCommand::Help | TerminalCommand::Quit => {
                Ok(self.service.view())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use art_survey_application::{
        AuthSession, Clock, IdentityProvider, RatingStore, SessionStore, SignUpOutcome,
    };
    use art_survey_domain::{Photo, Rating, RatingPolicy, UserId};

    use super::*;

    struct Identity;

    fn auth(user: &str) -> Result<AuthSession, ApplicationError> {
        Ok(AuthSession {
            access_token: format!("access-{user}"),
            refresh_token: None,
            user_id: UserId::new(user)?,
            email: None,
            expires_at: None,
        })
    }

    impl IdentityProvider for Identity {
        fn sign_up(&self, _email: &str, _password: &str) -> Result<SignUpOutcome, ApplicationError> {
            Ok(SignUpOutcome::ConfirmationRequired)
        }

        fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ApplicationError> {
            if password != "hunter22" {
                return Err(ApplicationError::Remote("Invalid login credentials".to_string()));
            }
            auth(email.split('@').next().unwrap_or_default())
        }

        fn sign_out(&self, _session: &AuthSession) -> Result<(), ApplicationError> {
            Ok(())
        }

        fn refresh(&self, _refresh_token: &str) -> Result<AuthSession, ApplicationError> {
            Err(ApplicationError::Remote("Refresh Token Not Found".to_string()))
        }

        fn current_user(&self, session: &AuthSession) -> Result<UserId, ApplicationError> {
            Ok(session.user_id.clone())
        }

        fn send_password_reset(&self, _email: &str, _redirect: &str) -> Result<(), ApplicationError> {
            Ok(())
        }

        fn update_password(
            &self,
            _session: &AuthSession,
            _new_password: &str,
        ) -> Result<(), ApplicationError> {
            Ok(())
        }

        fn exchange_recovery(
            &self,
            _access_token: &str,
            _refresh_token: Option<&str>,
        ) -> Result<AuthSession, ApplicationError> {
            Err(ApplicationError::Remote("Token has expired".to_string()))
        }
    }

    #[derive(Default)]
    struct Sessions(RefCell<Option<AuthSession>>);

    impl SessionStore for Sessions {
        fn load(&self) -> Result<Option<AuthSession>, ApplicationError> {
            Ok(self.0.borrow().clone())
        }

        fn save(&self, session: &AuthSession) -> Result<(), ApplicationError> {
            *self.0.borrow_mut() = Some(session.clone());
            Ok(())
        }

        fn clear(&self) -> Result<(), ApplicationError> {
            *self.0.borrow_mut() = None;
            Ok(())
        }
    }

    struct NoPhotos;

    impl RatingStore for NoPhotos {
        fn next_eligible_photo(
            &self,
            _session: &AuthSession,
            _max_raters: u32,
        ) -> Result<Option<Photo>, ApplicationError> {
            Ok(None)
        }

        fn upsert_rating(&self, _session: &AuthSession, _rating: &Rating) -> Result<(), ApplicationError> {
            Ok(())
        }
    }

    struct Epoch;

    impl Clock for Epoch {
        fn now_unix_seconds(&self) -> i64 {
            0
        }
    }

    fn terminal() -> Terminal<'static> {
        Terminal {
            service: SurveyService::new(
                Box::new(Identity),
                Box::<Sessions>::default(),
                Box::new(NoPhotos),
                Box::new(Epoch),
                RatingPolicy::default(),
                "http://localhost:3000/reset".to_string(),
            ),
            base_url: "",
            bucket: "art_photos",
        }
    }

    #[test]
    fn cancelled_reset_offers_a_sign_in() {
        let mut terminal = terminal();
        let mut input: &[u8] = b"cancel\nrater@example.com\nhunter22\nquit\n";
        let mut out = Vec::new();

        terminal
            .session(
                Some("/reset#access_token=stale&type=recovery".to_string()),
                None,
                &mut input,
                &mut out,
            )
            .expect("session");

        let transcript = String::from_utf8(out).expect("utf8");
        assert!(transcript.contains("error: Token has expired"), "{transcript}");
        assert!(transcript.contains("email: "), "{transcript}");
        assert_eq!(terminal.service.view().state, SessionState::Exhausted);
    }

    #[test]
    fn explicit_sign_out_ends_the_session() {
        let mut terminal = terminal();
        let mut input: &[u8] = b"rater@example.com\nhunter22\nsignout\nrater@example.com\n";
        let mut out = Vec::new();

        terminal
            .session(None, None, &mut input, &mut out)
            .expect("session");

        let transcript = String::from_utf8(out).expect("utf8");
        assert_eq!(transcript.matches("email: ").count(), 1, "{transcript}");
        assert_eq!(terminal.service.view().state, SessionState::SignedOut);
    }

    #[test]
    fn parses_scores_case_insensitively() {
        assert_eq!(
            parse_terminal_command("Wealth 7"),
            Ok(TerminalCommand::Score(Dimension::Wealth, 7))
        );
        assert_eq!(
            parse_terminal_command("relevance 0"),
            Ok(TerminalCommand::Score(Dimension::Relevance, 0))
        );
    }

    #[test]
    fn out_of_range_scores_are_left_to_the_service() {
        assert_eq!(
            parse_terminal_command("wealth 11"),
            Ok(TerminalCommand::Score(Dimension::Wealth, 11))
        );
        assert!(parse_terminal_command("wealth high").is_err());
    }

    #[test]
    fn rationale_keeps_the_full_text() {
        assert_eq!(
            parse_terminal_command("why relevance  gold  watch in frame "),
            Ok(TerminalCommand::Why(
                Dimension::Relevance,
                "gold  watch in frame".to_string()
            ))
        );
        assert_eq!(
            parse_terminal_command("why wealth"),
            Ok(TerminalCommand::Why(Dimension::Wealth, String::new()))
        );
    }

    #[test]
    fn password_needs_exactly_two_words() {
        assert_eq!(
            parse_terminal_command("password secret1 secret1"),
            Ok(TerminalCommand::Password {
                password: "secret1".to_string(),
                confirmation: "secret1".to_string(),
            })
        );
        assert!(parse_terminal_command("password secret1").is_err());
    }

    #[test]
    fn unknown_words_are_rejected() {
        assert!(parse_terminal_command("why beauty 3").is_err());
        assert!(parse_terminal_command("dance").is_err());
        assert_eq!(parse_terminal_command(""), Ok(TerminalCommand::Status));
    }

    #[test]
    fn read_line_reports_end_of_input() {
        let mut input: &[u8] = b"submit\n";
        assert_eq!(
            read_line(&mut input).expect("read"),
            Some("submit".to_string())
        );
        assert_eq!(read_line(&mut input).expect("read"), None);
    }
}
