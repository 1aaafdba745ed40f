use art_survey_application::{Notice, SessionState, SessionView, SyncProgress};
use art_survey_domain::{
    public_object_url, rationale_required, Dimension, DraftProblem, Photo, SyncReport,
};

pub fn present_photo(photo: &Photo, base_url: &str, bucket: &str) -> String {
    let url = public_object_url(base_url, bucket, photo.storage_path.as_str());
    if url.is_empty() {
        format!("photo {}\t{}", photo.id, photo.storage_path)
    } else {
        format!("photo {}\t{}", photo.id, url)
    }
}

pub fn present_notice(notice: &Notice) -> String {
    match notice {
        Notice::Info(message) => message.clone(),
        Notice::Error(message) => format!("error: {message}"),
    }
}

pub fn present_problem(problem: &DraftProblem) -> String {
    match problem {
        DraftProblem::Unselected(dimension) => format!("choose a {dimension} score"),
        DraftProblem::MissingRationale(dimension) => format!(
            "{dimension} rationale required (score differs from {})",
            dimension.neutral_default()
        ),
    }
}

pub fn present_view(view: &SessionView, base_url: &str, bucket: &str) -> String {
    let mut lines = Vec::new();
    if let Some(notice) = &view.notice {
        lines.push(present_notice(notice));
    }

    match view.state {
        SessionState::SignedOut => lines.push("signed out".to_string()),
        SessionState::PasswordResetPending => {
            lines.push("choose a new password: password <new> <confirm>".to_string())
        }
        SessionState::LoadingPhoto | SessionState::Submitting => {
            lines.push("loading...".to_string())
        }
        SessionState::Exhausted => {
            lines.push("No more photos available right now.".to_string())
        }
        SessionState::AwaitingRating => {
            if let Some(photo) = &view.photo {
                lines.push(present_photo(photo, base_url, bucket));
            }
            for dimension in Dimension::ALL {
                let input = view.draft.input(dimension);
                let score = input.displayed_score(dimension);
                let marker = if input.score.is_some() { "" } else { " (not chosen)" };
                let needs_why = if rationale_required(dimension, score) {
                    " [rationale required]"
                } else {
                    ""
                };
                lines.push(format!(
                    "  {:<16} {:>2}{marker}{needs_why}",
                    dimension.title(),
                    score.get()
                ));
                if !input.rationale.trim().is_empty() {
                    lines.push(format!("    why: {}", input.rationale.trim()));
                }
            }
            if view.can_submit {
                lines.push("ready: submit".to_string());
            } else {
                for problem in &view.problems {
                    lines.push(format!("  - {}", present_problem(problem)));
                }
            }
        }
    }

    if view.rated_count > 0 {
        lines.push(format!("rated this session: {}", view.rated_count));
    }

    lines.join("\n")
}

pub fn present_progress(progress: &SyncProgress) -> String {
    format!("Upserted {} / {}", progress.upserted, progress.total)
}

pub fn present_sync_report(report: &SyncReport, bucket: &str, root: &str) -> String {
    format!(
        "Found {} images in bucket {} under {}; upserted {} in {} chunks",
        report.discovered,
        bucket,
        if root.is_empty() { "/" } else { root },
        report.upserted,
        report.chunks
    )
}
