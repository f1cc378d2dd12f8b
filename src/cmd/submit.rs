use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::context::AppContext;
use crate::domain::schema::validate;
use crate::domain::ticket::{SubmissionResult, TicketDraft};
use crate::error::{AppError, AppResult};
use crate::form::prompt::{FormPrompt, PromptOutcome};
use crate::form::visibility::redirect_notice;
use crate::form::{FormSession, SubmitBlocked};
use crate::workflow::submission::submit_ticket;

#[derive(Debug, Clone)]
pub struct SubmitCommandArgs {
    pub draft_file: Option<PathBuf>,
}

/// Returns `None` when the chosen app is handled by another channel and nothing was sent.
pub async fn run(ctx: &AppContext, args: SubmitCommandArgs) -> AppResult<Option<SubmissionResult>> {
    let (mut session, draft) = match args.draft_file {
        Some(path) => {
            let mut session = FormSession::from_draft(read_draft(&path)?);
            match session.begin_submit() {
                Ok(draft) => (session, draft),
                Err(blocked) => return blocked_file_draft(&session, blocked),
            }
        }
        None => {
            let mut session = FormSession::new();
            let outcome = FormPrompt::new(io::stdin().lock(), io::stdout().lock()).run(&mut session)?;
            match outcome {
                PromptOutcome::Ready(draft) => (session, draft),
                PromptOutcome::Redirected => return Ok(None),
            }
        }
    };

    let result = submit_ticket(ctx, draft).await;
    session.finish_submit(result.is_ok());
    result.map(Some)
}

fn read_draft(path: &Path) -> AppResult<TicketDraft> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|err| {
        AppError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid draft file {}: {err}", path.display()),
        ))
    })
}

fn blocked_file_draft(
    session: &FormSession,
    blocked: SubmitBlocked,
) -> AppResult<Option<SubmissionResult>> {
    match blocked {
        SubmitBlocked::Invalid(errors) => Err(AppError::Validation(errors)),
        SubmitBlocked::NotOffered => match session.draft().affected_app.and_then(redirect_notice) {
            Some(notice) => {
                println!("{notice}");
                Ok(None)
            }
            None => Err(AppError::Validation(
                validate(session.draft()).err().unwrap_or_default(),
            )),
        },
        SubmitBlocked::InFlight => Err(AppError::Io(io::Error::other(
            "a submission is already in progress",
        ))),
    }
}
