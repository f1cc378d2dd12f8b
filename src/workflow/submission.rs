use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::domain::message::build_message;
use crate::domain::permalink::Permalink;
use crate::domain::schema::validate_for_submission;
use crate::domain::ticket::{SubmissionResult, TicketDraft};
use crate::error::{AppError, AppResult};

/// Posts a ticket to the support channel and returns a link to the posted message.
///
/// Steps run strictly in order: session check, validation, config resolution,
/// attachment upload, message post. A failed upload is logged and the message goes
/// out without attachments; anything failing after that aborts the submission.
pub async fn submit_ticket(ctx: &AppContext, draft: TicketDraft) -> AppResult<SubmissionResult> {
    let user = ctx.session.current_user().await?.ok_or_else(|| {
        AppError::Unauthenticated("sign in before submitting a request".to_string())
    })?;

    validate_for_submission(&draft)?;

    // Provider detail stays at debug so it only reaches the terminal under `-v`.
    let target = ctx
        .config
        .slack
        .resolve()
        .inspect_err(|err| debug!(%err, "slack integration is not configured"))?;

    let mut file_ids = Vec::new();
    if !draft.screenshots.is_empty() {
        match ctx.messaging.upload_files(&target, &draft.screenshots).await {
            Ok(files) => {
                debug!(
                    titles = ?files.iter().map(|file| file.title.as_str()).collect::<Vec<_>>(),
                    "attachments uploaded"
                );
                file_ids = files.into_iter().map(|file| file.id).collect();
            }
            Err(err) => {
                debug!(%err, "attachment upload failed");
                warn!("attachments could not be uploaded, sending the request without them");
            }
        }
    }

    let message = build_message(&draft, file_ids);

    let posted = ctx
        .messaging
        .post_message(&target, &message)
        .await
        .inspect_err(|err| debug!(%err, "failed to send support request"))?;

    let channel = if posted.channel.is_empty() {
        target.channel_id.clone()
    } else {
        posted.channel
    };
    let permalink = Permalink::from_parts(&target.workspace_id, &channel, &posted.timestamp);

    info!(
        submitted_by = %user.email,
        permalink = permalink.as_str(),
        "support request posted"
    );

    Ok(SubmissionResult {
        success: true,
        permalink: permalink.0,
        channel,
        timestamp: posted.timestamp,
    })
}
