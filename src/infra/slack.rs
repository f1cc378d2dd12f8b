use async_trait::async_trait;
use reqwest::{
    Client,
    header::AUTHORIZATION,
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::DeliveryTarget;
use crate::domain::message::{Block, OutgoingMessage};
use crate::domain::ticket::Attachment;
use crate::error::{AppError, AppResult};
use crate::services::{MessagingService, PostedMessage, UploadedFile};

pub struct SlackClient {
    http: Client,
    api_base_url: String,
}

impl SlackClient {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_base_url: api_base_url.into(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), method)
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    async fn upload_form(target: &DeliveryTarget, files: &[Attachment]) -> AppResult<Form> {
        let mut form = Form::new();
        for file in files {
            let bytes = tokio::fs::read(file.path()).await.map_err(|err| {
                AppError::AttachmentUpload(format!(
                    "failed to read {}: {err}",
                    file.path().display()
                ))
            })?;
            form = form.part("files", Part::bytes(bytes).file_name(file.file_name()));
        }
        Ok(form.text("channel_ids", target.channel_id.clone()))
    }
}

#[async_trait]
impl MessagingService for SlackClient {
    #[instrument(skip(self, target, files), fields(channel = %target.channel_id, count = files.len()))]
    async fn upload_files(
        &self,
        target: &DeliveryTarget,
        files: &[Attachment],
    ) -> AppResult<Vec<UploadedFile>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let form = Self::upload_form(target, files).await?;
        debug!("uploading attachments");

        let response = self
            .http
            .post(self.endpoint("files.uploadV2"))
            .header(AUTHORIZATION, Self::bearer(&target.bot_token))
            .multipart(form)
            .send()
            .await
            .map_err(|err| AppError::AttachmentUpload(format!("failed to call Slack: {err}")))?;

        let payload: SlackUploadResponse = response.json().await.map_err(|err| {
            AppError::AttachmentUpload(format!("failed to parse Slack response: {err}"))
        })?;

        if !payload.ok {
            return Err(AppError::AttachmentUpload(
                payload.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        Ok(payload
            .files
            .into_iter()
            .map(|file| UploadedFile {
                id: file.id,
                title: file.title,
            })
            .collect())
    }

    #[instrument(skip(self, target, message), fields(channel = %target.channel_id))]
    async fn post_message(
        &self,
        target: &DeliveryTarget,
        message: &OutgoingMessage,
    ) -> AppResult<PostedMessage> {
        let body = SlackPostMessageRequest {
            channel: &target.channel_id,
            text: &message.text,
            blocks: &message.blocks,
            files: &message.files,
        };
        debug!(blocks = message.blocks.len(), "posting message");

        let response = self
            .http
            .post(self.endpoint("chat.postMessage"))
            .header(AUTHORIZATION, Self::bearer(&target.bot_token))
            .json(&body)
            .send()
            .await
            .map_err(|err| AppError::Delivery(format!("failed to call Slack: {err}")))?;

        let status = response.status();
        let payload: SlackPostMessageResponse = response.json().await.map_err(|err| {
            AppError::Delivery(format!("failed to parse Slack response ({status}): {err}"))
        })?;

        if !payload.ok {
            return Err(AppError::Delivery(
                payload.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        let timestamp = payload
            .ts
            .filter(|ts| !ts.is_empty())
            .ok_or_else(|| AppError::Delivery("chat.postMessage response missing 'ts'".to_string()))?;

        Ok(PostedMessage {
            channel: payload.channel.unwrap_or_default(),
            timestamp,
        })
    }
}

#[derive(Serialize)]
struct SlackPostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    blocks: &'a [Block],
    #[serde(skip_serializing_if = "no_files")]
    files: &'a [String],
}

fn no_files(files: &&[String]) -> bool {
    files.is_empty()
}

#[derive(Deserialize)]
struct SlackUploadResponse {
    ok: bool,
    #[serde(default)]
    files: Vec<SlackFile>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct SlackFile {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Deserialize)]
struct SlackPostMessageResponse {
    ok: bool,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    error: Option<String>,
}
