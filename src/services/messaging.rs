use async_trait::async_trait;

use crate::config::DeliveryTarget;
use crate::domain::message::OutgoingMessage;
use crate::domain::ticket::Attachment;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel: String,
    pub timestamp: String,
}

#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Uploads every attachment in one request, shared into the target channel.
    async fn upload_files(
        &self,
        target: &DeliveryTarget,
        files: &[Attachment],
    ) -> AppResult<Vec<UploadedFile>>;

    async fn post_message(
        &self,
        target: &DeliveryTarget,
        message: &OutgoingMessage,
    ) -> AppResult<PostedMessage>;
}
