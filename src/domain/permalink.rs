#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permalink(pub String);

impl Permalink {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Message ids in archive links are the timestamp with its decimal point removed.
    pub fn from_parts(workspace_id: &str, channel_id: &str, timestamp: &str) -> Self {
        let message_id = timestamp.trim().replacen('.', "", 1);
        Self(format!(
            "https://{}.slack.com/archives/{}/p{}",
            workspace_id.trim(),
            channel_id.trim(),
            message_id
        ))
    }
}
