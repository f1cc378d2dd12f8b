use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffectedApp {
    Forms,
    Digisign,
    Breeze,
    Bmui,
    Offers,
    Prime,
    Books,
    Other,
}

impl AffectedApp {
    pub const ALL: [AffectedApp; 8] = [
        AffectedApp::Forms,
        AffectedApp::Digisign,
        AffectedApp::Breeze,
        AffectedApp::Bmui,
        AffectedApp::Offers,
        AffectedApp::Prime,
        AffectedApp::Books,
        AffectedApp::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AffectedApp::Forms => "forms",
            AffectedApp::Digisign => "digisign",
            AffectedApp::Breeze => "breeze",
            AffectedApp::Bmui => "bmui",
            AffectedApp::Offers => "offers",
            AffectedApp::Prime => "prime",
            AffectedApp::Books => "books",
            AffectedApp::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AffectedApp::Forms => "Forms",
            AffectedApp::Digisign => "Digisign",
            AffectedApp::Breeze => "Breeze",
            AffectedApp::Bmui => "Brokerage Management",
            AffectedApp::Offers => "Offers",
            AffectedApp::Prime => "Prime",
            AffectedApp::Books => "Books",
            AffectedApp::Other => "Other",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|app| app.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactScope {
    One,
    Multiple,
    Brokerage,
    Everyone,
}

impl ImpactScope {
    pub const ALL: [ImpactScope; 4] = [
        ImpactScope::One,
        ImpactScope::Multiple,
        ImpactScope::Brokerage,
        ImpactScope::Everyone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactScope::One => "one",
            ImpactScope::Multiple => "multiple",
            ImpactScope::Brokerage => "brokerage",
            ImpactScope::Everyone => "everyone",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImpactScope::One => "Just one user",
            ImpactScope::Multiple => "Multiple user reports",
            ImpactScope::Brokerage => "An entire brokerage",
            ImpactScope::Everyone => "Everyone",
        }
    }

    /// Header glyph, escalating with the number of people affected.
    pub fn glyph(&self) -> &'static str {
        match self {
            ImpactScope::One => "\u{1F535}",
            ImpactScope::Multiple => "\u{1F7E1}",
            ImpactScope::Brokerage => "\u{1F7E0}",
            ImpactScope::Everyone => "\u{1F534}",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|scope| scope.as_str() == value)
    }
}

/// Parses the yes/no style answers accepted for boolean fields.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "on" | "enabled" => Some(true),
        "no" | "n" | "false" | "0" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub path: PathBuf,
}

impl Attachment {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "screenshot".to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketDraft {
    pub reporter_handle: String,
    pub affected_app: Option<AffectedApp>,
    pub impact_scope: Option<ImpactScope>,
    pub is_blocker: Option<bool>,
    pub reporter_email: String,
    pub subscriber_id: Option<String>,
    pub video_link: String,
    pub screenshots: Vec<Attachment>,
    pub forms_file_link: Option<String>,
    pub sign_envelope_link: Option<String>,
    pub prior_ticket_refs: Option<String>,
    pub description: String,
}

impl TicketDraft {
    /// Defaults preselected by the form: a single affected user, not a blocker.
    pub fn with_form_defaults() -> Self {
        Self {
            impact_scope: Some(ImpactScope::One),
            is_blocker: Some(false),
            ..Self::default()
        }
    }

    pub fn subscriber_id(&self) -> Option<&str> {
        present(&self.subscriber_id)
    }

    pub fn forms_file_link(&self) -> Option<&str> {
        present(&self.forms_file_link)
    }

    pub fn sign_envelope_link(&self) -> Option<&str> {
        present(&self.sign_envelope_link)
    }

    pub fn prior_ticket_refs(&self) -> Option<&str> {
        present(&self.prior_ticket_refs)
    }

    pub fn video_link(&self) -> Option<&str> {
        let trimmed = self.video_link.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub success: bool,
    pub permalink: String,
    pub channel: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_app_and_scope() {
        assert_eq!(AffectedApp::from_str(" BMUI "), Some(AffectedApp::Bmui));
        assert_eq!(AffectedApp::from_str("crm"), None);
        assert_eq!(ImpactScope::from_str("everyone"), Some(ImpactScope::Everyone));
    }

    #[test]
    fn parses_flags() {
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn deserializes_camel_case_draft() {
        let draft: TicketDraft = serde_json::from_str(
            r#"{
                "reporterHandle": "@zach",
                "affectedApp": "bmui",
                "impactScope": "brokerage",
                "isBlocker": true,
                "reporterEmail": "a@example.com",
                "subscriberId": "  ",
                "screenshots": [{"path": "/tmp/shot.png"}],
                "description": "broken"
            }"#,
        )
        .expect("draft");

        assert_eq!(draft.affected_app, Some(AffectedApp::Bmui));
        assert_eq!(draft.impact_scope, Some(ImpactScope::Brokerage));
        assert_eq!(draft.subscriber_id(), None);
        assert_eq!(draft.screenshots[0].file_name(), "shot.png");
        assert_eq!(draft.video_link(), None);
    }
}
