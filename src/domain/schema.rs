use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::domain::ticket::{AffectedApp, TicketDraft};

pub const MAX_SCREENSHOTS: usize = 10;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

static EMAIL_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").expect("separator pattern compiles"));

static ENVELOPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://send\.skyslope\.com/envelopes/[a-f0-9-]+")
        .expect("envelope pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    ReporterHandle,
    AffectedApp,
    ImpactScope,
    IsBlocker,
    ReporterEmail,
    SubscriberId,
    VideoLink,
    Screenshots,
    FormsFileLink,
    SignEnvelopeLink,
    PriorTicketRefs,
    Description,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ReporterHandle => "reporterHandle",
            Field::AffectedApp => "affectedApp",
            Field::ImpactScope => "impactScope",
            Field::IsBlocker => "isBlocker",
            Field::ReporterEmail => "reporterEmail",
            Field::SubscriberId => "subscriberId",
            Field::VideoLink => "videoLink",
            Field::Screenshots => "screenshots",
            Field::FormsFileLink => "formsFileLink",
            Field::SignEnvelopeLink => "signEnvelopeLink",
            Field::PriorTicketRefs => "priorTicketRefs",
            Field::Description => "description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &FieldError> {
        self.0.iter().filter(move |error| error.field == field)
    }

    pub fn has(&self, field: Field) -> bool {
        self.for_field(field).next().is_some()
    }

    fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&rendered)
    }
}

/// Apps this team does not handle; the form only shows a pointer elsewhere.
pub fn is_redirect_app(app: AffectedApp) -> bool {
    matches!(
        app,
        AffectedApp::Books | AffectedApp::Prime | AffectedApp::Other
    )
}

/// Validates the whole draft at once. Errors carry the path of the field they belong to.
pub fn validate(draft: &TicketDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let app = match draft.affected_app {
        Some(app) => app,
        None => {
            errors.push(Field::AffectedApp, "Please choose an app");
            validate_required(draft, &mut errors);
            validate_values(draft, &mut errors);
            return Err(errors);
        }
    };

    // Redirect apps require nothing further, but values that are present must still hold.
    if !is_redirect_app(app) {
        validate_required(draft, &mut errors);
    }
    validate_values(draft, &mut errors);

    if app == AffectedApp::Bmui && draft.subscriber_id().is_none() {
        errors.push(
            Field::SubscriberId,
            "Subscriber ID is required for BMUI issues",
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validation applied before anything is sent: the draft must also be for an app this form handles.
pub fn validate_for_submission(draft: &TicketDraft) -> Result<(), ValidationErrors> {
    validate(draft)?;
    match draft.affected_app {
        Some(app) if is_redirect_app(app) => {
            let mut errors = ValidationErrors::default();
            errors.push(
                Field::AffectedApp,
                format!("{} requests are not handled by this form", app.display_name()),
            );
            Err(errors)
        }
        _ => Ok(()),
    }
}

fn validate_required(draft: &TicketDraft, errors: &mut ValidationErrors) {
    if draft.reporter_handle.trim().is_empty() {
        errors.push(Field::ReporterHandle, "Required");
    }
    if draft.impact_scope.is_none() {
        errors.push(Field::ImpactScope, "Required");
    }
    if draft.is_blocker.is_none() {
        errors.push(Field::IsBlocker, "Required");
    }
    if draft.reporter_email.trim().is_empty() {
        errors.push(Field::ReporterEmail, "At least one email is required");
    }
    if draft.video_link.trim().is_empty() {
        errors.push(Field::VideoLink, "Invalid URL");
    }
    if draft.description.trim().is_empty() {
        errors.push(Field::Description, "Description is required");
    }
}

/// Format checks on whatever has been filled in.
fn validate_values(draft: &TicketDraft, errors: &mut ValidationErrors) {
    if !draft.reporter_email.trim().is_empty() && !emails_are_valid(&draft.reporter_email) {
        errors.push(Field::ReporterEmail, "Invalid email");
    }

    if !draft.video_link.trim().is_empty() && !is_url(&draft.video_link) {
        errors.push(Field::VideoLink, "Invalid URL");
    }

    if draft.screenshots.len() > MAX_SCREENSHOTS {
        errors.push(Field::Screenshots, "Maximum 10 files allowed");
    }

    if let Some(link) = draft.forms_file_link() {
        if !is_url(link) {
            errors.push(Field::FormsFileLink, "Invalid URL");
        }
    }

    if let Some(link) = draft.sign_envelope_link() {
        if !is_url(link) {
            errors.push(Field::SignEnvelopeLink, "Invalid URL");
        } else if !ENVELOPE_PATTERN.is_match(link) {
            errors.push(Field::SignEnvelopeLink, "Invalid Digisign envelope URL");
        }
    }
}

/// Splits a comma/whitespace separated list of addresses.
pub fn split_emails(value: &str) -> Vec<&str> {
    EMAIL_SEPARATOR
        .split(value)
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .collect()
}

fn emails_are_valid(value: &str) -> bool {
    let emails = split_emails(value);
    !emails.is_empty() && emails.into_iter().all(is_email)
}

fn is_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_PATTERN.is_match(email)
}

fn is_url(value: &str) -> bool {
    Url::parse(value.trim()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ticket::{Attachment, ImpactScope};

    fn valid_draft(app: AffectedApp) -> TicketDraft {
        TicketDraft {
            reporter_handle: "@zach".to_string(),
            affected_app: Some(app),
            impact_scope: Some(ImpactScope::One),
            is_blocker: Some(false),
            reporter_email: "agent@example.com".to_string(),
            video_link: "https://jam.dev/c/abc".to_string(),
            description: "Templates page crashes".to_string(),
            ..TicketDraft::default()
        }
    }

    #[test]
    fn accepts_complete_draft() {
        assert_eq!(validate(&valid_draft(AffectedApp::Forms)), Ok(()));
    }

    #[test]
    fn bmui_requires_subscriber_id() {
        let mut draft = valid_draft(AffectedApp::Bmui);
        draft.subscriber_id = Some(String::new());

        let errors = validate(&draft).unwrap_err();
        let messages = errors
            .for_field(Field::SubscriberId)
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>();
        assert_eq!(messages, vec!["Subscriber ID is required for BMUI issues"]);

        draft.subscriber_id = Some("12345".to_string());
        assert_eq!(validate(&draft), Ok(()));
    }

    #[test]
    fn subscriber_id_optional_for_other_apps() {
        assert_eq!(validate(&valid_draft(AffectedApp::Breeze)), Ok(()));
    }

    #[test]
    fn redirect_apps_require_nothing_else() {
        for app in [AffectedApp::Books, AffectedApp::Prime, AffectedApp::Other] {
            let draft = TicketDraft {
                affected_app: Some(app),
                ..TicketDraft::default()
            };
            assert_eq!(validate(&draft), Ok(()));
            assert!(validate_for_submission(&draft).unwrap_err().has(Field::AffectedApp));
        }
    }

    #[test]
    fn redirect_apps_still_check_present_values() {
        let draft = TicketDraft {
            affected_app: Some(AffectedApp::Books),
            reporter_email: "not-an-email".to_string(),
            screenshots: (0..11)
                .map(|i| Attachment::new(format!("/tmp/{i}.png")))
                .collect(),
            sign_envelope_link: Some("https://evil.example.com/x".to_string()),
            ..TicketDraft::default()
        };

        let errors = validate(&draft).unwrap_err();
        assert!(errors.has(Field::Screenshots));
        assert!(errors.has(Field::ReporterEmail));
        assert!(errors.has(Field::SignEnvelopeLink));
        assert!(!errors.has(Field::Description));
    }

    #[test]
    fn missing_app_is_reported() {
        let errors = validate(&TicketDraft::default()).unwrap_err();
        assert!(errors.has(Field::AffectedApp));
        assert!(errors.has(Field::Description));
    }

    #[test]
    fn accepts_multiple_emails() {
        let mut draft = valid_draft(AffectedApp::Offers);
        draft.reporter_email = "a@example.com, b@example.com\nc.d+x@sub.example.org".to_string();
        assert_eq!(validate(&draft), Ok(()));
    }

    #[test]
    fn rejects_any_malformed_email() {
        let mut draft = valid_draft(AffectedApp::Offers);
        for bad in [
            "a@example.com, not-an-email",
            "a@example.com b@",
            ".a@example.com",
            "a..b@example.com",
        ] {
            draft.reporter_email = bad.to_string();
            let errors = validate(&draft).unwrap_err();
            assert!(errors.has(Field::ReporterEmail), "{bad} should fail");
        }
    }

    #[test]
    fn rejects_more_than_ten_screenshots() {
        let mut draft = valid_draft(AffectedApp::Forms);
        draft.screenshots = (0..11)
            .map(|i| Attachment::new(format!("/tmp/{i}.png")))
            .collect();
        let errors = validate(&draft).unwrap_err();
        assert!(errors.has(Field::Screenshots));

        draft.screenshots.truncate(MAX_SCREENSHOTS);
        assert_eq!(validate(&draft), Ok(()));
    }

    #[test]
    fn envelope_link_must_match_prefix() {
        let mut draft = valid_draft(AffectedApp::Digisign);
        draft.sign_envelope_link =
            Some("https://send.skyslope.com/envelopes/1a7680f4-6752-4121-b033-d68711b1646e".into());
        assert_eq!(validate(&draft), Ok(()));

        for bad in [
            "https://example.com/envelopes/1a7680f4",
            "https://send.skyslope.com/envelopes/XYZ",
            "not a url",
        ] {
            draft.sign_envelope_link = Some(bad.to_string());
            let errors = validate(&draft).unwrap_err();
            assert!(errors.has(Field::SignEnvelopeLink), "{bad} should fail");
        }
    }

    #[test]
    fn video_link_must_be_url() {
        let mut draft = valid_draft(AffectedApp::Forms);
        draft.video_link = "jam dot dev".to_string();
        assert!(validate(&draft).unwrap_err().has(Field::VideoLink));
    }
}
