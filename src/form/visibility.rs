use crate::domain::schema::Field;
use crate::domain::ticket::AffectedApp;

/// What the form shows for the currently selected app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStep {
    AwaitingApp,
    Redirect(&'static str),
    Fields(Vec<Field>),
}

impl FormStep {
    pub fn is_submittable(&self) -> bool {
        matches!(self, FormStep::Fields(_))
    }
}

const BOOKS_NOTICE: &str = "The Agent Platform team does not support Books. The books support channel is #books-support: https://skyslope.slack.com/archives/C04QX8VGU56";
const PRIME_NOTICE: &str = "The Agent Platform team does not support Prime. The Prime support channel is #prime-core: https://skyslope.slack.com/archives/CMJT7VD61";
const OTHER_NOTICE: &str = "The Agent Platform team only supports the apps listed above. This request likely belongs in a different channel.";

/// Fields revealed only for one app, and the field they are shown after.
const CONDITIONAL_FIELDS: [(AffectedApp, Field, Field); 3] = [
    (AffectedApp::Bmui, Field::SubscriberId, Field::ReporterEmail),
    (AffectedApp::Forms, Field::FormsFileLink, Field::Screenshots),
    (AffectedApp::Digisign, Field::SignEnvelopeLink, Field::Screenshots),
];

/// Shown before an app is chosen, whatever it turns out to be.
pub const LEADING_FIELDS: [Field; 2] = [Field::ReporterHandle, Field::AffectedApp];

const BASE_FIELDS: [Field; 7] = [
    Field::ImpactScope,
    Field::IsBlocker,
    Field::ReporterEmail,
    Field::VideoLink,
    Field::Screenshots,
    Field::PriorTicketRefs,
    Field::Description,
];

pub fn redirect_notice(app: AffectedApp) -> Option<&'static str> {
    match app {
        AffectedApp::Books => Some(BOOKS_NOTICE),
        AffectedApp::Prime => Some(PRIME_NOTICE),
        AffectedApp::Other => Some(OTHER_NOTICE),
        _ => None,
    }
}

/// Evaluates the visibility table for the selected app. Fields after the leading ones are
/// listed in display order.
pub fn step_for(app: Option<AffectedApp>) -> FormStep {
    let Some(app) = app else {
        return FormStep::AwaitingApp;
    };
    if let Some(notice) = redirect_notice(app) {
        return FormStep::Redirect(notice);
    }

    let mut fields = Vec::with_capacity(BASE_FIELDS.len() + 1);
    for field in BASE_FIELDS {
        fields.push(field);
        for (only_for, extra, after) in CONDITIONAL_FIELDS {
            if only_for == app && after == field {
                fields.push(extra);
            }
        }
    }
    FormStep::Fields(fields)
}
