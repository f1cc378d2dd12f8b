use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::domain::schema::{self, Field, FieldError, ValidationErrors};
use crate::domain::ticket::{AffectedApp, Attachment, ImpactScope, TicketDraft, parse_flag};
use crate::form::visibility::{FormStep, LEADING_FIELDS, step_for};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBlocked {
    /// A submission is already in flight.
    InFlight,
    /// The selected app is handled elsewhere, or none is selected.
    NotOffered,
    Invalid(ValidationErrors),
}

/// In-memory form state: the draft, which fields were visited, and the errors from the
/// last whole-draft validation.
#[derive(Debug, Clone)]
pub struct FormSession {
    draft: TicketDraft,
    touched: BTreeSet<Field>,
    errors: BTreeMap<Field, Vec<String>>,
    is_submitting: bool,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSession {
    pub fn new() -> Self {
        Self::from_draft(TicketDraft::with_form_defaults())
    }

    pub fn from_draft(draft: TicketDraft) -> Self {
        Self {
            draft,
            touched: BTreeSet::new(),
            errors: BTreeMap::new(),
            is_submitting: false,
        }
    }

    pub fn draft(&self) -> &TicketDraft {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Updates one field from user input. Unrecognised choices clear the field.
    pub fn set_value(&mut self, field: Field, raw: &str) {
        if field == Field::Screenshots {
            self.clear_screenshots();
            for path in raw.split(',').map(str::trim).filter(|path| !path.is_empty()) {
                self.add_screenshot(path);
            }
            return;
        }

        let text = raw.trim().to_string();
        let optional = (!text.is_empty()).then(|| text.clone());
        let draft = &mut self.draft;
        match field {
            Field::ReporterHandle => draft.reporter_handle = text,
            Field::AffectedApp => draft.affected_app = AffectedApp::from_str(&text),
            Field::ImpactScope => draft.impact_scope = ImpactScope::from_str(&text),
            Field::IsBlocker => draft.is_blocker = parse_flag(&text),
            Field::ReporterEmail => draft.reporter_email = text,
            Field::SubscriberId => draft.subscriber_id = optional,
            Field::VideoLink => draft.video_link = text,
            Field::Screenshots => {}
            Field::FormsFileLink => draft.forms_file_link = optional,
            Field::SignEnvelopeLink => draft.sign_envelope_link = optional,
            Field::PriorTicketRefs => draft.prior_ticket_refs = optional,
            Field::Description => draft.description = text,
        }
    }

    pub fn add_screenshot(&mut self, path: impl Into<PathBuf>) {
        self.draft.screenshots.push(Attachment::new(path));
    }

    pub fn clear_screenshots(&mut self) {
        self.draft.screenshots.clear();
    }

    /// Marks the field visited and re-validates the entire draft.
    pub fn blur(&mut self, field: Field) {
        self.touched.insert(field);
        let _ = self.revalidate();
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn errors(&self, field: Field) -> &[String] {
        self.errors.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Errors worth showing: those on fields the user has already visited.
    pub fn visible_errors(&self) -> Vec<FieldError> {
        self.errors
            .iter()
            .filter(|(field, _)| self.is_touched(**field))
            .flat_map(|(field, messages)| {
                messages.iter().map(|message| FieldError {
                    field: *field,
                    message: message.clone(),
                })
            })
            .collect()
    }

    pub fn step(&self) -> FormStep {
        step_for(self.draft.affected_app)
    }

    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && self.step().is_submittable()
    }

    /// Validates everything shown and, if clean, hands out the draft for sending.
    pub fn begin_submit(&mut self) -> Result<TicketDraft, SubmitBlocked> {
        if self.is_submitting {
            return Err(SubmitBlocked::InFlight);
        }
        let FormStep::Fields(fields) = self.step() else {
            return Err(SubmitBlocked::NotOffered);
        };

        self.touched.extend(LEADING_FIELDS);
        self.touched.extend(fields);

        if let Err(errors) = self.revalidate() {
            return Err(SubmitBlocked::Invalid(errors));
        }

        self.is_submitting = true;
        Ok(self.draft.clone())
    }

    /// Ends an in-flight submission. A successful one discards the draft.
    pub fn finish_submit(&mut self, succeeded: bool) {
        self.is_submitting = false;
        if succeeded {
            *self = Self::new();
        }
    }

    fn revalidate(&mut self) -> Result<(), ValidationErrors> {
        self.errors.clear();
        let result = schema::validate(&self.draft);
        if let Err(errors) = &result {
            for error in errors.iter() {
                self.errors.entry(error.field).or_insert_with(|| {
                    errors
                        .for_field(error.field)
                        .map(|error| error.message.clone())
                        .collect()
                });
            }
        }
        result
    }
}
