use std::io::{self, BufRead, Write};

use crate::domain::schema::Field;
use crate::domain::ticket::{AffectedApp, ImpactScope, TicketDraft};
use crate::error::{AppError, AppResult};
use crate::form::session::{FormSession, SubmitBlocked};
use crate::form::visibility::{FormStep, LEADING_FIELDS};

/// Walks a [`FormSession`] over a line-oriented terminal.
pub struct FormPrompt<R, W> {
    input: R,
    output: W,
}

pub enum PromptOutcome {
    Ready(TicketDraft),
    /// The chosen app is handled by another channel; its notice has been shown.
    Redirected,
}

impl<R: BufRead, W: Write> FormPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Collects answers until the draft passes validation, or the chosen app is handled elsewhere.
    pub fn run(&mut self, session: &mut FormSession) -> AppResult<PromptOutcome> {
        writeln!(self.output, "Agent Platform Support Form")?;
        writeln!(self.output, "Press Enter to keep the shown value, '-' to clear it.")?;
        writeln!(self.output)?;

        for field in LEADING_FIELDS {
            self.ask_until_clean(session, field)?;
        }

        let fields = match session.step() {
            FormStep::Fields(fields) => fields,
            FormStep::Redirect(notice) => {
                writeln!(self.output, "{notice}")?;
                return Ok(PromptOutcome::Redirected);
            }
            FormStep::AwaitingApp => {
                return Err(AppError::Io(io::Error::other("no app selected")));
            }
        };

        for field in &fields {
            self.ask_until_clean(session, *field)?;
        }

        loop {
            if !session.can_submit() {
                return Err(AppError::Io(io::Error::other(
                    "submission is not available right now",
                )));
            }
            match session.begin_submit() {
                Ok(draft) => return Ok(PromptOutcome::Ready(draft)),
                Err(SubmitBlocked::Invalid(errors)) => {
                    writeln!(self.output, "Please fix the following before submitting:")?;
                    for error in session.visible_errors() {
                        writeln!(self.output, "  {}: {}", label(error.field), error.message)?;
                    }
                    let pending = LEADING_FIELDS
                        .iter()
                        .chain(&fields)
                        .copied()
                        .filter(|field| errors.has(*field))
                        .collect::<Vec<_>>();
                    if pending.is_empty() {
                        return Err(AppError::Io(io::Error::other(
                            "the request has errors in fields this form does not show",
                        )));
                    }
                    for field in pending {
                        self.ask_until_clean(session, field)?;
                    }
                }
                Err(SubmitBlocked::NotOffered | SubmitBlocked::InFlight) => {
                    return Err(AppError::Io(io::Error::other(
                        "submission is not available right now",
                    )));
                }
            }
        }
    }

    fn ask_until_clean(&mut self, session: &mut FormSession, field: Field) -> AppResult<()> {
        loop {
            let current = current_value(session.draft(), field);
            match self.ask(field, current.as_deref())?.as_deref() {
                Some("-") => session.set_value(field, ""),
                Some(answer) => session.set_value(field, answer),
                None => {}
            }
            session.blur(field);

            let errors = session.errors(field);
            if errors.is_empty() {
                return Ok(());
            }
            for message in errors {
                writeln!(self.output, "  ! {message}")?;
            }
        }
    }

    fn ask(&mut self, field: Field, current: Option<&str>) -> AppResult<Option<String>> {
        if let Some(choices) = choices(field) {
            writeln!(self.output, "{}", label(field))?;
            for (value, text) in choices {
                writeln!(self.output, "  {value:<10} {text}")?;
            }
            self.write_marker(current)?;
        } else {
            write!(self.output, "{}", label(field))?;
            if let Some(hint) = hint(field) {
                write!(self.output, " ({hint})")?;
            }
            writeln!(self.output)?;
            self.write_marker(current)?;
        }
        self.output.flush()?;

        if field == Field::Description {
            return self.read_block();
        }

        let line = self.read_line()?;
        Ok((!line.is_empty()).then_some(line))
    }

    fn write_marker(&mut self, current: Option<&str>) -> AppResult<()> {
        match current {
            Some(value) => write!(self.output, "[{value}] > ")?,
            None => write!(self.output, "> ")?,
        }
        Ok(())
    }

    fn read_line(&mut self) -> AppResult<String> {
        let mut input = String::new();
        if self.input.read_line(&mut input)? == 0 {
            return Err(closed_input());
        }
        Ok(input.trim().to_string())
    }

    /// Reads lines up to the first blank one.
    fn read_block(&mut self) -> AppResult<Option<String>> {
        let mut lines = Vec::new();
        loop {
            let mut input = String::new();
            let read = self.input.read_line(&mut input)?;
            if read == 0 && lines.is_empty() {
                return Err(closed_input());
            }
            let line = input.trim_end_matches(['\r', '\n']);
            if read == 0 || line.trim().is_empty() {
                break;
            }
            lines.push(line.to_string());
        }
        if lines.is_empty() {
            Ok(None)
        } else {
            Ok(Some(lines.join("\n")))
        }
    }
}

fn closed_input() -> AppError {
    AppError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "input closed before the form was complete",
    ))
}

fn label(field: Field) -> &'static str {
    match field {
        Field::ReporterHandle => "What is your Slack username?",
        Field::AffectedApp => "Which app is this regarding?",
        Field::ImpactScope => "How many users are affected by this issue?",
        Field::IsBlocker => "Is this a blocker for them? (yes/no)",
        Field::ReporterEmail => "What is the email of the account reporting the issue?",
        Field::SubscriberId => "What is the subscriber ID for this user's brokerage?",
        Field::VideoLink => "Provide a link to a video screen recording of the issue.",
        Field::Screenshots => {
            "Are there any screenshots that would be useful in addition to your video?"
        }
        Field::FormsFileLink => "Do you have a link to the Forms File in question?",
        Field::SignEnvelopeLink => "Do you have a link to the Digisign envelope in question?",
        Field::PriorTicketRefs => {
            "Have you created any tickets regarding this issue, or has it been reported before?"
        }
        Field::Description => "Describe the issue. How can we reproduce it?",
    }
}

fn hint(field: Field) -> Option<&'static str> {
    match field {
        Field::ReporterHandle => Some("e.g. @Zach"),
        Field::ReporterEmail => Some("separate several with commas"),
        Field::VideoLink => Some("https://jam.dev is a great free tool"),
        Field::Screenshots => Some("comma-separated file paths, up to 10"),
        Field::FormsFileLink => Some("https://forms.skyslope.com/file/582106/documents"),
        Field::SignEnvelopeLink => Some("https://send.skyslope.com/envelopes/<id>"),
        Field::PriorTicketRefs => Some("https://skyslope.atlassian.net/browse/AP-789"),
        Field::Description => Some("finish with an empty line"),
        _ => None,
    }
}

fn choices(field: Field) -> Option<Vec<(&'static str, &'static str)>> {
    match field {
        Field::AffectedApp => Some(
            AffectedApp::ALL
                .iter()
                .map(|app| (app.as_str(), app.display_name()))
                .collect(),
        ),
        Field::ImpactScope => Some(
            ImpactScope::ALL
                .iter()
                .map(|scope| (scope.as_str(), scope.label()))
                .collect(),
        ),
        _ => None,
    }
}

fn current_value(draft: &TicketDraft, field: Field) -> Option<String> {
    let text = |value: &str| (!value.trim().is_empty()).then(|| value.trim().to_string());
    match field {
        Field::ReporterHandle => text(&draft.reporter_handle),
        Field::AffectedApp => draft.affected_app.map(|app| app.as_str().to_string()),
        Field::ImpactScope => draft.impact_scope.map(|scope| scope.as_str().to_string()),
        Field::IsBlocker => draft
            .is_blocker
            .map(|blocker| if blocker { "yes" } else { "no" }.to_string()),
        Field::ReporterEmail => text(&draft.reporter_email),
        Field::SubscriberId => draft.subscriber_id().map(str::to_string),
        Field::VideoLink => text(&draft.video_link),
        Field::Screenshots => (!draft.screenshots.is_empty()).then(|| {
            draft
                .screenshots
                .iter()
                .map(|file| file.path().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }),
        Field::FormsFileLink => draft.forms_file_link().map(str::to_string),
        Field::SignEnvelopeLink => draft.sign_envelope_link().map(str::to_string),
        Field::PriorTicketRefs => draft.prior_ticket_refs().map(str::to_string),
        Field::Description => text(&draft.description).map(|_| "keep current".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn run_with(input: &str) -> (AppResult<PromptOutcome>, String) {
        let mut session = FormSession::new();
        let mut output = Vec::new();
        let result = FormPrompt::new(Cursor::new(input.as_bytes()), &mut output).run(&mut session);
        (result, String::from_utf8(output).expect("utf8"))
    }

    #[test]
    fn collects_a_complete_draft() {
        let input = "@zach\nforms\nbrokerage\n\nme@example.com\nhttps://jam.dev/c/1\n\nhttps://forms.skyslope.com/file/1\nAP-789\nOpen the file\nClick save\n\n";
        let (result, _) = run_with(input);

        let Ok(PromptOutcome::Ready(draft)) = result else {
            panic!("expected a ready draft");
        };
        assert_eq!(draft.affected_app, Some(AffectedApp::Forms));
        assert_eq!(draft.impact_scope, Some(ImpactScope::Brokerage));
        assert_eq!(draft.is_blocker, Some(false));
        assert_eq!(
            draft.forms_file_link(),
            Some("https://forms.skyslope.com/file/1")
        );
        assert_eq!(draft.description, "Open the file\nClick save");
    }

    #[test]
    fn reprompts_invalid_answers() {
        let input = "@zach\nbreeze\n\n\nbad-email\nme@example.com\nhttps://jam.dev/c/1\n\n\nSteps\n\n";
        let (result, output) = run_with(input);

        assert!(matches!(result, Ok(PromptOutcome::Ready(_))));
        assert!(output.contains("! Invalid email"));
    }

    #[test]
    fn dash_clears_a_default() {
        let input = "@zach\nbreeze\n\n-\nyes\nme@example.com\nhttps://jam.dev/c/1\n\n\nSteps\n\n";
        let (result, output) = run_with(input);

        let Ok(PromptOutcome::Ready(draft)) = result else {
            panic!("expected a ready draft");
        };
        assert_eq!(draft.is_blocker, Some(true));
        assert!(output.contains("! Required"));
    }

    #[test]
    fn redirect_app_stops_with_notice() {
        let (result, output) = run_with("@zach\nbooks\n");
        assert!(matches!(result, Ok(PromptOutcome::Redirected)));
        assert!(output.contains("#books-support"));
    }

    #[test]
    fn closed_input_is_an_error() {
        let (result, _) = run_with("@zach\n");
        assert!(matches!(result, Err(AppError::Io(ref err)) if err.kind() == io::ErrorKind::UnexpectedEof));
    }
}
