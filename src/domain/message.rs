use serde::Serialize;

use crate::domain::ticket::TicketDraft;

const CONTEXT_SEPARATOR: &str = " \u{2022} ";
const UNKNOWN_GLYPH: &str = "\u{26AA}";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub blocks: Vec<Block>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: PlainText,
    },
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Markdown>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<Markdown>,
    },
    Divider,
    Context {
        elements: Vec<Markdown>,
    },
}

impl Block {
    fn section(text: String) -> Self {
        Block::Section {
            text: Some(Markdown::new(text)),
            fields: Vec::new(),
        }
    }

    fn fields(fields: Vec<Markdown>) -> Self {
        Block::Section { text: None, fields }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlainText {
    #[serde(rename = "type")]
    text_type: &'static str,
    pub text: String,
    emoji: bool,
}

impl PlainText {
    fn new(text: String) -> Self {
        Self {
            text_type: "plain_text",
            text,
            emoji: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Markdown {
    #[serde(rename = "type")]
    text_type: &'static str,
    pub text: String,
}

impl Markdown {
    fn new(text: String) -> Self {
        Self {
            text_type: "mrkdwn",
            text,
        }
    }
}

/// Renders a validated draft as a Block Kit message, attaching any uploaded file ids.
pub fn build_message(draft: &TicketDraft, file_ids: Vec<String>) -> OutgoingMessage {
    let app_name = draft
        .affected_app
        .map(|app| app.display_name())
        .unwrap_or("Unknown app");
    let glyph = draft
        .impact_scope
        .map(|scope| scope.glyph())
        .unwrap_or(UNKNOWN_GLYPH);
    let impact = draft
        .impact_scope
        .map(|scope| scope.label())
        .unwrap_or("Unknown");

    let mut blocks = vec![Block::Header {
        text: PlainText::new(format!("{glyph} New Support Request - {app_name}")),
    }];

    let mut fields = vec![Markdown::new(format!("*Impact:*\n{impact}"))];
    if let Some(blocker) = draft.is_blocker {
        let answer = if blocker { "Yes" } else { "No" };
        fields.push(Markdown::new(format!("*Blocker:*\n{answer}")));
    }
    fields.push(Markdown::new(format!(
        "*Email:*\n{}",
        draft.reporter_email.trim()
    )));
    blocks.push(Block::fields(fields));

    blocks.push(Block::Divider);
    blocks.push(Block::section(format!(
        "*Description:*\n{}",
        draft.description.trim()
    )));

    if let Some(video) = draft.video_link() {
        blocks.push(Block::section(format!(
            "*Video Recording:*\n<{video}|View Video>"
        )));
    }
    if let Some(link) = draft.forms_file_link() {
        blocks.push(Block::section(format!(
            "*Forms File:*\n<{link}|View Forms File>"
        )));
    }
    if let Some(link) = draft.sign_envelope_link() {
        blocks.push(Block::section(format!(
            "*Digisign Envelope:*\n<{link}|View Envelope>"
        )));
    }

    let context = context_line(draft);
    if !context.is_empty() {
        blocks.push(Block::Context {
            elements: vec![Markdown::new(context)],
        });
    }

    OutgoingMessage {
        text: fallback_text(draft),
        blocks,
        files: file_ids,
    }
}

fn context_line(draft: &TicketDraft) -> String {
    let mut items = Vec::new();
    if let Some(subscriber) = draft.subscriber_id() {
        items.push(format!("*Subscriber ID:* {subscriber}"));
    }
    if !draft.screenshots.is_empty() {
        items.push(format!(
            "*Screenshots:* {} file(s)",
            draft.screenshots.len()
        ));
    }
    if let Some(refs) = draft.prior_ticket_refs() {
        items.push(format!("*Previous Tickets:* {refs}"));
    }
    items.join(CONTEXT_SEPARATOR)
}

fn fallback_text(draft: &TicketDraft) -> String {
    let scope = draft
        .impact_scope
        .map(|scope| scope.label())
        .unwrap_or("Unknown");
    let app = draft
        .affected_app
        .map(|app| app.display_name())
        .unwrap_or("Unknown app");
    let mut text = format!(
        "New support request for {app} ({scope}) from {}",
        draft.reporter_email.trim()
    );
    let handle = draft.reporter_handle.trim();
    if !handle.is_empty() {
        text.push_str(&format!(", reported by {handle}"));
    }
    text
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::ticket::{AffectedApp, Attachment, ImpactScope};

    fn draft() -> TicketDraft {
        TicketDraft {
            reporter_handle: "@zach".to_string(),
            affected_app: Some(AffectedApp::Bmui),
            impact_scope: Some(ImpactScope::Everyone),
            is_blocker: Some(true),
            reporter_email: "agent@example.com".to_string(),
            subscriber_id: Some("4411".to_string()),
            video_link: "https://jam.dev/c/abc".to_string(),
            screenshots: vec![Attachment::new("/tmp/a.png"), Attachment::new("/tmp/b.png")],
            prior_ticket_refs: Some("AP-789".to_string()),
            description: "Cannot open templates".to_string(),
            ..TicketDraft::default()
        }
    }

    #[test]
    fn builds_full_block_layout() {
        let message = build_message(&draft(), vec!["F1".to_string()]);
        let value = serde_json::to_value(&message).expect("serialize");

        assert_eq!(
            value["blocks"][0],
            json!({
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": "\u{1F534} New Support Request - Brokerage Management",
                    "emoji": true
                }
            })
        );
        assert_eq!(
            value["blocks"][1]["fields"],
            json!([
                {"type": "mrkdwn", "text": "*Impact:*\nEveryone"},
                {"type": "mrkdwn", "text": "*Blocker:*\nYes"},
                {"type": "mrkdwn", "text": "*Email:*\nagent@example.com"}
            ])
        );
        assert_eq!(value["blocks"][2], json!({"type": "divider"}));
        assert_eq!(
            value["blocks"][4]["text"]["text"],
            "*Video Recording:*\n<https://jam.dev/c/abc|View Video>"
        );
        assert_eq!(
            value["blocks"][5]["elements"][0]["text"],
            "*Subscriber ID:* 4411 \u{2022} *Screenshots:* 2 file(s) \u{2022} *Previous Tickets:* AP-789"
        );
        assert_eq!(value["files"], json!(["F1"]));
        assert_eq!(
            value["text"],
            "New support request for Brokerage Management (Everyone) from agent@example.com, reported by @zach"
        );
    }

    #[test]
    fn link_sections_follow_fixed_order() {
        let mut draft = draft();
        draft.forms_file_link = Some("https://forms.example.com/file/1".to_string());
        draft.sign_envelope_link = Some("https://send.skyslope.com/envelopes/ab-12".to_string());

        let message = build_message(&draft, Vec::new());
        let texts = message
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Section {
                    text: Some(text), ..
                } => Some(text.text.split(':').next().unwrap_or_default().to_string()),
                _ => None,
            })
            .collect::<Vec<_>>();

        assert_eq!(
            texts,
            vec!["*Description", "*Video Recording", "*Forms File", "*Digisign Envelope"]
        );
    }

    #[test]
    fn omits_context_and_files_when_absent() {
        let mut draft = draft();
        draft.subscriber_id = None;
        draft.screenshots.clear();
        draft.prior_ticket_refs = Some("   ".to_string());

        let message = build_message(&draft, Vec::new());
        assert!(
            !message
                .blocks
                .iter()
                .any(|block| matches!(block, Block::Context { .. }))
        );

        let value = serde_json::to_value(&message).expect("serialize");
        assert!(value.get("files").is_none());
    }
}
