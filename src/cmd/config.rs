use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{
    DEFAULT_ALLOWED_DOMAIN, DEFAULT_API_BASE_URL, DEFAULT_WORKSPACE_ID, StoredConfig,
    config_file_path,
};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring intake.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Environment variables (SLACK_BOT_TOKEN, SLACK_CHANNEL_ID, ...) override these values.");
    println!();

    apply_prompt("Slack bot token (xoxb-...)", &mut cfg.slack_bot_token, true)?;
    apply_prompt("Slack channel ID", &mut cfg.slack_channel_id, false)?;
    apply_prompt(
        "Slack workspace subdomain (default: skyslope)",
        &mut cfg.slack_workspace_id,
        false,
    )?;
    apply_prompt("Your email address", &mut cfg.user_email, false)?;

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("Slack bot token: {}", mask_secret(&cfg.slack_bot_token));
    println!("Slack channel ID: {}", display_value(&cfg.slack_channel_id));
    println!(
        "Slack workspace: {}",
        display_or_default(&cfg.slack_workspace_id, DEFAULT_WORKSPACE_ID)
    );
    println!(
        "Slack API base URL: {}",
        display_or_default(&cfg.slack_api_base_url, DEFAULT_API_BASE_URL)
    );
    println!("User email: {}", display_value(&cfg.user_email));
    println!(
        "Allowed sign-in domain: {}",
        display_or_default(&cfg.allowed_domain, DEFAULT_ALLOWED_DOMAIN)
    );

    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    match prompt(field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn prompt(field: &str, current: Option<&str>, secret: bool) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match (current, secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(PromptAction::parse(&input))
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn display_or_default(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| format!("{default} (default)"))
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let prefix = token.chars().take(3).collect::<String>();
            let mut suffix = token.chars().rev().take(3).collect::<Vec<_>>();
            suffix.reverse();
            format!("{prefix}***{}", suffix.into_iter().collect::<String>())
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

impl PromptAction {
    fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            PromptAction::Keep
        } else if trimmed == "-" {
            PromptAction::Clear
        } else {
            PromptAction::Set(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_bot_token() {
        assert_eq!(
            mask_secret(&Some("xoxb-1234-abcd".to_string())),
            "xox***bcd"
        );
        assert_eq!(mask_secret(&Some("short".to_string())), "***");
        assert_eq!(mask_secret(&None), "<not set>");
    }

    #[test]
    fn mask_secret_keeps_multibyte_characters_whole() {
        assert_eq!(mask_secret(&Some("xo€-token".to_string())), "xo€***ken");
        assert_eq!(mask_secret(&Some("tok-ab€".to_string())), "tok***ab€");
    }

    #[test]
    fn shows_defaults_for_unset_values() {
        assert_eq!(
            display_or_default(&None, DEFAULT_WORKSPACE_ID),
            "skyslope (default)"
        );
        assert_eq!(display_or_default(&Some("acme".into()), "x"), "acme");
    }

    #[test]
    fn parses_prompt_answers() {
        assert_eq!(PromptAction::parse("\n"), PromptAction::Keep);
        assert_eq!(PromptAction::parse(" - \n"), PromptAction::Clear);
        assert_eq!(
            PromptAction::parse("C123\n"),
            PromptAction::Set("C123".to_string())
        );
    }
}
