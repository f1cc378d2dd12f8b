mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod form;
mod infra;
mod services;
mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::submit::{self, SubmitCommandArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::infra::session::ConfiguredSession;
use crate::infra::slack::SlackClient;

#[derive(Parser)]
#[command(name = "intake", author, version, about = "Send support requests to the team's Slack channel")]
struct Cli {
    /// Log request details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in a support request and post it to Slack.
    Submit(SubmitArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct SubmitArgs {
    /// Read the request from a JSON file instead of prompting.
    #[arg(short, long)]
    draft: Option<PathBuf>,

    /// Print the submission result as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let submitting = matches!(cli.command, Commands::Submit(_));
    if let Err(error) = run(cli.command).await {
        report(&error, submitting);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

fn report(err: &AppError, submitting: bool) {
    for line in report_lines(err, submitting) {
        eprintln!("{line}");
    }
}

/// What the user sees for a failed command. Opaque submit failures are logged, not shown.
fn report_lines(err: &AppError, submitting: bool) -> Vec<String> {
    match err {
        AppError::Validation(errors) => {
            let mut lines = vec!["Error: the request is not valid:".to_string()];
            lines.extend(
                errors
                    .iter()
                    .map(|error| format!("  {}: {}", error.field, error.message)),
            );
            lines
        }
        err if submitting && err.is_opaque() => vec![
            "Error: could not submit your request. Please try again.".to_string(),
            "Run with --verbose for details.".to_string(),
        ],
        err => vec![format!("Error: {err}")],
    }
}

async fn run(command: Commands) -> AppResult<()> {
    match command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Submit(args) => run_submit(args).await,
    }
}

async fn run_submit(args: SubmitArgs) -> AppResult<()> {
    let config = AppConfig::load().inspect_err(|err| debug!(%err, "failed to load configuration"))?;

    let messaging = Arc::new(SlackClient::new(config.slack.api_base_url.clone()));
    let session = Arc::new(ConfiguredSession::new(
        config.user_email.clone(),
        config.allowed_domain.clone(),
    ));
    let context = AppContext::new(config, messaging, session);

    let outcome = submit::run(
        &context,
        SubmitCommandArgs {
            draft_file: args.draft,
        },
    )
    .await?;

    let Some(result) = outcome else {
        return Ok(());
    };

    if args.json {
        let rendered = serde_json::to_string_pretty(&result)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
    } else {
        println!("\nForm submitted successfully!");
        println!("Your support request has been sent to the team via Slack.");
        println!("View your message in Slack: {}", result.permalink);
    }

    Ok(())
}
