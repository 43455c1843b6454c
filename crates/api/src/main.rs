//! TalkReport - send monthly reports to KakaoTalk and export them as PDF
//!
//! Main entry point for the command line application.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use talkreport_lib::utils::logging::init_tracing;
use talkreport_lib::{commands, AppContext};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "talkreport", version, about)]
struct Cli {
    /// Config file (TOML or JSON); otherwise TALKREPORT_* variables, then
    /// the standard locations.
    #[arg(long, global = true, env = "TALKREPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Log as JSON lines on stderr.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in with Kakao in the browser.
    Login,
    /// Forget the stored Kakao session.
    Logout,
    /// Show whether a usable session exists.
    Status,
    /// Send one report digest to your own KakaoTalk chat.
    Send {
        /// JSON file holding one report.
        report: PathBuf,
    },
    /// Send every report in a JSON array, one after another.
    BulkSend {
        reports: PathBuf,
    },
    /// Export a rendered report as a paged PDF.
    ExportPdf {
        element_id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the PDF as base64 instead of writing a file.
        #[arg(long, conflicts_with = "output")]
        base64: bool,
    },
    /// Export a rendered report as one PNG.
    ExportPng {
        element_id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show recorded send attempts, newest first.
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        student: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn build_context(config: Option<PathBuf>) -> anyhow::Result<AppContext> {
    let context = match config {
        Some(path) => {
            let config = talkreport_infra::config::load_from_file(Some(path))?;
            AppContext::new_with_config(config).await
        }
        None => AppContext::new().await,
    };
    context.map_err(|err| anyhow::anyhow!("{}: {err}", err.user_message()))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = build_context(cli.config).await?;

    if !matches!(cli.command, Command::Login | Command::Logout) {
        if let Err(err) = commands::restore_session(&ctx).await {
            warn!(error = %err, "Continuing without a restored session");
        }
    }

    match cli.command {
        Command::Login => print_json(&commands::login(&ctx).await?)?,
        Command::Logout => {
            commands::logout(&ctx).await?;
            info!("Logged out");
        }
        Command::Status => print_json(&commands::status(&ctx).await)?,
        Command::Send { report: path } => {
            let reports = commands::load_reports(&path).await?;
            let [report] = reports.as_slice() else {
                bail!("{} holds {} reports; use bulk-send", path.display(), reports.len());
            };
            let result = commands::send_report(&ctx, report).await;
            print_json(&result)?;
            if !result.success {
                bail!(result.error_message.unwrap_or_else(|| "send failed".to_string()));
            }
        }
        Command::BulkSend { reports } => {
            let reports = commands::load_reports(&reports)
                .await
                .with_context(|| format!("reading {}", reports.display()))?;
            let summary = commands::bulk_send(&ctx, &reports).await;
            print_json(&summary)?;
        }
        Command::ExportPdf { element_id, base64: true, .. } => {
            println!("{}", commands::export_pdf_base64(&ctx, &element_id).await?);
        }
        Command::ExportPdf { element_id, output, .. } => {
            print_json(&commands::export_pdf(&ctx, &element_id, output.as_deref()).await?)?;
        }
        Command::ExportPng { element_id, output } => {
            print_json(&commands::export_png(&ctx, &element_id, output.as_deref()).await?)?;
        }
        Command::History { limit, student } => {
            print_json(&commands::send_history(&ctx, limit, student.as_deref()).await?)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing("info", cli.json_logs);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "Could not load .env file"),
    }

    run(cli).await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn base64_conflicts_with_output() {
        let parsed =
            Cli::try_parse_from(["talkreport", "export-pdf", "card", "--base64", "-o", "x.pdf"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn history_defaults_to_twenty() {
        let cli = Cli::try_parse_from(["talkreport", "history"]).unwrap();
        assert!(matches!(cli.command, Command::History { limit: 20, student: None }));
    }
}
