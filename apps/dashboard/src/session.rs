//! Line-oriented interactive dashboard: the view is loaded once on entry and
//! then kept current by the synchronizer after each successful submission.

use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use client_core::{MutationIntent, ViewSynchronizer};
use shared::domain::UploadFile;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::render::Printer;

pub const HELP: &str = "\
commands:
  refresh                                  reload every dashboard section
  view                                     show the current view again
  upload [sales=<csv>] [reviews=<csv>]     upload one or both datasets
  query <text>                             ask the backend a question
  help                                     show this message
  quit | exit                              leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Refresh,
    View,
    Upload {
        sales: Option<PathBuf>,
        reviews: Option<PathBuf>,
    },
    Query(String),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<SessionCommand>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.trim().is_empty() {
        return Ok(None);
    }
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (trimmed, ""),
    };

    let command = match word {
        "refresh" => SessionCommand::Refresh,
        "view" => SessionCommand::View,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        "query" => {
            if rest.trim().is_empty() {
                return Err("query text is empty".to_string());
            }
            SessionCommand::Query(rest.to_string())
        }
        "upload" => parse_upload(rest)?,
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(Some(command))
}

fn parse_upload(args: &str) -> Result<SessionCommand, String> {
    let mut sales = None;
    let mut reviews = None;
    for token in args.split_whitespace() {
        match token.split_once('=') {
            Some(("sales", path)) if !path.is_empty() => sales = Some(PathBuf::from(path)),
            Some(("reviews", path)) if !path.is_empty() => reviews = Some(PathBuf::from(path)),
            _ => {
                return Err(format!(
                    "unexpected upload argument '{token}'; use sales=<csv> and/or reviews=<csv>"
                ))
            }
        }
    }
    Ok(SessionCommand::Upload { sales, reviews })
}

pub async fn read_upload(path: Option<&Path>) -> Result<Option<UploadFile>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read dataset '{}'", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string());
    Ok(Some(UploadFile::new(file_name, bytes)))
}

pub async fn run(sync: &ViewSynchronizer, printer: Printer) -> Result<()> {
    let view = sync.refresh().await;
    printer.view(&view, sync.last_refreshed_at().await)?;
    printer.notice("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !printer.json {
            print!("> ");
            std::io::stdout().flush().context("failed to flush prompt")?;
        }
        let Some(line) = lines.next_line().await.context("failed to read command")? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                printer.notice(&message);
                continue;
            }
        };
        debug!(?command, "interactive command");

        match command {
            SessionCommand::Quit => break,
            SessionCommand::Help => printer.notice(HELP),
            SessionCommand::View => {
                printer.view(&sync.current_view().await, sync.last_refreshed_at().await)?
            }
            SessionCommand::Refresh => {
                let view = sync.refresh().await;
                printer.view(&view, sync.last_refreshed_at().await)?;
            }
            SessionCommand::Upload { sales, reviews } => {
                let files = async {
                    Ok::<_, anyhow::Error>((
                        read_upload(sales.as_deref()).await?,
                        read_upload(reviews.as_deref()).await?,
                    ))
                };
                match files.await {
                    Ok((sales_file, reviews_file)) => {
                        submit(sync, printer, MutationIntent::upload(sales_file, reviews_file))
                            .await?
                    }
                    Err(err) => printer.notice(&format!("Error: {err:#}")),
                }
            }
            SessionCommand::Query(text) => {
                submit(sync, printer, MutationIntent::query(text)).await?
            }
        }
    }
    Ok(())
}

async fn submit(sync: &ViewSynchronizer, printer: Printer, intent: MutationIntent) -> Result<()> {
    let result = sync.submit(intent).await;
    printer.mutation(&result, &sync.current_view().await, sync.last_refreshed_at().await)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
