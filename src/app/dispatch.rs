use crate::answer::AnswerService;
use crate::cli::commands::{Cli, Commands};
use crate::config::Config;
use crate::error::TransportError;
use crate::llm::types::{FormatHint, HistoryMessage};
use crate::transport::{Attachment, HttpGateway, MessageGateway, OutboundMessage};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::app::status::render_status;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Ask {
            question,
            context,
            history_file,
            format,
            probe,
        } => run_ask(&config, &question, context.as_deref(), history_file.as_deref(), format, probe).await,
        Commands::Status { probe } => run_status(&config, probe).await,
        Commands::Send {
            to,
            attachments,
            agent,
            text,
        } => run_send(&config, to, attachments, agent, text).await,
    }
}

async fn run_ask(
    config: &Config,
    question: &str,
    context: Option<&str>,
    history_file: Option<&Path>,
    format: FormatHint,
    probe: bool,
) -> Result<()> {
    let history = match history_file {
        Some(path) => load_history(path).await?,
        None => Vec::new(),
    };

    let service = AnswerService::from_config(config)?;
    if probe && let Some(handshake) = service.handshake() {
        handshake.refresh().await;
    }

    let reply = service.answer(question, context, &history, format).await;
    println!("{}", reply.text);
    println!();
    match (&reply.provider_used, &reply.model_used) {
        (Some(provider), Some(model)) => println!("[{provider} / {model}]"),
        _ => println!("[no provider answered, {} failed attempts]", reply.failures.len()),
    }
    Ok(())
}

async fn run_status(config: &Config, probe: bool) -> Result<()> {
    let service = AnswerService::from_config(config)?;
    let snapshot = match (probe, service.handshake()) {
        (true, Some(handshake)) => Some(handshake.force_refresh().await),
        _ => None,
    };
    println!("{}", render_status(config, service.registry(), snapshot.as_deref()));
    Ok(())
}

async fn run_send(
    config: &Config,
    to: String,
    attachment_paths: Vec<PathBuf>,
    agent: Option<String>,
    text: String,
) -> Result<()> {
    let gateway = HttpGateway::from_config(&config.gateway).ok_or(TransportError::NotConfigured)?;

    let mut attachments = Vec::with_capacity(attachment_paths.len());
    for path in &attachment_paths {
        attachments.push(Attachment::from_path(path).await?);
    }

    let message = OutboundMessage {
        destination: to,
        text,
        attachments,
        agent,
    };
    let receipt = gateway.send(&message).await?;
    println!(
        "Delivered to {} ({})",
        receipt.jid,
        if receipt.message_ids.is_empty() {
            "no message id".to_string()
        } else {
            receipt.message_ids.join(", ")
        }
    );
    Ok(())
}

async fn load_history(path: &Path) -> Result<Vec<HistoryMessage>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("History file {} is not a JSON array of turns", path.display()))
}
