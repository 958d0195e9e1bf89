// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
mod cli;
mod render;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use askbox_config::Config;
use askbox_core::{ControllerEvent, ConversationController, IgnoreReason, Phase, SubmitOutcome};
use askbox_model::{Responder, Role};
use askbox_search::{SearchAugmenter, SerpApiSearch};
use askbox_store::PersistenceStore;
use cli::{Cli, Commands};

const HELP: &str = "\
Commands:
  /clear     start over from the greeting
  /time N    toggle the full timestamp of message N
  /history   print the whole conversation
  /help      show this help
  /quit      leave (Ctrl-D works too)";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Some(cmd) = &cli.command {
        match cmd {
            Commands::Completions { shell } => {
                cli::print_completions(*shell);
            }
            Commands::ShowConfig => {
                let loaded = askbox_config::load_layers(cli.config.as_deref())?;
                for source in &loaded.sources {
                    println!("# loaded from {}", source.display());
                }
                let shown = loaded.config.redacted();
                print!("{}", toml::to_string(&shown).context("serializing configuration")?);
            }
            Commands::History => {
                let config = askbox_config::load(cli.config.as_deref())?;
                match open_store(&config, cli.ephemeral).load() {
                    Some(snapshot) => {
                        for (i, msg) in snapshot.messages.iter().enumerate() {
                            println!("{}", render::message(msg, i));
                        }
                    }
                    None => println!("No saved conversation."),
                }
            }
            Commands::Clear => {
                let config = askbox_config::load(cli.config.as_deref())?;
                open_store(&config, cli.ephemeral).clear()?;
                println!("Conversation history cleared.");
            }
        }
        return Ok(());
    }

    let config = askbox_config::load(cli.config.as_deref())?;
    let controller = build_controller(&config, cli.ephemeral)?;

    match cli.prompt.as_deref() {
        Some(prompt) => run_once(&controller, prompt).await,
        None => run_repl(&controller).await,
    }
}

fn open_store(config: &Config, ephemeral: bool) -> PersistenceStore {
    if ephemeral {
        PersistenceStore::memory(&config.storage)
    } else {
        PersistenceStore::file(&config.storage)
    }
}

fn build_controller(config: &Config, ephemeral: bool) -> anyhow::Result<ConversationController> {
    let responder: Arc<dyn Responder> = Arc::from(askbox_model::from_config(&config.generation)?);

    let search: Option<Arc<dyn SearchAugmenter>> = if config.search.enabled {
        let search = SerpApiSearch::from_config(&config.search).context("building search client")?;
        Some(Arc::new(search))
    } else {
        None
    };

    Ok(ConversationController::new(
        config.conversation.clone(),
        responder,
        search,
        open_store(config, ephemeral),
    ))
}

/// Answer a single prompt and print only the assistant's messages.
async fn run_once(controller: &ConversationController, prompt: &str) -> anyhow::Result<()> {
    let first_new = controller.messages().len();
    let outcome = submit(controller, prompt, first_new, false).await;
    if outcome == SubmitOutcome::Ignored(IgnoreReason::Blank) {
        anyhow::bail!("empty prompt");
    }
    Ok(())
}

async fn run_repl(controller: &ConversationController) -> anyhow::Result<()> {
    for (i, msg) in controller.messages().iter().enumerate() {
        println!("{}", render::message(msg, i));
    }
    eprintln!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let _ = std::io::stderr().flush();

        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        let line = line.trim();

        match line.split_once(' ').map_or((line, ""), |(c, a)| (c, a.trim())) {
            ("/quit" | "/exit", _) => break,
            ("/help", _) => eprintln!("{HELP}"),
            ("/history", _) => {
                for (i, msg) in controller.messages().iter().enumerate() {
                    println!("{}", render::message(msg, i));
                }
            }
            ("/clear", _) => {
                if controller.clear_history() {
                    for (i, msg) in controller.messages().iter().enumerate() {
                        println!("{}", render::message(msg, i));
                    }
                } else {
                    eprintln!("busy; try again when the answer has arrived");
                }
            }
            ("/time", arg) => match arg.parse::<usize>() {
                Ok(index) if controller.toggle_time(index) => {
                    if let Some(msg) = controller.messages().get(index) {
                        println!("{}", render::message(msg, index));
                    }
                }
                _ => eprintln!("usage: /time N  (N is a message number)"),
            },
            (cmd, _) if cmd.starts_with('/') => eprintln!("unknown command {cmd}; try /help"),
            _ => {
                let first_new = controller.messages().len();
                submit(controller, line, first_new, true).await;
            }
        }
    }
    Ok(())
}

/// Run one turn, printing messages as the controller appends them.
/// Numbering starts at `first_new`, the log length before the turn.
async fn submit(
    controller: &ConversationController,
    input: &str,
    first_new: usize,
    echo_user: bool,
) -> SubmitOutcome {
    let (tx, mut rx) = mpsc::channel(64);

    let printer = async {
        let mut index = first_new;
        while let Some(event) = rx.recv().await {
            match event {
                ControllerEvent::MessageAppended(msg) => {
                    if msg.role == Role::Assistant || echo_user {
                        println!("{}", render::message(&msg, index));
                    }
                    index += 1;
                }
                ControllerEvent::PhaseChanged(Phase::AwaitingResponse) => eprintln!("thinking…"),
                ControllerEvent::PhaseChanged(Phase::Idle)
                | ControllerEvent::Persisted
                | ControllerEvent::TurnComplete => {}
            }
        }
    };

    let (outcome, ()) = tokio::join!(controller.submit(input, tx), printer);
    if outcome == SubmitOutcome::Ignored(IgnoreReason::Busy) {
        warn!("submission ignored: still waiting for the previous answer");
    }
    outcome
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
