//! murmur - console front-end for the speech synthesis queue.
//!
//! Commands: `/start`, `/gen <text>`, `/status`, `/quit`.

mod config;
mod console;
mod synth;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use murmur_core::domain::Submitter;
use murmur_core::impls::LocalArtifactStore;
use murmur_core::{Dispatcher, DispatcherBuilder};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Args, CliConfig};
use crate::console::{ConsoleSink, ConsoleTransport};
use crate::synth::CommandSynthesizer;

enum Command<'a> {
    Start,
    Generate(&'a str),
    Status,
    Quit,
    Unknown,
}

fn parse(line: &str) -> Command<'_> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match head {
        "/start" => Command::Start,
        "/gen" => Command::Generate(rest.trim()),
        "/status" => Command::Status,
        "/quit" => Command::Quit,
        _ => Command::Unknown,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = CliConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let store = LocalArtifactStore::new(&config.queue.artifact_dir);
    store
        .prepare()
        .with_context(|| format!("preparing {}", store.dir().display()))?;

    let synthesizer = CommandSynthesizer::new(
        config.synthesis_command.clone(),
        config.queue.voice_reference.clone(),
        store.clone(),
    );
    let dispatcher = DispatcherBuilder::new(config.queue)
        .synthesizer(Arc::new(synthesizer))
        .transport(Arc::new(ConsoleTransport::new(&args.outbox)))
        .artifacts(Arc::new(store))
        .build()?;

    let user = Submitter::new("console", args.user);
    info!(submitter = %user, "murmur ready");
    run(&dispatcher, &user).await;

    info!("waiting for queued requests to finish");
    dispatcher.wait_idle().await;
    Ok(())
}

async fn run(dispatcher: &Dispatcher, user: &Submitter) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut requests = 0u64;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "reading input failed");
                dispatcher.on_fault(&e, Some(user)).await;
                break;
            }
        };

        match parse(&line) {
            Command::Start => println!("{}", dispatcher.welcome(user)),
            Command::Status => println!("{}", dispatcher.status()),
            Command::Generate(text) => {
                requests += 1;
                let sink = Arc::new(ConsoleSink::new(requests));
                match dispatcher.submit(text, user.clone(), sink).await {
                    Ok(receipt) => println!("   [#{requests}] {}", receipt.message()),
                    Err(e) => println!("{}", dispatcher.rejection_message(&e)),
                }
            }
            Command::Quit => break,
            Command::Unknown if line.trim().is_empty() => {}
            Command::Unknown => println!("Commands: /start, /gen <text>, /status, /quit"),
        }
    }
}
