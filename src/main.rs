//! Murmur - Entry Point
//!
//! Runs the bot against the console transport: type on stdin, read replies
//! on stdout, logs go to stderr.

use anyhow::Context;
use murmur::config::default_config_path;
use murmur::nlp::language_code;
use murmur::{
    BasicExtractor, Bot, BotConfig, BotContext, ConsoleTransport, Corpus, CorpusLoader, Event,
    HttpFeedProvider, Thesaurus,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Value following `flag` on the command line
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn expand(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let help_mode = args.iter().any(|a| a == "--help" || a == "-h");
    let json_logs = args.iter().any(|a| a == "--json-logs");

    if help_mode {
        println!("Murmur v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: murmur [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --config <path>   Config file (default: ~/.murmur/murmur.json)");
        println!("  --corpus <path>   Corpus directory, overrides corpus_path");
        println!("  --nick <name>     Bot nickname, overrides nick");
        println!("  --json-logs       Log as JSON");
        println!("  --help, -h        Show this help");
        println!();
        println!("Environment variables:");
        println!("  MURMUR_CONFIG     Config file path");
        println!("  MURMUR_CORPUS     Corpus directory");
        println!("  MURMUR_NICK       Bot nickname");
        println!("  RUST_LOG          trace | debug | info | warn | error");
        return Ok(());
    }

    // Logs go to stderr, stdout is the chat
    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    if json_logs {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    info!("Murmur v{}", env!("CARGO_PKG_VERSION"));

    // Configuration
    let config_path = arg_value(&args, "--config")
        .or_else(|| std::env::var("MURMUR_CONFIG").ok())
        .map(|raw| expand(&raw))
        .unwrap_or_else(default_config_path);
    let mut config = BotConfig::load_or_init(&config_path)?;
    config.apply_env();
    if let Some(corpus) = arg_value(&args, "--corpus") {
        config.corpus_path = expand(&corpus);
    }
    if let Some(nick) = arg_value(&args, "--nick") {
        config.nick = nick;
    }
    config.validate().context("invalid configuration")?;

    // Corpus and language tools
    let corpus = match CorpusLoader::load(&config.corpus_path).await {
        Ok(corpus) => corpus,
        Err(e) => {
            warn!("Starting with an empty corpus: {}", e);
            Corpus::new()
        }
    };
    let thesaurus = match &config.thesaurus_path {
        Some(path) => Thesaurus::load(path).unwrap_or_else(|e| {
            warn!("Ignoring thesaurus: {:#}", e);
            Thesaurus::new()
        }),
        None => Thesaurus::new(),
    };
    let fallback = language_code(&config.primary_language).unwrap_or("en");
    let extractor = Arc::new(BasicExtractor::new(thesaurus, fallback));

    // Wiring
    let config = Arc::new(config);
    let (events_tx, events_rx) = mpsc::channel(256);
    let transport = Arc::new(ConsoleTransport::new(events_tx.clone(), &config.nick));
    let feeds = Arc::new(HttpFeedProvider::new().context("building HTTP client")?);

    let context = BotContext {
        config: config.clone(),
        corpus: Arc::new(corpus),
        extractor,
        delegate: transport.clone(),
        feeds,
    };
    let bot = Bot::new(context);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let user = std::env::var("USER").unwrap_or_else(|_| "you".to_string());
    events_tx.send(Event::UserJoined { nick: user.clone() }).await?;

    let stdin = transport.read_stdin(&user);
    let bot_task = tokio::spawn(bot.run(events_rx, shutdown_rx));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
        _ = stdin => info!("Input closed"),
    }

    let _ = shutdown_tx.send(true);
    bot_task.await?;
    Ok(())
}
