use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nakshatra_core::AppConfig;
use nakshatra_credential::CredentialRegistry;
use nakshatra_narration::{ChapterStore, HttpAudioFetcher, Narrator, Storyteller};
use nakshatra_server::AppState;
use nakshatra_speech::SpeechRegistry;
use nakshatra_text::TextRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nakshatra", about = "Narration service for Nakshatra Narratives")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Narrate a single piece of text and exit
    Narrate {
        /// Text to speak
        #[arg(short, long)]
        text: String,
        /// Write a WAV file here instead of printing the JSON response
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;

    let env_filter =
        EnvFilter::try_new(&config.general.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false),
    );
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Narrate { text, output } => narrate(&config, &text, output).await,
    }
}

async fn build_narrator(config: &AppConfig) -> Result<Narrator> {
    let credentials = CredentialRegistry::new()
        .build(&config.credential.provider, config.credential.extra.clone())
        .await
        .with_context(|| {
            format!(
                "failed to set up credential provider '{}'",
                config.credential.provider
            )
        })?;
    let speech = SpeechRegistry::new()
        .build(&config.speech.engine, config.speech.extra.clone())
        .await
        .with_context(|| format!("failed to set up speech engine '{}'", config.speech.engine))?;

    tracing::info!(
        provider = %credentials.name(),
        engine = %speech.name(),
        timeout_secs = config.narration.timeout_secs,
        delivery = ?config.narration.delivery,
        "narrator ready"
    );

    Ok(Narrator::new(
        Arc::from(credentials),
        Arc::from(speech),
        Arc::new(HttpAudioFetcher::new()),
    )
    .with_timeout(config.narration.timeout())
    .with_delivery(config.narration.delivery))
}

async fn build_storyteller(config: &AppConfig) -> Result<Storyteller> {
    let chapters = match config.content.chapters_path {
        Some(ref path) => ChapterStore::load(path)
            .with_context(|| format!("failed to load chapters from {path:?}"))?,
        None => {
            tracing::warn!("no content.chapters_path configured; hero perspectives are unavailable");
            ChapterStore::default()
        }
    };
    let chapters = Arc::new(chapters);

    if !config.text.enabled {
        tracing::info!("text engine disabled");
        return Ok(Storyteller::without_generator(chapters));
    }

    let storyteller = match TextRegistry::new()
        .build(&config.text.engine, config.text.extra.clone())
        .await
    {
        Ok(generator) => Storyteller::new(Arc::from(generator), chapters),
        Err(e) => {
            tracing::warn!(
                engine = %config.text.engine,
                "text engine unavailable, lore and generated text will fail: {e}"
            );
            Storyteller::without_generator(chapters)
        }
    };
    Ok(storyteller.with_timeout(config.narration.timeout()))
}

async fn serve(config: &AppConfig) -> Result<()> {
    tracing::info!("nakshatra starting");

    let state = AppState {
        narrator: build_narrator(config).await?,
        storyteller: build_storyteller(config).await?,
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    nakshatra_server::serve(listener, state)
        .await
        .context("server error")?;

    tracing::info!("nakshatra stopped");
    Ok(())
}

async fn narrate(config: &AppConfig, text: &str, output: Option<PathBuf>) -> Result<()> {
    let narrator = build_narrator(config).await?;

    match output {
        Some(path) => {
            let wav = narrator.render_wav(Some(text)).await?;
            std::fs::write(&path, &wav)
                .with_context(|| format!("failed to write {path:?}"))?;
            tracing::info!(path = %path.display(), bytes = wav.len(), "narration written");
        }
        None => {
            let response = narrator.narrate(Some(text)).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}
