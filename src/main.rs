use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formfriend::chat::{self, ChatRequest};
use formfriend::locale::{ApplicationMode, Language, Scheme};
use formfriend::voice::{CommandSynthesizer, WhisperClient};
use formfriend::{
    create_router, realtime, AppState, AudioBackendConfig, AudioBackendFactory, AudioSource,
    Capabilities, Config, VoiceOptions, VoiceSessionManager,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "formfriend", version, about = "Voice-enabled assistant for government scheme paperwork")]
struct Cli {
    /// Config file (without extension)
    #[arg(long, default_value = "config/formfriend")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,

    /// Ask the assistant a question
    Chat {
        message: String,
        #[arg(long, default_value = "others")]
        scheme: String,
        #[arg(long, default_value = "online")]
        mode: String,
        #[arg(long, default_value = "english")]
        language: String,
        /// Read the reply aloud
        #[arg(long)]
        speak: bool,
    },

    /// Read text aloud
    Speak {
        text: String,
        #[arg(long, default_value = "english")]
        language: String,
    },

    /// Transcribe speech from the microphone, or from a WAV file replayed as live input
    Transcribe {
        file: Option<PathBuf>,
        #[arg(long, default_value = "english")]
        language: String,
        /// Stop listening after this many seconds (default: wait for Ctrl-C)
        #[arg(long)]
        seconds: Option<u64>,
    },

    /// List supported languages and their engine codes
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("FormFriend v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve => serve(cfg).await,
        Command::Chat {
            message,
            scheme,
            mode,
            language,
            speak,
        } => {
            let language = Language::resolve(&language);
            let client = chat::client_from_config(&cfg);
            let request = ChatRequest {
                text: message,
                scheme: Scheme::resolve(&scheme),
                mode: ApplicationMode::resolve(&mode),
                language,
                history: Vec::new(),
            };

            let reply = match client.send_message(&request).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!("Chat failed: {:#}", e);
                    chat::RETRY_PROMPT.to_string()
                }
            };
            println!("{}", reply);

            if speak {
                let manager = voice_manager(&cfg, None);
                manager.speak(&reply, language, None).await;
                manager.dispose().await;
            }
            Ok(())
        }
        Command::Speak { text, language } => {
            let manager = voice_manager(&cfg, None);
            let status = manager.speak(&text, Language::resolve(&language), None).await;
            info!("Speech finished: {:?}", status);
            manager.dispose().await;
            Ok(())
        }
        Command::Transcribe {
            file,
            language,
            seconds,
        } => transcribe(&cfg, file, Language::resolve(&language), seconds).await,
        Command::Languages => {
            for language in Language::ALL {
                println!(
                    "{:<10} speech={:<6} transcription={}",
                    language.identifier(),
                    language.speech_tag(),
                    language.transcription_code()
                );
            }
            Ok(())
        }
    }
}

async fn serve(cfg: Config) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);

    let chat = chat::client_from_config(&cfg);
    let store = realtime::store_from_config(&cfg.realtime).await?;
    info!("Chat provider: {}, realtime store: {}", chat.name(), store.name());

    let router = create_router(AppState::new(cfg, chat, store));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}

/// Manager wired with the engines available to a native process
fn voice_manager(cfg: &Config, file: Option<PathBuf>) -> VoiceSessionManager {
    let mut capabilities = Capabilities::new()
        .with_synthesizer(Arc::new(CommandSynthesizer::new(cfg.voice.synthesizer_command.clone())));

    let whisper = WhisperClient::from_config(&cfg.openai);
    if whisper.is_configured() {
        capabilities = capabilities.with_transcriber(Arc::new(whisper));
    }

    let source = file.map(AudioSource::File).unwrap_or(AudioSource::Microphone);
    capabilities = capabilities.with_audio_input(Arc::new(AudioBackendFactory::new(
        source,
        AudioBackendConfig::default(),
    )));

    let defaults = VoiceOptions {
        pitch: cfg.voice.pitch,
        rate: cfg.voice.rate,
        volume: cfg.voice.volume,
    };

    VoiceSessionManager::new(capabilities, defaults)
}

async fn transcribe(cfg: &Config, file: Option<PathBuf>, language: Language, seconds: Option<u64>) -> Result<()> {
    let manager = voice_manager(cfg, file);

    if !manager.is_speech_recognition_available() {
        warn!("No transcription credential configured; the recording will be discarded");
    }

    let mut handle = manager.start_listening(language).await;
    info!("Listening with {:?}", handle.strategy());

    match seconds {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => {
            info!("Press Ctrl-C to stop listening");
            tokio::signal::ctrl_c().await?;
        }
    }

    manager.stop_listening().await;

    match handle.outcome().await {
        Some(Ok(transcript)) => println!("{}", transcript),
        Some(Err(e)) => error!("{}", e),
        None => info!("Listening cancelled"),
    }

    manager.dispose().await;

    Ok(())
}
