//! 命令行程序入口

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use speech_translator::env::{self, EnvVar};
use speech_translator::speech::{CommandSpeechEngine, Speaker};
use speech_translator::storage::{
    HistoryStore, KeyValueStore, PreferenceStore, RedbStore, ThemePreference,
};
use speech_translator::theme::ThemeState;
use speech_translator::translation::config::load_translator_config;
use speech_translator::translation::{
    helpers, ConfigManager, Language, TranslationClient, TranslationResult, TranslatorConfig,
};
use speech_translator::TranslatorSession;

#[derive(Parser, Debug)]
#[command(name = "speech-translator", version, about = "Translate text with an offline fallback")]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Mark results produced by the offline fallback
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate text into the target language
    Translate {
        text: String,

        /// Target language code
        #[arg(short, long)]
        to: Option<String>,

        /// Read the translation aloud
        #[arg(short, long)]
        speak: bool,
    },
    /// Show the most recent translations, newest first
    History,
    /// Read a saved translation aloud
    Speak {
        /// Position in the history listing, starting at 1
        index: usize,
    },
    /// Remove all saved translations
    ClearHistory,
    /// Show or change the colour theme
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,

        /// Colour scheme reported by the device
        #[arg(long, value_enum)]
        device: Option<Scheme>,
    },
    /// List supported target languages
    Languages,
    /// Write an example configuration file
    InitConfig { path: PathBuf },
    /// Describe supported environment variables
    Env,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeAction {
    Show,
    Toggle,
    Light,
    Dark,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Scheme {
    Light,
    Dark,
}

impl From<Scheme> for ThemePreference {
    fn from(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Light => ThemePreference::Light,
            Scheme::Dark => ThemePreference::Dark,
        }
    }
}

fn init_logging() {
    let level = env::core::LogLevel::get_or_default("warn".to_string())
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::WARN);
    let no_color = env::core::NoColor::get_or_default(false);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> TranslationResult<TranslatorConfig> {
    match path {
        Some(path) => Ok(ConfigManager::from_file(path)?.into_config()),
        None => Ok(load_translator_config()),
    }
}

fn speak_and_wait(speaker: &Speaker, result: TranslationResult<()>) {
    match result {
        Ok(()) => {
            while speaker.is_speaking() {
                std::thread::sleep(Duration::from_millis(100));
            }
        }
        Err(e) => eprintln!("Speech error: {}", e),
    }
}

fn command_speaker(config: &TranslatorConfig) -> Speaker {
    let engine = Arc::new(CommandSpeechEngine::new(config.speech_program.clone()));
    Speaker::from_config(engine, config)
}

fn open_store(config: &TranslatorConfig) -> TranslationResult<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = Arc::new(RedbStore::open(&config.database_path())?);
    Ok(store)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(cli).await {
        helpers::log_error(&e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> TranslationResult<()> {
    match cli.command {
        Command::Languages => {
            for language in Language::ALL {
                println!("{}\t{}", language.code(), language.display_name());
            }
        }
        Command::Env => print!("{}", env::generate_env_docs()),
        Command::InitConfig { path } => {
            ConfigManager::generate_example_config(&path)?;
            println!("{}", path.display());
        }
        Command::Translate { text, to, speak } => {
            let config = load_config(cli.config.as_ref())?;
            let store = open_store(&config)?;

            let client = TranslationClient::new(&config)?;
            let mut session = TranslatorSession::new(client, HistoryStore::open(store))
                .with_language(config.default_language());
            if let Some(code) = to {
                session.select_language(&code)?;
            }

            let translation = session.translate(&text).await?;
            if cli.verbose && translation.is_heuristic() {
                println!("{} (offline)", translation);
            } else {
                println!("{}", translation);
            }

            if speak {
                let speaker = command_speaker(&config);
                let result = speaker.speak(translation.text(), session.language().code());
                speak_and_wait(&speaker, result);
            }
        }
        Command::History => {
            let config = load_config(cli.config.as_ref())?;
            let history = HistoryStore::open(open_store(&config)?);
            for (position, record) in history.entries().iter().enumerate() {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    position + 1,
                    record.formatted_time(),
                    record.target_language(),
                    record.source_text(),
                    record.translated_text()
                );
            }
        }
        Command::Speak { index } => {
            let config = load_config(cli.config.as_ref())?;
            let history = HistoryStore::open(open_store(&config)?);
            let record = index
                .checked_sub(1)
                .and_then(|position| history.get(position))
                .ok_or_else(|| {
                    helpers::validation_error(format!("历史记录中没有第 {} 条", index))
                })?;

            let speaker = command_speaker(&config);
            let result = speaker.speak_record(record);
            speak_and_wait(&speaker, result);
        }
        Command::ClearHistory => {
            let config = load_config(cli.config.as_ref())?;
            HistoryStore::open(open_store(&config)?).clear();
        }
        Command::Theme { action, device } => {
            let config = load_config(cli.config.as_ref())?;
            let store = PreferenceStore::new(open_store(&config)?);
            let mut theme = ThemeState::initialize(store, device.map(Into::into));

            match action {
                ThemeAction::Show => {}
                ThemeAction::Toggle => {
                    theme.toggle();
                }
                ThemeAction::Light => {
                    theme.set(ThemePreference::Light);
                }
                ThemeAction::Dark => {
                    theme.set(ThemePreference::Dark);
                }
            }

            println!("{}", theme.current());
            if cli.verbose {
                for (name, value) in theme.palette().variables() {
                    println!("  {:<10} {}", name, value);
                }
            }
        }
    }

    Ok(())
}
