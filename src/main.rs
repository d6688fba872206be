// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pagetext::app_config::{self, Config, TranslationProvider};
use pagetext::database::Repository;
use pagetext::language_utils::normalize_language_code;
use pagetext::images::{CachingImageResolver, ImageResolver};
use pagetext::note::{ImageSlot, Page};
use pagetext::providers::Translator;
use pagetext::providers::mock::MockTranslator;
use pagetext::providers::ollama::Ollama;
use pagetext::session::{NoteSession, PageView, SessionOptions, SessionServices};
use pagetext::translation::{ReadingTable, Transliterator};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::Mock => TranslationProvider::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import recognized pages of a note from a JSON file
    Import {
        /// Note the pages belong to
        note_id: String,

        /// JSON array of pages ({"id", "page_number", "original_text", ...})
        #[arg(value_name = "PAGES_JSON")]
        pages_path: PathBuf,

        /// Note title
        #[arg(long, default_value = "")]
        title: String,
    },

    /// Show the segmented, translated text of a note's pages
    Show {
        /// Note to open
        note_id: String,

        /// 1-based page position to show
        #[arg(short = 'n', long, default_value_t = 1, conflicts_with = "all")]
        page: usize,

        /// Show every page
        #[arg(short, long)]
        all: bool,

        /// Print the full texts instead of segments
        #[arg(long)]
        full_text: bool,
    },

    /// Delete one segment of a page and write the page back
    DeleteSegment {
        /// Note the page belongs to
        note_id: String,

        /// Page id
        page_id: String,

        /// 0-based segment index
        index: usize,
    },

    /// Generate shell completions for pagetext
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// pagetext - sentence-aligned reading of OCR'd note pages
///
/// Splits the recognized text of note pages into sentences with a
/// transliteration and a translation for each one.
#[derive(Parser, Debug)]
#[command(name = "pagetext")]
#[command(version)]
#[command(about = "Sentence-aligned translation of OCR'd note pages")]
#[command(long_about = "pagetext splits the recognized text of note pages into sentences and pairs each one with a transliteration and a translation.

EXAMPLES:
    pagetext import lesson-1 pages.json         # Import pages into note lesson-1
    pagetext show lesson-1                      # Show the first page
    pagetext show lesson-1 -n 3 -t de           # Show page 3 translated to German
    pagetext show lesson-1 --all -p mock        # Show every page with the offline provider
    pagetext delete-segment lesson-1 p1 2       # Delete the third segment of page p1
    pagetext completions bash > pagetext.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Translation provider to use
    #[arg(short, long, value_enum, global = true)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Target language code (e.g., 'en', 'de', 'fr')
    #[arg(short, long, global = true)]
    target_language: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and marker for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", color, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger is installed once; its max level follows the config
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "pagetext", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    let repo = match &config.database_path {
        Some(path) => Repository::open(path)?,
        None => Repository::new_default()?,
    };

    match cli.command {
        Commands::Import { note_id, pages_path, title } => run_import(&repo, &note_id, &pages_path, &title).await,
        Commands::Show { note_id, page, all, full_text } => {
            let session = open_session(&config, repo, &note_id).await?;
            let result = run_show(&session, page, all, full_text).await;
            session.shutdown();
            result
        }
        Commands::DeleteSegment { note_id, page_id, index } => {
            let session = open_session(&config, repo, &note_id).await?;
            let result = run_delete_segment(&session, &page_id, index).await;
            session.shutdown();
            result
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load or create the configuration and apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(provider) = &cli.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &cli.model {
        config.translation.model = model.clone();
    }
    if let Some(target_language) = &cli.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    config.target_language = normalize_language_code(&config.target_language)?;
    Ok(config)
}

fn build_translator(config: &Config) -> Arc<dyn Translator> {
    let translation = &config.translation;
    match translation.provider {
        TranslationProvider::Ollama => Arc::new(Ollama::new_with_config(
            &translation.endpoint,
            &translation.model,
            &translation.system_prompt,
            translation.temperature,
            translation.timeout_secs,
            translation.retry_count,
            translation.retry_backoff_ms,
        )),
        TranslationProvider::Mock => Arc::new(MockTranslator::working()),
    }
}

fn build_transliterator(config: &Config) -> Result<Arc<dyn Transliterator>> {
    match &config.transliteration_table {
        Some(path) => Ok(Arc::new(ReadingTable::load(path)?)),
        None => {
            warn!("No transliteration table configured, readings will repeat the source characters");
            Ok(Arc::new(ReadingTable::new()))
        }
    }
}

async fn open_session(config: &Config, repo: Repository, note_id: &str) -> Result<NoteSession> {
    let image_resolver: Arc<dyn ImageResolver> = Arc::new(match &config.images.cache_dir {
        Some(dir) => CachingImageResolver::new(dir, config.images.timeout_secs)?,
        None => CachingImageResolver::new_default(config.images.timeout_secs)?,
    });

    let services = SessionServices {
        page_store: Arc::new(repo),
        translator: build_translator(config),
        transliterator: build_transliterator(config)?,
        image_resolver,
    };

    info!(
        "Opening note {} ({} -> {} via {})",
        note_id,
        config.source_language,
        config.target_language,
        config.translation.provider.display_name()
    );

    let session = NoteSession::new(note_id, services, SessionOptions::from_config(config));
    session
        .sync_pages()
        .await
        .with_context(|| format!("Failed to load note {}", note_id))?;
    Ok(session)
}

async fn run_import(repo: &Repository, note_id: &str, pages_path: &Path, title: &str) -> Result<()> {
    let contents = tokio::fs::read_to_string(pages_path)
        .await
        .with_context(|| format!("Failed to read pages file: {}", pages_path.display()))?;
    let pages: Vec<Page> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse pages file: {}", pages_path.display()))?;

    let total = pages.len();
    let imported = repo.import_pages(note_id, title, pages).await?;
    if imported < total {
        warn!("Skipped {} pages with a missing id", total - imported);
    }

    info!("Imported {} pages into note {}", imported, note_id);
    info!("{}", repo.connection().stats()?);
    Ok(())
}

async fn run_show(session: &NoteSession, page: usize, all: bool, full_text: bool) -> Result<()> {
    let count = session.page_count();
    if count == 0 {
        warn!("Note {} has no pages", session.note_id());
        return Ok(());
    }

    if !all {
        let index = page
            .checked_sub(1)
            .filter(|i| *i < count)
            .ok_or_else(|| anyhow!("Page {} out of range (note has {} pages)", page, count))?;
        let view = session
            .open_page(index)
            .await
            .ok_or_else(|| anyhow!("Page {} disappeared while opening", page))?;
        print_page(&view, full_text);
        return Ok(());
    }

    let progress_bar = ProgressBar::new(count as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));

    let mut views = Vec::with_capacity(count);
    for index in 0..count {
        if let Some(view) = session.open_page(index).await {
            progress_bar.set_message(view.page.id.clone());
            views.push(view);
        }
        progress_bar.inc(1);
    }
    progress_bar.finish_and_clear();
    session.wait_for_background().await;

    for view in &views {
        print_page(view, full_text);
    }

    let (hits, misses, hit_rate) = session.translation_cache().stats();
    info!("Translation cache: {} hits, {} misses ({:.1}% hit rate)", hits, misses, hit_rate * 100.0);
    Ok(())
}

fn print_page(view: &PageView, full_text: bool) {
    let image = match &view.image {
        ImageSlot::Loaded(path) => path.display().to_string(),
        ImageSlot::Failed => "unavailable".to_string(),
        ImageSlot::Loading => "loading".to_string(),
        ImageSlot::NotLoaded => "none".to_string(),
    };
    println!("== Page {} ({}) image: {}", view.page.page_number, view.page.id, image);

    let Some(processed) = &view.processed else {
        println!("   (no text)");
        return;
    };

    if full_text || processed.show_full_text() {
        println!("{}", processed.full_original_text);
        if let Some(translated) = &processed.full_translated_text {
            println!("{}", translated);
        }
        return;
    }

    for (i, segment) in processed.segments.iter().flatten().enumerate() {
        println!("[{}] {}", i, segment.original_text.trim_end());
        if processed.show_transliteration() {
            if let Some(reading) = &segment.transliteration {
                println!("    {}", reading);
            }
        }
        if processed.show_translation() {
            if let Some(translated) = &segment.translated_text {
                println!("    {}", translated);
            }
        }
    }
}

async fn run_delete_segment(session: &NoteSession, page_id: &str, index: usize) -> Result<()> {
    session
        .process_page(page_id)
        .await
        .ok_or_else(|| anyhow!("Page {} not found or has no text", page_id))?;

    let page = session.delete_segment(page_id, index).await?;
    info!("Deleted segment {} of page {}", index, page.id);
    println!("{}", page.original_text);
    Ok(())
}
