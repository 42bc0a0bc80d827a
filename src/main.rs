//! # ContentCrafter CLI Entry Point
//!
//! This is the main entry point for the ContentCrafter TUI application.
//!
//! ## Overview
//!
//! ContentCrafter turns a topic and a content type into a content package:
//! title suggestions, a segmented script with talking points, and stock media
//! search links. Free usage is capped per day, first anonymously and then
//! after giving an email address.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive TUI
//! contentcrafter
//!
//! # One-shot: generate once and print the package
//! contentcrafter --topic "The history of coffee" --content-type youtube
//!
//! # Debug mode - print usage state and exit
//! contentcrafter --debug
//! ```
//!
//! The API key comes from `--api-key`, `GEMINI_API_KEY` or `API_KEY`. Without
//! one a fixed mock package is returned.
//!
//! ## Key Bindings
//!
//! - `Tab` - Cycle focus between topic, content type and results
//! - `Enter` - Generate
//! - `↑` / `↓` - Choose content type or scroll results
//! - `Ctrl+t` - Toggle light/dark theme
//! - `Ctrl+y` - Copy the package to the clipboard
//! - `Ctrl+l` - Copy only the media links
//! - `Esc` - Dismiss the error banner or a modal
//! - `Ctrl+c` / `Ctrl+q` - Quit

use contentcrafter::config::{api_key_from_env, Config};
use contentcrafter::export;
use contentcrafter::generator::{ContentType, GeminiGenerator};
use contentcrafter::orchestrator::{GenerateOutcome, Orchestrator, PendingGeneration, PromptSignal};
use contentcrafter::ui;
use contentcrafter::ui::app::AppAction;
use contentcrafter::ui::theme::ThemeMode;
use contentcrafter::ui::App;
use contentcrafter::usage::{
    default_data_dir, JsonFileStore, KeyValueStore, UsageStorage, UsageTracker,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE_NAME: &str = "contentcrafter.log";

/// Trait for reading terminal events (allows dependency injection for testing)
trait EventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Production event reader that uses crossterm's event polling + read
struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout).context("Failed to poll for events")? {
            Ok(Some(
                event::read().context("Failed to read keyboard event")?,
            ))
        } else {
            Ok(None)
        }
    }
}

/// ContentCrafter - AI content packages for creators, in your terminal
#[derive(Parser, Debug)]
#[command(name = "contentcrafter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn a topic into titles, a script outline and media links", long_about = None)]
struct Args {
    /// Gemini API key, takes precedence over GEMINI_API_KEY and API_KEY
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Directory holding the usage store and log file
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Path to a config file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generate once for this topic and print the package
    #[arg(short, long, requires = "content_type")]
    topic: Option<String>,

    /// Content type for one-shot mode (youtube, tiktok, podcast, blog, instagram)
    #[arg(long, value_name = "TYPE", requires = "topic")]
    content_type: Option<ContentType>,

    /// Unlock the email tier before a one-shot generation
    #[arg(long, value_name = "ADDRESS", requires = "topic")]
    email: Option<String>,

    /// Print usage state and exit
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up panic hook to ensure terminal is restored on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);

        original_hook(panic_info);
    }));

    let result = run_application(args).await;

    // Restore panic hook
    let _ = panic::take_hook();

    result
}

/// Send tracing output to a log file; the terminal belongs to the TUI
fn init_logging(data_dir: &Path) -> Result<()> {
    let log_path = data_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    // A second init (e.g. in tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contentcrafter=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init();

    Ok(())
}

async fn run_application(args: Args) -> Result<()> {
    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    init_logging(&data_dir)?;

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    let store = JsonFileStore::in_dir(&data_dir)?;
    let tracker = UsageTracker::open(UsageStorage::new(Box::new(store.clone())), config.limits());

    let generator = GeminiGenerator::new(
        api_key_from_env(),
        config.model.clone(),
        config.api_base_url.clone(),
        config.request_timeout(),
    );
    let api_key_override = args.api_key.filter(|k| !k.trim().is_empty());
    let has_credential = generator.has_api_key() || api_key_override.is_some();

    tracing::info!(
        data_dir = %data_dir.display(),
        model = %config.model,
        has_credential,
        "Starting ContentCrafter"
    );

    let mut orchestrator = Orchestrator::new(tracker, Arc::new(generator))
        .with_api_key_override(api_key_override);

    // Debug mode: print usage state and exit
    if args.debug {
        print_debug(&orchestrator, store.path(), &config, has_credential);
        return Ok(());
    }

    if let Some(topic) = args.topic {
        return run_once(
            &mut orchestrator,
            &topic,
            args.content_type,
            args.email.as_deref(),
        )
        .await;
    }

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode for terminal")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut theme_store = store;
    let mut app = App::new(ThemeMode::load(&theme_store));

    // Run the app and ensure cleanup happens even on error
    let mut event_reader = CrosstermEventReader;
    let run_result = run_app(
        &mut terminal,
        &mut app,
        &mut orchestrator,
        &mut theme_store,
        &mut event_reader,
        &mut io::stdout(),
    )
    .await;

    // Restore terminal (always runs, even if run_app failed)
    let cleanup_result = cleanup_terminal(&mut terminal);

    // Return the first error that occurred, or Ok if both succeeded
    run_result?;
    cleanup_result?;

    Ok(())
}

fn print_debug(
    orchestrator: &Orchestrator,
    store_path: &Path,
    config: &Config,
    has_credential: bool,
) {
    let tracker = orchestrator.tracker();
    println!("=== Usage ===");
    println!("  Store: {}", store_path.display());
    println!("  Identifier: {}", tracker.identifier().unwrap_or("(none)"));
    println!("  Tier: {}", tracker.tier().as_str());
    println!("  Used today: {}", tracker.generations_used());
    println!("  Left today: {}", tracker.generations_left());
    println!("  Limit reached: {}", tracker.is_limit_reached());
    println!("\n=== Generator ===");
    println!("  Model: {}", config.model);
    println!("  Endpoint: {}", config.api_base_url);
    println!(
        "  Credential: {}",
        if has_credential { "set" } else { "none (mock mode)" }
    );
}

/// Generate once and print the package as plain text
async fn run_once(
    orchestrator: &mut Orchestrator,
    topic: &str,
    content_type: Option<ContentType>,
    email: Option<&str>,
) -> Result<()> {
    if let Some(email) = email {
        if !orchestrator.confirm_email(email) {
            bail!("Invalid email address: {}", email);
        }
    }

    match orchestrator.generate(topic, content_type).await {
        GenerateOutcome::Generated { package, prompt } => {
            print!("{}", export::format_package_text(&package));
            match prompt {
                Some(PromptSignal::EmailUnlock) => eprintln!(
                    "Anonymous free generations used up. Pass --email to unlock more."
                ),
                Some(PromptSignal::Paywall) => {
                    eprintln!("That was your last free generation for today.")
                }
                None => {}
            }
            eprintln!(
                "Generations left today: {}",
                orchestrator.tracker().generations_left()
            );
            Ok(())
        }
        GenerateOutcome::Gated(PromptSignal::EmailUnlock) => {
            bail!("Anonymous free generation limit reached. Pass --email to unlock more.")
        }
        GenerateOutcome::Gated(PromptSignal::Paywall) => {
            bail!("You've used all your free generations for today.")
        }
        GenerateOutcome::Skipped => bail!("A non-empty topic and a content type are required"),
        GenerateOutcome::Failed(message) => bail!(message),
        GenerateOutcome::Busy => bail!("A generation is already in progress"),
    }
}

async fn run_app<B>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    orchestrator: &mut Orchestrator,
    theme_store: &mut dyn KeyValueStore,
    event_reader: &mut dyn EventReader,
    clipboard: &mut dyn Write,
) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut pending: Option<PendingGeneration> = None;
    app.sync_usage(orchestrator.tracker());

    loop {
        // Book a finished generation
        if pending.as_ref().is_some_and(PendingGeneration::is_finished) {
            if let Some(generation) = pending.take() {
                let result = generation.join().await;
                app.apply_outcome(orchestrator.finish(result));
                app.sync_usage(orchestrator.tracker());
            }
        } else if pending.is_some() {
            // Let the request make progress on a single-threaded runtime
            tokio::task::yield_now().await;
        }

        app.tick = app.tick.wrapping_add(1);

        terminal
            .draw(|f| ui::render(f, app))
            .context("Failed to draw terminal UI")?;

        // Short timeout while loading so the spinner animates
        let poll_timeout = if pending.is_some() {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };

        let Some(Event::Key(key)) = event_reader.read_event(poll_timeout)? else {
            continue;
        };

        let Some(action) = app.handle_key(key) else {
            continue;
        };

        match action {
            AppAction::Generate => {
                match orchestrator.start(&app.topic, app.content_type) {
                    Ok(generation) => {
                        app.begin_loading();
                        pending = Some(generation);
                    }
                    Err(outcome) => app.apply_outcome(outcome),
                }
            }
            AppAction::SubmitEmail(email) => {
                if orchestrator.confirm_email(&email) {
                    app.email_accepted();
                    app.sync_usage(orchestrator.tracker());
                } else {
                    app.email_rejected();
                }
            }
            AppAction::ToggleTheme => {
                app.theme_mode = app.theme_mode.toggled();
                if let Err(e) = app.theme_mode.save(theme_store) {
                    tracing::warn!(error = %e, "Failed to persist theme");
                }
            }
            AppAction::CopyPackage => {
                if let Some(package) = &app.package {
                    let text = export::format_package_text(package);
                    app.notice = Some(copy_notice(clipboard, &text, "Content package"));
                }
            }
            AppAction::CopyLinks => {
                if let Some(package) = &app.package {
                    app.notice = Some(match export::format_media_links(package) {
                        Some(text) => copy_notice(clipboard, &text, "Media links"),
                        None => "No media links to copy".to_string(),
                    });
                }
            }
            AppAction::Quit => {
                app.should_quit = true;
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn copy_notice(clipboard: &mut dyn Write, text: &str, what: &str) -> String {
    match export::copy_to_clipboard(clipboard, text) {
        Ok(()) => format!("{} copied to clipboard", what),
        Err(e) => {
            tracing::warn!(error = %e, "Clipboard copy failed");
            format!("Copy failed: {}", e)
        }
    }
}

/// Clean up terminal state
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("Failed to restore terminal")?;

    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}
