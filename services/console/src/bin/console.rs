//! services/console/src/bin/console.rs

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use colored::Colorize;
use console_lib::{
    adapters::{
        Backend, HttpArchiveAdapter, HttpHrDataAdapter, HttpQueryAdapter, PlaceholderHostMetrics,
    },
    config::Config,
    error::AppError,
    poll::Poller,
    stats::StatsCache,
    ui::{notify, panels, transcript},
};
use hr_insight_core::{
    ConversationArchiveService, ConversationSessionManager, HrDataService, QueryService,
    SubmitError, SubmitOutcome,
};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const COMMANDS: &[&str] = &[
    "/help",
    "/transcript",
    "/clear",
    "/history",
    "/search",
    "/stats",
    "/top",
    "/memory",
    "/cleanup",
    "/reindex",
    "/admin",
    "/quit",
];

/// CLI helper for rustyline that provides completion, highlighting, and hints
/// for the slash commands.
#[derive(Clone)]
struct CliHelper;

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            COMMANDS
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Everything the command handlers need, wired once at startup.
struct App {
    config: Arc<Config>,
    manager: Arc<ConversationSessionManager<dyn QueryService>>,
    hr_data: Arc<dyn HrDataService>,
    archive: Arc<dyn ConversationArchiveService>,
    host_metrics: Arc<PlaceholderHostMetrics>,
    stats: Arc<StatsCache>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Backend at {}", config.api_base_url);

    // --- 2. Build the HTTP Backend & Adapters ---
    let http = reqwest::Client::new();
    let backend = Backend::new(http, &config.api_base_url)?;
    let query_adapter: Arc<dyn QueryService> = Arc::new(HttpQueryAdapter::new(backend.clone()));
    let hr_data: Arc<dyn HrDataService> = Arc::new(HttpHrDataAdapter::new(backend.clone()));
    let archive: Arc<dyn ConversationArchiveService> = Arc::new(HttpArchiveAdapter::new(backend));
    let host_metrics = Arc::new(PlaceholderHostMetrics::new());

    // --- 3. Create the Session Manager ---
    let mut manager = ConversationSessionManager::new(query_adapter);
    if let Some(timeout) = config.request_timeout {
        manager = manager.with_timeout(timeout);
    }
    let manager = Arc::new(manager);

    // --- 4. Start the Background Stats Refresh ---
    let stats = Arc::new(StatsCache::new());
    let poller = {
        let stats = stats.clone();
        let hr_data = hr_data.clone();
        Poller::spawn(config.stats_refresh, move || {
            let stats = stats.clone();
            let hr_data = hr_data.clone();
            async move {
                if let Err(e) = stats.refresh(hr_data.as_ref()).await {
                    warn!("Stats refresh failed: {e}");
                }
            }
        })
    };

    let app = App {
        config: config.clone(),
        manager,
        hr_data,
        archive,
        host_metrics,
        stats,
    };

    // --- 5. Run the REPL ---
    let mut editor: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(CliHelper));
    println!(
        "{}",
        "HR Insight console — ask questions about your workforce data. /help lists commands."
            .bold()
    );

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        if let Some(command) = input.strip_prefix('/') {
            if !handle_command(&app, command).await {
                break;
            }
        } else {
            ask(&app, input).await;
        }
    }

    // --- 6. Shut Down ---
    poller.stop().await;
    info!("Goodbye.");
    Ok(())
}

/// Submits one question and renders whatever the manager produced.
async fn ask(app: &App, question: &str) {
    match app.manager.submit(question).await {
        Ok(SubmitOutcome::Answered(message)) => {
            println!("{}", transcript::render_message(&message));
        }
        Ok(SubmitOutcome::Failed { notice, detail }) => {
            println!("{}", transcript::render_message(&notice));
            notify::error(&detail);
        }
        // A reset raced this answer; there is nothing left to show.
        Ok(SubmitOutcome::Discarded) => {}
        Err(SubmitError::EmptyQuestion) => {}
        Err(SubmitError::AlreadyInFlight) => {
            notify::warning("Hold on — the previous question is still being answered.");
        }
    }
}

/// Dispatches one slash command. Returns `false` when the REPL should exit.
async fn handle_command(app: &App, command: &str) -> bool {
    let (name, arg) = match command.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "help" => print_help(),
        "transcript" => println!("{}", transcript::render_transcript(&app.manager.history())),
        "clear" => {
            app.manager.reset();
            notify::info("Conversation cleared.");
        }
        "history" => show_history(app).await,
        "search" => search(app, arg).await,
        "stats" => show_stats(app).await,
        "top" => show_top_performers(app).await,
        "memory" => match app.archive.memory_stats().await {
            Ok(stats) => println!("{}", panels::render_memory_stats(&stats)),
            Err(e) => notify::error(&e.to_string()),
        },
        "cleanup" => match app.archive.cleanup().await {
            Ok(()) => notify::info("Old conversations cleaned up."),
            Err(e) => notify::error(&e.to_string()),
        },
        "reindex" => match app.hr_data.reindex().await {
            Ok(()) => notify::info("Reindexing started."),
            Err(e) => notify::error(&e.to_string()),
        },
        "admin" => println!("{}", panels::render_host_panel(app.host_metrics.sample())),
        "quit" | "exit" => return false,
        other => notify::warning(&format!("Unknown command '/{other}'. Try /help.")),
    }
    true
}

fn print_help() {
    println!(
        "{}",
        [
            "/transcript   show the local conversation",
            "/clear        start a new conversation",
            "/history      fetch this session's archived transcript",
            "/search <q>   search across archived conversations",
            "/stats        workforce numbers and backend health",
            "/top          top performers",
            "/memory       conversation memory statistics",
            "/cleanup      prune old conversations",
            "/reindex      rebuild the document index",
            "/admin        host panel (placeholder gauges)",
            "/quit         leave",
        ]
        .join("\n")
    );
}

/// Fetches the server-side archive for the active session, as the dashboard
/// history modal does. Without a session there is nothing to fetch yet.
async fn show_history(app: &App) {
    let Some(session_id) = app.manager.session_id() else {
        notify::warning("No active session yet — ask a question first.");
        return;
    };
    match app.archive.conversation(&session_id).await {
        Ok(conversation) => println!("{}", panels::render_archive(&conversation)),
        Err(e) => notify::error(&e.to_string()),
    }
}

async fn search(app: &App, query: &str) {
    if query.is_empty() {
        notify::warning("Usage: /search <text>");
        return;
    }
    match app.archive.search(query, app.config.search_limit).await {
        Ok(hits) => println!("{}", panels::render_search_hits(query, &hits)),
        Err(e) => notify::error(&e.to_string()),
    }
}

/// Prints the cached sidebar numbers, refreshing once if the poller has not
/// succeeded yet.
async fn show_stats(app: &App) {
    if app.stats.latest().is_none() {
        if let Err(e) = app.stats.refresh(app.hr_data.as_ref()).await {
            notify::error(&e.to_string());
            return;
        }
    }
    match app.stats.latest() {
        Some(snapshot) => println!("{}", panels::render_stats(&snapshot)),
        None => notify::warning("No stats available."),
    }
}

async fn show_top_performers(app: &App) {
    match app
        .hr_data
        .top_performers(app.config.top_performers_limit)
        .await
    {
        Ok(performers) => println!("{}", panels::render_top_performers(&performers)),
        Err(e) => notify::error(&e.to_string()),
    }
}
