use clap::Parser;
use colored::*;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use genny::agent::AgentLoop;
use genny::api::ChatClient;
use genny::cli::Args;
use genny::commands::Command;
use genny::config::{Config, FileConfig};
use genny::error::Result;
use genny::ingest::{DocumentIngestor, Upload};
use genny::session::{SaveOutcome, Session};
use genny::store::{ProfileStore, SheetFileStore, UpsertOutcome};
use genny::tools::{TavilyClient, ToolRegistry, ToolSettings, WebSearchTool};
use genny::ui::{self, AnswerRenderer, ConsoleObserver};

struct App {
    agent: AgentLoop,
    ingestor: DocumentIngestor,
    store: Box<dyn ProfileStore>,
    observer: ConsoleObserver,
    renderer: AnswerRenderer,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.config_init {
        match FileConfig::write_example() {
            Ok(path) => {
                println!("{}", format!("Config written to {}", path.display()).green());
                return;
            }
            Err(e) => {
                eprintln!("{} {}", "Error:".red(), e);
                process::exit(1);
            }
        }
    }

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    init_logging(config.verbose);

    let app = match build_app(&config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    let mut session = Session::dated(
        &config.system_prompt,
        config.greeting.clone(),
        &Config::get_current_date(),
    );
    tracing::debug!(
        session = %session.id(),
        started_at = %session.started_at().to_rfc3339(),
        model = %config.model,
        "session started"
    );

    if !args.uploads.is_empty() {
        upload(&app, &mut session, &args.uploads).await;
    }

    if !args.question.is_empty() {
        let question = args.question.join(" ");
        ask(&app, &mut session, &question).await;
        return;
    }

    if let Err(e) = repl(&app, &mut session).await {
        eprintln!("{} {}", "Error:".red(), e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "genny=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_app(config: &Config) -> Result<App> {
    let request_timeout = Duration::from_secs(config.request_timeout);

    let mut tools = ToolRegistry::new(ToolSettings {
        timeout: Duration::from_secs(config.tool_timeout),
        max_result_chars: config.max_result_chars,
    });
    match &config.search {
        Some(search) => {
            let provider = TavilyClient::new(&search.api_key, &search.endpoint, request_timeout)?;
            tools.register(Arc::new(WebSearchTool::new(Arc::new(provider), search.max_results)));
        }
        None => tracing::info!("web search disabled"),
    }

    let provider = ChatClient::new(&config.api_key, &config.api_endpoint, &config.model, request_timeout)?;
    let transcriber = ChatClient::new(&config.api_key, &config.api_endpoint, &config.vision_model, request_timeout)?;

    Ok(App {
        agent: AgentLoop::new(Arc::new(provider), Arc::new(tools), config.max_iterations),
        ingestor: DocumentIngestor::new(Some(Arc::new(transcriber))),
        store: Box::new(SheetFileStore::new(config.store_path.clone())),
        observer: ConsoleObserver::new(config.verbose),
        renderer: AnswerRenderer::new(),
    })
}

async fn repl(app: &App, session: &mut Session) -> Result<()> {
    ui::display_greeting(&app.renderer, session.greeting());
    println!("{}", "Type /help for commands.".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".cyan().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        match command {
            Command::Ask(question) => ask(app, session, &question).await,
            Command::Upload(paths) if paths.is_empty() => {
                ui::display_warning("Usage: /upload <path>...");
            }
            Command::Upload(paths) => upload(app, session, &paths).await,
            Command::Profile => ui::display_profile(session.profile()),
            Command::Save(name) => save(app, session, &name).await,
            Command::Load(name) => load(app, session, &name).await,
            Command::Students => match session.saved_profiles(app.store.as_ref()).await {
                Ok(names) => ui::display_students(&names),
                Err(e) => ui::display_error(&e),
            },
            Command::Reset => {
                session.reset();
                ui::display_success("Profile cleared. Starting a new chat.");
                ui::display_greeting(&app.renderer, session.greeting());
            }
            Command::Help => ui::display_help(),
            Command::Quit => break,
            Command::Unknown(name) => {
                ui::display_warning(&format!("Unknown command /{}. Type /help.", name));
            }
        }
    }

    Ok(())
}

async fn ask(app: &App, session: &mut Session, question: &str) {
    match session.ask(question, &app.agent, &app.observer).await {
        Ok(outcome) => {
            tracing::debug!(
                iterations = outcome.iterations,
                tool_calls = outcome.tool_calls,
                "answer ready"
            );
            ui::display_answer(&app.renderer, &outcome.answer.text());
        }
        Err(e) => ui::display_error(&e),
    }
}

async fn upload(app: &App, session: &mut Session, paths: &[PathBuf]) {
    let mut uploads = Vec::new();
    for path in paths {
        println!("{}", format!("Reading {}...", path.display()).dimmed());
        match Upload::from_path(path) {
            Ok(upload) => uploads.push(upload),
            Err(e) => ui::display_error(&e),
        }
    }

    let report = session.ingest(&app.ingestor, &uploads).await;
    ui::display_ingest_report(&report);
}

async fn save(app: &App, session: &Session, name: &str) {
    match session.save_profile(app.store.as_ref(), name).await {
        Ok(SaveOutcome::Saved(UpsertOutcome::Created)) => {
            ui::display_success(&format!("Saved new profile for {}!", name.trim()));
        }
        Ok(SaveOutcome::Saved(UpsertOutcome::Updated)) => {
            ui::display_success(&format!("Updated profile for {}!", name.trim()));
        }
        Ok(SaveOutcome::EmptyProfile) => {
            ui::display_warning("No student data to save yet. Upload a file first.");
        }
        Ok(SaveOutcome::MissingName) => ui::display_warning("Please enter a name: /save <name>"),
        Err(e) => ui::display_error(&e),
    }
}

async fn load(app: &App, session: &mut Session, name: &str) {
    if name.trim().is_empty() {
        ui::display_warning("Please enter a name: /load <name>");
        return;
    }
    match session.load_profile(app.store.as_ref(), name).await {
        Ok(()) => ui::display_success(&format!("Loaded profile: {}", name.trim())),
        Err(e) => ui::display_error(&e),
    }
}
