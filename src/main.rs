mod app;
mod commands;
mod config;
mod descriptor;
mod error;
mod event;
mod github;
mod index;
mod logging;
mod precommit_config;
mod registry;
#[cfg(test)]
mod test_utils;
mod ui;
mod validation;

use app::App;
use clap::{Parser, Subcommand};
use config::{Config, Overrides};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use event::AppEvent;
use futures::StreamExt;
use github::client::GitHubClient;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const TICK_MS: u64 = 100;

#[derive(Parser)]
#[command(name = "hookgate", about = "Validate and register pre-commit hook repositories")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(long, help = "Quiet interval before a typed repo is checked, in milliseconds")]
    debounce_ms: Option<u64>,

    #[arg(long, help = "Base URL of the registration service")]
    registry_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the registration service
    Serve {
        #[arg(long, help = "Address to listen on")]
        listen: Option<String>,

        #[arg(long, help = "Path of the registry file")]
        store: Option<PathBuf>,
    },
    /// Fetch hook manifests into the local search index
    BuildIndex {
        /// Repositories to index as owner/repo; defaults to every registered one
        repos: Vec<String>,
    },
    /// Fuzzy-search the local hook index
    Search {
        query: String,

        #[arg(long, default_value_t = index::search::DEFAULT_LIMIT)]
        limit: usize,
    },
    /// Add a hook to a pre-commit config, pinned at the repo's latest revision
    Add {
        /// Hook id, optionally qualified as project:id or owner:project:id
        query: String,

        #[arg(short = 'f', long, default_value = precommit_config::DEFAULT_CONFIG_FILE)]
        config_file: PathBuf,
    },
    /// Remove a hook from a pre-commit config
    Remove {
        hook_id: String,

        #[arg(short = 'f', long, default_value = precommit_config::DEFAULT_CONFIG_FILE)]
        config_file: PathBuf,
    },
}

// One thread: the validation controller is only ever touched from the event loop.
#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(command) => {
            let overrides = match &command {
                Command::Serve { listen, store } => Overrides {
                    listen_addr: listen.clone(),
                    store_path: store.clone(),
                    ..Default::default()
                },
                _ => Overrides::default(),
            };
            let config = Config::load(overrides);
            logging::init_stderr(&config.log_level);
            let ok = match run_command(command, &config).await {
                Ok(ok) => ok,
                Err(e) => {
                    tracing::error!(error = %e, "command failed");
                    eprintln!("Error: {e}");
                    false
                }
            };
            if !ok {
                std::process::exit(1);
            }
            Ok(())
        }
        None => {
            let config = Config::load(Overrides {
                debounce_ms: cli.debounce_ms,
                registry_url: cli.registry_url,
                ..Default::default()
            });
            run_tui(config).await
        }
    }
}

async fn run_command(command: Command, config: &Config) -> error::Result<bool> {
    match command {
        Command::BuildIndex { repos } => {
            let client = GitHubClient::new(config.github_token())?;
            commands::build_index(config, &client, &repos).await
        }
        Command::Search { query, limit } => commands::search(config, &query, limit),
        Command::Add { query, config_file } => {
            let client = GitHubClient::new(config.github_token())?;
            commands::add(config, &client, &query, &config_file).await
        }
        Command::Remove {
            hook_id,
            config_file,
        } => commands::remove(&hook_id, &config_file),
        Command::Serve { .. } => {
            registry::server::serve(config).await?;
            Ok(true)
        }
    }
}

async fn run_tui(config: Config) -> std::result::Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = logging::init_file(&config.log_file, &config.log_level) {
        eprintln!("warning: file logging disabled: {e}");
    }
    tracing::info!(?config, "starting");

    let client = match GitHubClient::new(config.github_token()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let mut app = App::new(config, Arc::new(client), tx.clone());

    // Install panic hook before entering raw mode so terminal is restored on panic
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let input_tx = tx.clone();
    let input_task = tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            let app_event = match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
                Event::Resize(_, _) => Some(AppEvent::Resize),
                _ => None,
            };
            if let Some(e) = app_event {
                if input_tx.send(e).is_err() {
                    break;
                }
            }
        }
    });

    let tick_tx = tx.clone();
    let tick_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        loop {
            interval.tick().await;
            if tick_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });
    drop(tx);

    loop {
        terminal.draw(|f| app.render(f))?;

        let first = match rx.recv().await {
            Some(e) => e,
            None => break,
        };

        app.handle_event(first);
        while let Ok(pending) = rx.try_recv() {
            app.handle_event(pending);
        }

        if app.should_quit {
            break;
        }
    }

    input_task.abort();
    tick_task.abort();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("exiting");
    Ok(())
}
