mod app;
mod config;
mod constants;
mod input;
mod player;
mod record;
mod storage;
mod store;
mod theme;
mod ui;
mod view;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use constants::constants;
use storage::FileStore;
use store::RecordStore;
use view::ListView;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Keep a list of favorite movies", long_about = None)]
struct Args {
  /// Directory holding the favorites snapshot (default: platform data dir)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Audio file for the background-music toggle (overrides prefs.toml)
  #[arg(long)]
  music: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Add a movie to the favorites
  Add { title: String, genre: String, year: String },
  /// List favorites, optionally restricted to one genre
  List {
    #[arg(short, long, default_value = "")]
    genre: String,
  },
  /// List the genre filter options
  Genres,
  /// Remove the favorite with the given id
  Remove { id: i64 },
  /// Print shell completions
  Completions { shell: Shell },
}

// --- Setup ---

fn resolve_data_dir(args: &Args) -> Result<PathBuf> {
  match &args.data_dir {
    Some(dir) => Ok(dir.clone()),
    None => storage::default_data_dir().context("Could not determine a data directory; pass --data-dir"),
  }
}

/// Log to a file in `dir`; stdout belongs to the TUI.
fn init_logging(dir: &Path) -> Result<WorkerGuard> {
  std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
  let appender = tracing_appender::rolling::never(dir, &constants().log_file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);
  tracing_subscriber::fmt()
    .with_writer(writer)
    .with_ansi(false)
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();
  Ok(guard)
}

fn open_store(dir: &Path) -> RecordStore {
  let mut store = RecordStore::new(Box::new(FileStore::new(dir)), constants().storage_key.as_str());
  store.load();
  store
}

// --- Headless commands ---

fn run_command(command: Command, store: &mut RecordStore) -> Result<()> {
  match command {
    Command::Add { title, genre, year } => {
      let record = store.add(&title, &genre, &year)?;
      println!("{}", record.id);
    }
    Command::List { genre } => match view::render(store.records(), &genre) {
      ListView::Placeholder => println!("{}", constants().placeholder_text),
      ListView::Records(records) => {
        for r in records {
          println!("{}\t{}\t{}\t{}", r.id, r.title, r.genre, r.year);
        }
      }
    },
    Command::Genres => {
      let options = view::derive_genre_options(store.records(), "");
      for label in options.labels(&constants().all_genres_label) {
        println!("{}", label);
      }
    }
    Command::Remove { id } => {
      if !store.remove(id)? {
        println!("No favorite with id {}", id);
      }
    }
    Command::Completions { .. } => bail!("completions are printed before the store is opened"),
  }
  Ok(())
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(Command::Completions { shell }) = args.command {
    clap_complete::generate(shell, &mut Args::command(), &constants().app_name, &mut std::io::stdout());
    return Ok(());
  }

  let data_dir = resolve_data_dir(&args)?;
  let _guard = init_logging(&data_dir)?;
  info!(data_dir = %data_dir.display(), "reel starting");
  let mut store = open_store(&data_dir);

  if let Some(command) = args.command {
    return run_command(command, &mut store);
  }

  let mut config = Config::load();
  if args.music.is_some() {
    config.music_path = args.music;
  }

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, App::new(store, config)).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
  loop {
    app.expire_error();
    app.music.check_status();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key).await?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  app.music.stop().await?;
  info!("reel exiting");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_store(dir: &Path) -> RecordStore {
    open_store(dir)
  }

  #[test]
  fn cli_parses_subcommands() {
    let args = Args::try_parse_from(["reel", "--data-dir", "/tmp/x", "add", "Dune", "Sci-Fi", "2021"]).unwrap();
    assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/x")));
    assert!(matches!(args.command, Some(Command::Add { ref title, .. }) if title == "Dune"));

    let args = Args::try_parse_from(["reel", "list", "--genre", "Drama"]).unwrap();
    assert!(matches!(args.command, Some(Command::List { ref genre }) if genre == "Drama"));

    let args = Args::try_parse_from(["reel"]).unwrap();
    assert!(args.command.is_none());
  }

  #[test]
  fn cli_definition_is_valid() {
    Args::command().debug_assert();
  }

  #[test]
  fn headless_add_and_remove_persist() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = temp_store(dir.path());
    run_command(Command::Add { title: "Dune".into(), genre: "Sci-Fi".into(), year: "2021".into() }, &mut store)
      .unwrap();
    let id = store.records()[0].id;

    let mut reopened = temp_store(dir.path());
    assert_eq!(reopened.len(), 1);
    run_command(Command::Remove { id }, &mut reopened).unwrap();
    assert!(temp_store(dir.path()).is_empty());
  }

  #[test]
  fn headless_add_rejects_bad_year() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = temp_store(dir.path());
    let err = run_command(Command::Add { title: "Dune".into(), genre: "Sci-Fi".into(), year: "x".into() }, &mut store)
      .unwrap_err();
    assert!(err.to_string().contains("Year must be a whole number"));
    assert!(store.is_empty());
  }

  #[test]
  fn headless_remove_unknown_id_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = temp_store(dir.path());
    run_command(Command::Add { title: "Heat".into(), genre: "Crime".into(), year: "1995".into() }, &mut store)
      .unwrap();
    run_command(Command::Remove { id: 42 }, &mut store).unwrap();
    assert_eq!(temp_store(dir.path()).len(), 1);
  }
}
