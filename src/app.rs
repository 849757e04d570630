use ratatui::widgets::ListState;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::constants::constants;
use crate::input::TextField;
use crate::player::BackgroundMusic;
use crate::record::MovieRecord;
use crate::store::RecordStore;
use crate::theme::THEMES;
use crate::view::{self, GenreOptions, ListView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  /// Typing into the add-movie form.
  Form,
  /// Navigating the record list.
  List,
  /// Cycling the genre selector.
  Filter,
}

/// Which form input has the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
  Title,
  Genre,
  Year,
}

impl FormField {
  pub const ALL: [FormField; 3] = [FormField::Title, FormField::Genre, FormField::Year];

  pub fn label(self) -> &'static str {
    match self {
      FormField::Title => "Title",
      FormField::Genre => "Genre",
      FormField::Year => "Year",
    }
  }

  pub fn next(self) -> Self {
    match self {
      FormField::Title => FormField::Genre,
      FormField::Genre => FormField::Year,
      FormField::Year => FormField::Title,
    }
  }

  pub fn prev(self) -> Self {
    match self {
      FormField::Title => FormField::Year,
      FormField::Genre => FormField::Title,
      FormField::Year => FormField::Genre,
    }
  }
}

/// The add-movie form.
#[derive(Debug, Default)]
pub struct MovieForm {
  pub title: TextField,
  pub genre: TextField,
  pub year: TextField,
}

impl MovieForm {
  pub fn field_mut(&mut self, which: FormField) -> &mut TextField {
    match which {
      FormField::Title => &mut self.title,
      FormField::Genre => &mut self.genre,
      FormField::Year => &mut self.year,
    }
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

pub struct App {
  pub store: RecordStore,
  pub mode: AppMode,
  pub theme_index: usize,
  pub form: MovieForm,
  pub focus: FormField,
  /// Genre the list is filtered by; empty means all. Follows the selector, lagging one
  /// refresh behind when the selected genre drops out of the options.
  pub filter_genre: String,
  pub genre_options: GenreOptions,
  pub list_state: ListState,
  pub music: BackgroundMusic,
  pub last_error: Option<String>,
  pub info_message: Option<String>,
  pub should_quit: bool,
  config: Config,
  /// Last genre picked in the selector, restored if it comes back after dropping out.
  remembered_genre: String,
  /// When the last error was set, for auto-dismiss.
  error_time: Option<Instant>,
}

impl App {
  /// Build the app around an already-loaded store.
  pub fn new(store: RecordStore, config: Config) -> Self {
    let theme_index =
      if let Some(ref name) = config.theme_name { THEMES.iter().position(|t| t.name == name).unwrap_or(0) } else { 0 };
    let music = BackgroundMusic::new(config.music_path.clone(), config.volume());

    let mut app = Self {
      store,
      mode: AppMode::Form,
      theme_index,
      form: MovieForm::default(),
      focus: FormField::Title,
      filter_genre: String::new(),
      genre_options: GenreOptions::default(),
      list_state: ListState::default(),
      music,
      last_error: None,
      info_message: None,
      should_quit: false,
      config,
      remembered_genre: String::new(),
      error_time: None,
    };
    app.refresh();
    app
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    // Safety: theme_index is bounded by modular arithmetic in next_theme() and by position() on init.
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.info_message = None;
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  /// Clear the current error message and its expiry timer.
  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_dismiss_secs)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  /// Records visible under the current genre filter.
  pub fn visible(&self) -> ListView<'_> {
    view::render(self.store.records(), &self.filter_genre)
  }

  /// The record under the list cursor, if any.
  pub fn selected_record(&self) -> Option<&MovieRecord> {
    let idx = self.list_state.selected()?;
    self.visible().records().get(idx).copied()
  }

  /// Re-derive the genre options and clamp the list cursor after a mutation.
  ///
  /// The list is filtered by what the selector showed before the mutation, unless
  /// the remembered genre is offered again. Removing the last record of the
  /// filtered genre therefore shows the placeholder once; the next refresh
  /// applies the selector's fallback to all.
  pub fn refresh(&mut self) {
    let shown = self.genre_options.selected_value().to_string();
    self.genre_options = view::derive_genre_options(self.store.records(), &self.remembered_genre);
    let offered = self.genre_options.selected_value();
    self.filter_genre = if offered.is_empty() { shown } else { offered.to_string() };
    self.clamp_selection();
  }

  fn clamp_selection(&mut self) {
    let count = self.visible().len();
    if count == 0 {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      self.list_state.select(Some(sel.min(count - 1)));
    }
  }

  /// Add the movie described by the form.
  pub fn submit(&mut self) {
    let result = self.store.add(&self.form.title.value, &self.form.genre.value, &self.form.year.value);
    match result {
      Ok(record) => {
        self.clear_error();
        self.info_message = Some(format!("Added '{}'.", record.title));
        self.form.reset();
        self.focus = FormField::Title;
        self.refresh();
      }
      Err(e) if e.is_validation() => {
        debug!(err = %e, "form rejected");
        self.set_error(format!("Please fill in all fields correctly. {}", e));
      }
      Err(e) => {
        warn!(err = %e, "add: snapshot not saved");
        self.set_error(e.to_string());
        self.form.reset();
        self.focus = FormField::Title;
        self.refresh();
      }
    }
  }

  /// Remove the record under the list cursor.
  pub fn remove_selected(&mut self) {
    let Some(id) = self.selected_record().map(|r| r.id) else { return };
    self.remove(id);
  }

  pub fn remove(&mut self, id: i64) {
    let title = self.store.get(id).map(|r| r.title.clone());
    match self.store.remove(id) {
      Ok(true) => {
        self.clear_error();
        self.info_message = title.map(|t| format!("Removed '{}'.", t));
      }
      Ok(false) => {}
      Err(e) => self.set_error(e.to_string()),
    }
    self.refresh();
  }

  pub fn select_next_genre(&mut self) {
    self.genre_options.select_next();
    self.apply_genre_selection();
  }

  pub fn select_prev_genre(&mut self) {
    self.genre_options.select_prev();
    self.apply_genre_selection();
  }

  fn apply_genre_selection(&mut self) {
    self.filter_genre = self.genre_options.selected_value().to_string();
    self.remembered_genre = self.filter_genre.clone();
    info!(genre = %self.filter_genre, "filter changed");
    self.list_state.select(Some(0));
    self.clamp_selection();
  }

  pub async fn toggle_music(&mut self) {
    match self.music.toggle().await {
      Ok(state) => self.info_message = Some(format!("Music {}.", state.label())),
      Err(e) => self.set_error(format!("{:#}", e)),
    }
  }
}
