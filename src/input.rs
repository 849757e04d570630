use anyhow::Result;
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Single-line editable text with a char-indexed cursor.
#[derive(Debug, Default, Clone)]
pub struct TextField {
  pub value: String,
  /// Cursor position (char index).
  pub cursor: usize,
  /// Horizontal scroll offset in display columns.
  pub scroll: usize,
}

impl TextField {
  /// Replace the contents and move the cursor to the end.
  pub fn set(&mut self, value: &str) {
    self.value = value.to_string();
    self.cursor = self.value.chars().count();
    self.scroll = 0;
  }

  pub fn insert(&mut self, c: char) {
    let byte_idx = char_to_byte_index(&self.value, self.cursor);
    self.value.insert(byte_idx, c);
    self.cursor += 1;
  }

  pub fn backspace(&mut self) {
    if self.cursor > 0 {
      self.cursor -= 1;
      let byte_idx = char_to_byte_index(&self.value, self.cursor);
      self.value.remove(byte_idx);
    }
  }

  pub fn delete(&mut self) {
    if self.cursor < self.value.chars().count() {
      let byte_idx = char_to_byte_index(&self.value, self.cursor);
      self.value.remove(byte_idx);
    }
  }

  pub fn left(&mut self) {
    self.cursor = self.cursor.saturating_sub(1);
  }

  pub fn right(&mut self) {
    if self.cursor < self.value.chars().count() {
      self.cursor += 1;
    }
  }

  pub fn home(&mut self) {
    self.cursor = 0;
  }

  pub fn end(&mut self) {
    self.cursor = self.value.chars().count();
  }
}

// --- Event Handling ---

pub async fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('p') {
    app.toggle_music().await;
    return Ok(());
  }

  match app.mode {
    AppMode::Form => handle_form_key(app, key),
    AppMode::List => handle_list_key(app, key),
    AppMode::Filter => handle_filter_key(app, key),
  }
  Ok(())
}

fn handle_form_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  match key.code {
    KeyCode::Enter => app.submit(),
    KeyCode::Tab | KeyCode::Down => app.focus = app.focus.next(),
    KeyCode::BackTab | KeyCode::Up => app.focus = app.focus.prev(),
    KeyCode::Esc => {
      if app.store.is_empty() {
        app.should_quit = true;
      } else {
        app.mode = AppMode::List;
      }
    }
    code => {
      let chord = key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
      let field = app.form.field_mut(app.focus);
      match code {
        // Unbound Ctrl/Alt chords are not text.
        KeyCode::Char(_) if chord => {}
        KeyCode::Char(c) => field.insert(c),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.left(),
        KeyCode::Right => field.right(),
        KeyCode::Home => field.home(),
        KeyCode::End => field.end(),
        _ => {}
      }
    }
  }
}

fn handle_list_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => {
      let count = app.visible().len();
      if count > 0 {
        let i = app.list_state.selected().map_or(0, |i| (i + 1) % count);
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      let count = app.visible().len();
      if count > 0 {
        let i =
          app.list_state.selected().map_or(0, |i| if i == 0 { count.saturating_sub(1) } else { i.saturating_sub(1) });
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Char('d') | KeyCode::Delete => app.remove_selected(),
    KeyCode::Char('/') | KeyCode::Char('f') => app.mode = AppMode::Filter,
    KeyCode::Tab | KeyCode::Char('a') => app.mode = AppMode::Form,
    KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
    _ => {}
  }
}

fn handle_filter_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => app.select_next_genre(),
    KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => app.select_prev_genre(),
    KeyCode::Enter | KeyCode::Esc => app.mode = AppMode::List,
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Config;
  use crate::storage::MemoryStore;
  use crate::store::RecordStore;
  use ratatui::crossterm::event::KeyEvent;

  fn app() -> App {
    App::new(RecordStore::new(Box::new(MemoryStore::default()), "filmesFavoritos"), Config::default())
  }

  fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  async fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      handle_key_event(app, press(KeyCode::Char(c))).await.unwrap();
    }
  }

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日"; // a=1 byte, é=2 bytes, 日=3 bytes
    assert_eq!(char_to_byte_index(s, 0), 0);
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
    assert_eq!(char_to_byte_index(s, 3), 6);
  }

  // --- TextField ---

  #[test]
  fn text_field_editing() {
    let mut f = TextField::default();
    for c in "Gênero".chars() {
      f.insert(c);
    }
    assert_eq!(f.cursor, 6);
    f.left();
    f.backspace();
    assert_eq!(f.value, "Gêneo");
    assert_eq!(f.cursor, 4);
    f.home();
    f.delete();
    assert_eq!(f.value, "êneo");
    f.end();
    assert_eq!(f.cursor, 4);
  }

  #[test]
  fn text_field_set_moves_cursor_to_end() {
    let mut f = TextField::default();
    f.set("Dune");
    assert_eq!(f.cursor, 4);
    f.right();
    assert_eq!(f.cursor, 4);
  }

  // --- key handling ---

  #[tokio::test]
  async fn typing_and_submitting_the_form() {
    let mut app = app();
    type_str(&mut app, "Dune").await;
    handle_key_event(&mut app, press(KeyCode::Tab)).await.unwrap();
    type_str(&mut app, "Sci-Fi").await;
    handle_key_event(&mut app, press(KeyCode::Tab)).await.unwrap();
    type_str(&mut app, "2021").await;
    handle_key_event(&mut app, press(KeyCode::Enter)).await.unwrap();

    assert_eq!(app.store.len(), 1);
    assert_eq!(app.store.records()[0].title, "Dune");
    assert_eq!(app.store.records()[0].genre, "Sci-Fi");
  }

  #[tokio::test]
  async fn list_keys_navigate_filter_and_remove() {
    let mut app = app();
    for (t, g, y) in [("Dune", "Sci-Fi", "2021"), ("Heat", "Crime", "1995")] {
      app.form.title.set(t);
      app.form.genre.set(g);
      app.form.year.set(y);
      app.submit();
    }
    handle_key_event(&mut app, press(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.mode, AppMode::List);

    handle_key_event(&mut app, press(KeyCode::Char('j'))).await.unwrap();
    assert_eq!(app.list_state.selected(), Some(1));

    handle_key_event(&mut app, press(KeyCode::Char('/'))).await.unwrap();
    assert_eq!(app.mode, AppMode::Filter);
    handle_key_event(&mut app, press(KeyCode::Left)).await.unwrap();
    assert_eq!(app.filter_genre, "Sci-Fi");
    handle_key_event(&mut app, press(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.mode, AppMode::List);

    handle_key_event(&mut app, press(KeyCode::Char('d'))).await.unwrap();
    assert_eq!(app.store.len(), 1);
    assert_eq!(app.store.records()[0].title, "Heat");
  }

  #[tokio::test]
  async fn ctrl_c_quits() {
    let mut app = app();
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)).await.unwrap();
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn unbound_chords_do_not_type() {
    let mut app = app();
    type_str(&mut app, "ab").await;
    for modifiers in [KeyModifiers::CONTROL, KeyModifiers::ALT, KeyModifiers::CONTROL | KeyModifiers::SHIFT] {
      handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('x'), modifiers)).await.unwrap();
    }
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT)).await.unwrap();
    assert_eq!(app.form.title.value, "abC");
    assert!(!app.should_quit);
  }

  #[tokio::test]
  async fn esc_on_empty_form_quits() {
    let mut app = app();
    handle_key_event(&mut app, press(KeyCode::Esc)).await.unwrap();
    assert!(app.should_quit);
  }
}
