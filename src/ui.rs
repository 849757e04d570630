use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, List, ListItem, Padding, Paragraph},
};

use crate::app::{App, AppMode, FormField};
use crate::constants::constants;
use crate::input::TextField;
use crate::player::MusicState;
use crate::theme::Theme;
use crate::view::ListView;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded_block(theme: &Theme, focused: bool) -> Block<'static> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(color))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, form_area, filter_area, list_area, status_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(3),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_form(frame, app, form_area);
  render_filter(frame, app, filter_area);
  render_list(frame, app, list_area);
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let left = Line::from(vec![
    Span::styled(" ★ reel ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(format!("{} favorites", app.store.len()), Style::default().fg(theme.muted)),
  ]);
  frame.render_widget(left, area);

  let music = match app.music.state() {
    MusicState::Playing => "♪ on ",
    MusicState::Paused => "♪ paused ",
    MusicState::Stopped => "♪ off ",
  };
  let right = Line::from(Span::styled(music, Style::default().fg(theme.muted)));
  let width = (music.chars().count() as u16).min(area.width);
  let right_area = Rect { x: area.x + area.width.saturating_sub(width), width, ..area };
  frame.render_widget(right, right_area);
}

fn render_form(frame: &mut Frame, app: &mut App, area: Rect) {
  let [title_area, genre_area, year_area] =
    Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(35), Constraint::Percentage(20)])
      .areas(area);

  for (field, field_area) in FormField::ALL.into_iter().zip([title_area, genre_area, year_area]) {
    render_text_field(frame, app, field, field_area);
  }
}

fn render_text_field(frame: &mut Frame, app: &mut App, which: FormField, area: Rect) {
  let theme = app.theme();
  let focused = app.mode == AppMode::Form && app.focus == which;
  let title_color = if focused { theme.accent } else { theme.muted };
  let block = rounded_block(theme, focused)
    .title(format!(" {} ", which.label()))
    .title_style(Style::default().fg(title_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let field: &mut TextField = app.form.field_mut(which);
  let cursor_col = display_width(&field.value, field.cursor);

  if inner_w == 0 {
    field.scroll = cursor_col;
  } else if cursor_col < field.scroll {
    field.scroll = cursor_col;
  } else if cursor_col >= field.scroll + inner_w {
    field.scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let scroll = field.scroll;
  let visible: String = field
    .value
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= scroll)
    .take_while(|(start, _, _)| *start < scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(block);
  frame.render_widget(paragraph, area);

  if focused && inner_w > 0 {
    let cursor_x = area.x + 2 + cursor_col.saturating_sub(scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_filter(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let focused = app.mode == AppMode::Filter;
  let block = rounded_block(theme, focused)
    .title(" Genre ")
    .title_style(Style::default().fg(if focused { theme.accent } else { theme.muted }))
    .padding(Padding::horizontal(1));

  let selected = app.genre_options.selected_index();
  let spans: Vec<Span> = app
    .genre_options
    .labels(&constants().all_genres_label)
    .into_iter()
    .enumerate()
    .flat_map(|(i, label)| {
      let style = if i == selected {
        Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(theme.fg)
      };
      [Span::styled(format!(" {} ", label), style), Span::raw(" ")]
    })
    .collect();

  frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.mode == AppMode::List;
  let title = if app.filter_genre.is_empty() {
    " Favorites ".to_string()
  } else {
    format!(" Favorites — {} ", app.filter_genre)
  };
  let block = rounded_block(theme, focused)
    .title(title)
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

  let items: Vec<ListItem> = match app.visible() {
    ListView::Placeholder => {
      let text = Paragraph::new(Line::from(Span::styled(&constants().placeholder_text, Style::default().fg(theme.muted))))
        .alignment(Alignment::Center)
        .block(block);
      frame.render_widget(text, area);
      return;
    }
    ListView::Records(records) => {
      // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
      let inner_w = area.width.saturating_sub(4) as usize;
      let selected = app.list_state.selected();
      records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
          let is_selected = Some(i) == selected;
          let fg = if is_selected { theme.highlight_fg } else { theme.fg };
          let bg = if is_selected {
            theme.highlight_bg
          } else if i % 2 == 1 {
            theme.stripe_bg
          } else {
            theme.bg
          };

          let right = format!("{}  {}", rec.genre, rec.year);
          let right_w = right.chars().count();
          let title = truncate_str(&rec.title, inner_w.saturating_sub(right_w + 2));
          let gap = inner_w.saturating_sub(title.chars().count() + right_w);
          let line = Line::from(vec![
            Span::styled(title, Style::default().fg(fg)),
            Span::raw(" ".repeat(gap)),
            Span::styled(right, Style::default().fg(theme.muted)),
          ]);
          ListItem::new(line).bg(bg)
        })
        .collect()
    }
  };

  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(msg) = &app.info_message {
    (format!(" {}", msg), Style::default().fg(theme.status))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let music_label = if app.music.state() == MusicState::Playing { "Pause music" } else { "Play music" };
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Form => {
      let mut k = vec![("Enter", "Add"), ("Tab", "Next field"), ("^p", music_label), ("^t", "Theme")];
      if app.store.is_empty() {
        k.push(("Esc", "Quit"));
      } else {
        k.push(("Esc", "List"));
      }
      k
    }
    AppMode::List => vec![
      ("j/k", "Navigate"),
      ("d", "Remove"),
      ("/", "Genre"),
      ("Tab", "Form"),
      ("^p", music_label),
      ("q", "Quit"),
    ],
    AppMode::Filter => vec![("←/→", "Genre"), ("Enter", "Done")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let label_w = (theme_label.len() as u16).min(area.width);
  let right_area = Rect { x: area.x + area.width.saturating_sub(label_w), width: label_w, ..area };
  frame.render_widget(right, right_area);
}
