//! Projection of the record collection into what the list and the genre
//! selector show. Pure functions; the terminal drawing lives in `ui`.

use std::collections::BTreeSet;

use crate::record::MovieRecord;

/// What the record list shows after filtering.
#[derive(Debug, PartialEq, Eq)]
pub enum ListView<'a> {
  /// Nothing to show: the collection is empty or no record matches the filter.
  Placeholder,
  Records(Vec<&'a MovieRecord>),
}

impl<'a> ListView<'a> {
  pub fn records(&self) -> &[&'a MovieRecord] {
    match self {
      ListView::Placeholder => &[],
      ListView::Records(records) => records,
    }
  }

  pub fn len(&self) -> usize {
    self.records().len()
  }
}

/// Filter `records` by `selected_genre` (case-insensitive). An empty selection shows everything.
pub fn render<'a>(records: &'a [MovieRecord], selected_genre: &str) -> ListView<'a> {
  let visible: Vec<&MovieRecord> =
    records.iter().filter(|r| selected_genre.is_empty() || r.genre_matches(selected_genre)).collect();
  if visible.is_empty() { ListView::Placeholder } else { ListView::Records(visible) }
}

/// The genre selector's options: the "all" sentinel followed by each distinct genre.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreOptions {
  /// Distinct genres in sorted order, without the "all" sentinel.
  genres: Vec<String>,
  /// Index into `labels()`; 0 is the "all" sentinel.
  selected: usize,
}

impl GenreOptions {
  /// Number of options, including "all".
  pub fn len(&self) -> usize {
    self.genres.len() + 1
  }

  pub fn selected_index(&self) -> usize {
    self.selected
  }

  /// The selected genre, or `""` when "all" is selected.
  pub fn selected_value(&self) -> &str {
    match self.selected {
      0 => "",
      i => &self.genres[i - 1],
    }
  }

  /// Option labels in display order, with `all_label` first.
  pub fn labels<'a>(&'a self, all_label: &'a str) -> Vec<&'a str> {
    std::iter::once(all_label).chain(self.genres.iter().map(String::as_str)).collect()
  }

  pub fn select_next(&mut self) {
    self.selected = (self.selected + 1) % self.len();
  }

  pub fn select_prev(&mut self) {
    self.selected = if self.selected == 0 { self.len() - 1 } else { self.selected - 1 };
  }
}

/// Rebuild the genre options from scratch, keeping `previously_selected` when it is still offered.
pub fn derive_genre_options(records: &[MovieRecord], previously_selected: &str) -> GenreOptions {
  let genres: Vec<String> =
    records.iter().map(|r| r.genre.clone()).collect::<BTreeSet<_>>().into_iter().collect();
  let selected = if previously_selected.is_empty() {
    0
  } else {
    genres.iter().position(|g| g == previously_selected).map_or(0, |i| i + 1)
  };
  GenreOptions { genres, selected }
}
