use serde::{Deserialize, Serialize};

/// One favorite movie.
///
/// Field names on disk keep the snapshot format of earlier releases
/// (`titulo`, `genero`, `ano`), so existing snapshots load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
  pub id: i64,
  #[serde(rename = "titulo")]
  pub title: String,
  #[serde(rename = "genero")]
  pub genre: String,
  #[serde(rename = "ano")]
  pub year: i32,
}

impl MovieRecord {
  /// Case-insensitive genre comparison used by the genre filter.
  pub fn genre_matches(&self, genre: &str) -> bool {
    self.genre.to_lowercase() == genre.to_lowercase()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn dune() -> MovieRecord {
    MovieRecord { id: 7, title: "Dune".to_string(), genre: "Sci-Fi".to_string(), year: 2021 }
  }

  #[test]
  fn serializes_with_snapshot_field_names() {
    let json = serde_json::to_string(&dune()).unwrap();
    assert_eq!(json, r#"{"id":7,"titulo":"Dune","genero":"Sci-Fi","ano":2021}"#);
  }

  #[test]
  fn deserializes_snapshot_entry() {
    let rec: MovieRecord = serde_json::from_str(r#"{"id":7,"titulo":"Dune","genero":"Sci-Fi","ano":2021}"#).unwrap();
    assert_eq!(rec, dune());
  }

  #[test]
  fn genre_matches_ignores_case() {
    let rec = dune();
    assert!(rec.genre_matches("sci-fi"));
    assert!(rec.genre_matches("SCI-FI"));
    assert!(!rec.genre_matches("Drama"));
    assert!(!rec.genre_matches(""));
  }
}
